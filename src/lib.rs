//! Dataset profiling service.
//!
//! The [`profiling`] module is the engine: it infers column types, computes
//! statistics, detects relationships and suggests chart types for a set of
//! rows. [`services`] turns uploads into rows and [`routes`] exposes both
//! over HTTP.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod profiling;
pub mod routes;
pub mod services;

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self { config }
    }
}

/// Builds the HTTP application with all routes and layers installed.
pub fn app(state: Arc<AppState>) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .merge(routes::routes())
        .merge(routes::datasets::routes())
        .merge(routes::charts::routes())
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
