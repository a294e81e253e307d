use std::sync::Arc;

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    models::{ChartType, Column},
    profiling::{correlation, suggest_chart_types},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/charts/suggest", post(suggest))
        .route("/stats/correlation", post(correlate))
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    columns: Vec<Column>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    suggestions: Vec<ChartType>,
}

async fn suggest(Json(request): Json<SuggestRequest>) -> Json<SuggestResponse> {
    let suggestions = suggest_chart_types(&request.columns);
    tracing::debug!(
        "Suggested {:?} for {} columns",
        suggestions,
        request.columns.len()
    );
    Json(SuggestResponse { suggestions })
}

#[derive(Debug, Deserialize)]
pub struct CorrelationRequest {
    a: Vec<f64>,
    b: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    coefficient: f64,
}

async fn correlate(Json(request): Json<CorrelationRequest>) -> Json<CorrelationResponse> {
    if request.a.len() != request.b.len() {
        tracing::debug!(
            "Correlation over samples of different length ({} vs {})",
            request.a.len(),
            request.b.len()
        );
    }
    Json(CorrelationResponse {
        coefficient: correlation(&request.a, &request.b),
    })
}
