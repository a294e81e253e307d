use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::Method,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        BigQueryConfig, ChartType, Column, ColumnRelationship, DataSource, DataSourceType, Dataset, Row,
        SourceConfig, TableSchema,
    },
    profiling::assemble,
    services::{bigquery, csv_reader, excel},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/profile", post(profile_rows))
        .route("/datasets/csv", post(profile_csv))
        .route("/datasets/excel", post(profile_excel))
        .route("/datasets/query-result", post(profile_query_result))
        .route("/datasets/query-result/preview", post(preview_query))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    name: String,
    #[serde(default)]
    source_id: Option<String>,
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResultRequest {
    name: String,
    project_id: String,
    #[serde(default)]
    dataset_id: Option<String>,
    schema: TableSchema,
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    table: bigquery::BigQueryTable,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetadataView {
    analyzed_at: DateTime<Utc>,
    suggested_chart_types: Vec<ChartType>,
    relationships: Vec<ColumnRelationship>,
}

/// A dataset as returned to clients: everything but the raw rows.
#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    id: String,
    name: String,
    source_id: String,
    columns: Vec<Column>,
    row_count: usize,
    metadata: MetadataView,
}

impl DatasetSummary {
    /// Fills the dataset's derived views and keeps relationships at least
    /// `min_strength` strong.
    fn new(dataset: &Dataset, min_strength: f64) -> Self {
        let relationships = dataset
            .relationships()
            .iter()
            .filter(|r| r.strength.abs() >= min_strength)
            .cloned()
            .collect();

        Self {
            id: dataset.id().to_string(),
            name: dataset.name().to_string(),
            source_id: dataset.source_id().to_string(),
            columns: dataset.columns().to_vec(),
            row_count: dataset.row_count(),
            metadata: MetadataView {
                analyzed_at: dataset.metadata().analyzed_at,
                suggested_chart_types: dataset.suggested_chart_types().to_vec(),
                relationships,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    source: DataSource,
    dataset: DatasetSummary,
}

/// Profiling is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Profiling task failed: {}", e)))?
}

fn require_body(body: &Bytes) -> Result<(), AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()));
    }
    Ok(())
}

fn profile_source(
    source: DataSource,
    dataset_name: &str,
    rows: Vec<Row>,
    min_strength: f64,
) -> Result<ProfileResponse, AppError> {
    let dataset = assemble(Uuid::new_v4().to_string(), dataset_name, source.id.as_str(), rows)?;
    Ok(ProfileResponse {
        dataset: DatasetSummary::new(&dataset, min_strength),
        source,
    })
}

async fn profile_rows(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    tracing::info!("Profiling {} inline rows for {}", request.rows.len(), request.name);

    let mut source = DataSource::new(request.name.as_str(), DataSourceType::Inline, SourceConfig::None);
    if let Some(source_id) = request.source_id {
        source.id = source_id;
    }

    let min_strength = state.config.min_relationship_strength;
    let response = run_blocking(move || profile_source(source, &request.name, request.rows, min_strength)).await?;
    Ok(Json(response))
}

async fn profile_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<ProfileResponse>, AppError> {
    require_body(&body)?;
    let name = params.name.unwrap_or_else(|| "upload.csv".to_string());
    tracing::info!("Profiling CSV upload {} ({}KB)", name, body.len() / 1024);

    let min_strength = state.config.min_relationship_strength;
    let response = run_blocking(move || {
        let source = DataSource::uploaded_file(&name, DataSourceType::Csv, body.len());
        let rows = csv_reader::read_csv(&body)?;
        profile_source(source, &name, rows, min_strength)
    })
    .await?;
    Ok(Json(response))
}

async fn profile_excel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    require_body(&body)?;
    let name = params.name.unwrap_or_else(|| "upload.xlsx".to_string());
    tracing::info!("Profiling Excel upload {} ({}KB)", name, body.len() / 1024);

    let start = std::time::Instant::now();
    let min_strength = state.config.min_relationship_strength;
    let responses = run_blocking(move || {
        let source = DataSource::uploaded_file(&name, DataSourceType::Excel, body.len());
        let sheets = excel::read_workbook(body)?;

        // Sheets are independent datasets; profile them side by side.
        sheets
            .into_par_iter()
            .map(|sheet| {
                let dataset_name = format!("{} - {}", name, sheet.name);
                profile_source(source.clone(), &dataset_name, sheet.rows, min_strength)
            })
            .collect::<Result<Vec<_>, AppError>>()
    })
    .await?;

    tracing::info!("Profiled {} sheets in {:?}", responses.len(), start.elapsed());
    Ok(Json(responses))
}

async fn profile_query_result(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryResultRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let config = SourceConfig::BigQuery(BigQueryConfig {
        project_id: request.project_id,
        dataset_id: request.dataset_id,
    });
    let source = DataSource::new(request.name.as_str(), DataSourceType::BigQuery, config);

    let min_strength = state.config.min_relationship_strength;
    let response = run_blocking(move || {
        let dataset = bigquery::dataset_from_query_result(
            &Uuid::new_v4().to_string(),
            &request.name,
            &source.id,
            request.rows,
            &request.schema,
        )?;
        Ok(ProfileResponse {
            dataset: DatasetSummary::new(&dataset, min_strength),
            source,
        })
    })
    .await?;
    Ok(Json(response))
}

async fn preview_query(Json(request): Json<PreviewRequest>) -> Result<Json<PreviewResponse>, AppError> {
    request.table.validate()?;
    let limit = request.limit.unwrap_or(bigquery::DEFAULT_PREVIEW_LIMIT);
    let query = bigquery::build_preview_query(&request.table, limit);
    tracing::debug!("Preview query for {}: {}", request.table.table_id, query);
    Ok(Json(PreviewResponse { query }))
}
