use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sheet_profiler::{app, config::Config, AppState};
use tower::ServiceExt;

fn test_app() -> Router {
    app(Arc::new(AppState::new(Config::default())))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = test_app().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn post_bytes(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .expect("valid request")
}

fn column_types(dataset: &Value) -> Vec<(String, String)> {
    dataset["columns"]
        .as_array()
        .map(|columns| {
            columns
                .iter()
                .map(|c| {
                    let name = c["name"].as_str().unwrap_or_default().to_string();
                    let kind = c["type"].as_str().unwrap_or_default().to_string();
                    (name, kind)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).expect("valid request");
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_profile_inline_rows() {
    let rows: Vec<Value> = (1..=6)
        .map(|day| {
            let store = if day % 2 == 0 { "a" } else { "b" };
            json!({ "day": format!("2024-03-0{day}"), "sales": day * 10, "store": store })
        })
        .collect();
    let (status, body) = send(post_json("/datasets/profile", json!({ "name": "march", "rows": rows }))).await;

    assert_eq!(status, StatusCode::OK);
    let dataset = &body["dataset"];
    assert_eq!(dataset["name"], "march");
    assert_eq!(dataset["row_count"], 6);
    assert!(dataset.get("data").is_none());
    assert!(dataset.get("rows").is_none());
    assert_eq!(
        column_types(dataset),
        vec![
            ("day".to_string(), "temporal".to_string()),
            ("sales".to_string(), "numeric".to_string()),
            ("store".to_string(), "categorical".to_string()),
        ]
    );

    let suggestions = &dataset["metadata"]["suggested_chart_types"];
    assert_eq!(suggestions[0], "line");
    assert_eq!(suggestions[1], "area");
    assert_eq!(body["source"]["type"], "inline");
    assert_eq!(body["source"]["id"], dataset["source_id"]);
}

#[tokio::test]
async fn test_profile_keeps_caller_source_id() {
    let request = post_json(
        "/datasets/profile",
        json!({ "name": "one", "source_id": "src-42", "rows": [{ "x": 1 }] }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataset"]["source_id"], "src-42");
}

#[tokio::test]
async fn test_profile_empty_rows_is_bad_request() {
    let (status, body) = send(post_json("/datasets/profile", json!({ "name": "none", "rows": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Profiling error: No data to profile");
}

#[tokio::test]
async fn test_profile_csv_upload() {
    let csv = "x,y,label\n1,2,a\n2,4,b\n3,6,a\n4,8,b\n5,10,a\n";
    let (status, body) = send(post_bytes("/datasets/csv?name=points.csv", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["type"], "csv");
    assert_eq!(body["source"]["name"], "points.csv");
    let dataset = &body["dataset"];
    assert_eq!(dataset["row_count"], 5);

    let relationships = dataset["metadata"]["relationships"].as_array().cloned().unwrap_or_default();
    let xy = relationships
        .iter()
        .find(|r| r["column1"] == "x" && r["column2"] == "y")
        .expect("x/y correlation reported");
    assert_eq!(xy["type"], "correlation");
    assert!((xy["strength"].as_f64().unwrap_or_default() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_profile_csv_without_body() {
    let (status, body) = send(post_bytes("/datasets/csv", Body::empty())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: No file provided");
}

#[tokio::test]
async fn test_profile_excel_workbook() {
    let workbook = include_bytes!("fixtures/sales.xlsx");
    let (status, body) = send(post_bytes("/datasets/excel?name=sales.xlsx", workbook.to_vec())).await;

    assert_eq!(status, StatusCode::OK);
    let responses = body.as_array().cloned().unwrap_or_default();
    // The header-only "Notes" sheet yields no dataset.
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["dataset"]["name"], "sales.xlsx - Sales");
    assert_eq!(responses[1]["dataset"]["name"], "sales.xlsx - Targets");
    assert_eq!(responses[0]["source"]["type"], "excel");
    assert_eq!(responses[0]["source"]["id"], responses[1]["source"]["id"]);

    let sales = &responses[0]["dataset"];
    assert_eq!(sales["row_count"], 6);
    assert_eq!(
        column_types(sales),
        vec![
            ("date".to_string(), "temporal".to_string()),
            ("region".to_string(), "categorical".to_string()),
            ("units".to_string(), "numeric".to_string()),
        ]
    );
    assert_eq!(sales["metadata"]["suggested_chart_types"][0], "line");
    assert_eq!(responses[1]["dataset"]["row_count"], 3);
}

#[tokio::test]
async fn test_query_preview() {
    let request = post_json(
        "/datasets/query-result/preview",
        json!({ "project_id": "acme", "dataset_id": "sales", "table_id": "orders", "limit": 25 }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "SELECT * FROM `acme.sales.orders` LIMIT 25");

    let request = post_json(
        "/datasets/query-result/preview",
        json!({ "project_id": "acme", "dataset_id": "sales", "table_id": "orders`" }),
    );
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_excel_rejects_garbage() {
    let (status, body) = send(post_bytes("/datasets/excel?name=broken.xlsx", "not a workbook")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_profile_query_result_uses_schema() {
    let request = post_json(
        "/datasets/query-result",
        json!({
            "name": "orders",
            "project_id": "acme",
            "dataset_id": "sales",
            "schema": { "fields": [
                { "name": "order_id", "type": "INT64", "mode": "REQUIRED" },
                { "name": "status", "type": "STRING" }
            ]},
            "rows": [
                { "order_id": 1, "status": "open" },
                { "order_id": 2, "status": null },
                { "order_id": 3, "status": "open" }
            ]
        }),
    );
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["type"], "bigquery");
    assert_eq!(body["source"]["config"]["project_id"], "acme");
    let columns = &body["dataset"]["columns"];
    assert_eq!(columns[0]["original_type"], "INT64");
    assert_eq!(columns[0]["nullable"], false);
    assert_eq!(columns[1]["original_type"], "STRING");
    assert_eq!(columns[1]["nullable"], true);
    assert_eq!(columns[1]["stats"]["null_count"], 1);
}

#[tokio::test]
async fn test_suggest_charts_from_schema() {
    let request = post_json(
        "/charts/suggest",
        json!({ "columns": [
            { "name": "region", "type": "categorical", "nullable": false, "unique": false, "stats": { "unique_count": 3 } },
            { "name": "revenue", "type": "numeric", "nullable": false, "unique": false, "stats": {} }
        ]}),
    );
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"], json!(["bar", "column", "pie", "donut"]));
}

#[tokio::test]
async fn test_correlation_endpoint() {
    let (status, body) = send(post_json("/stats/correlation", json!({ "a": [1, 2, 3], "b": [3, 2, 1] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["coefficient"].as_f64().unwrap_or_default() + 1.0).abs() < 1e-9);

    let (status, body) = send(post_json("/stats/correlation", json!({ "a": [1, 2, 3], "b": [1, 2] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coefficient"], 0.0);
}
