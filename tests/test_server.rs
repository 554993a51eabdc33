//! Integration test: Server API endpoints

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use cropyield::dataset::load_dataset;
use cropyield::server::{create_router, AppState, ServerConfig};
use cropyield::training::{train_model, ModelConfig};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/crop_yield_samples.csv");
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dataset_path: path.clone(),
        model: ModelConfig::default().with_n_estimators(20),
    };
    let dataset = load_dataset(&path).unwrap();
    let model = train_model(&dataset, &config.model).unwrap();
    create_router(Arc::new(AppState::new(config, dataset, model)))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(
        test_app(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "records": 232, "dataset": "crop_yield_samples.csv"})
    );
}

#[tokio::test]
async fn test_predict_success() {
    let payload = json!({
        "crop": " 小麦 ",
        "region": "河南",
        "year": 2021,
        "sown_area_kha": 5600,
        "avg_price_yuan_per_ton": 2500,
    });
    let (status, body) = send(test_app(), post_predict(payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["inputs"]["crop"], json!("小麦"));

    let ten_kt = body["data"]["predicted_yield_10kt"].as_f64().unwrap();
    let tonnes = body["data"]["predicted_yield_tonnes"].as_f64().unwrap();
    assert_eq!(tonnes, ten_kt * 10000.0);
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let (status, body) = send(test_app(), post_predict("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "request body must be valid JSON"}));
}

#[tokio::test]
async fn test_predict_rejects_non_object() {
    let (status, body) = send(test_app(), post_predict("[1, 2, 3]")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("request body must be a JSON object"));
}

#[tokio::test]
async fn test_predict_validation_failure() {
    let payload = json!({"region": "河南", "year": 2021, "sown_area_kha": 1, "avg_price_yuan_per_ton": 1});
    let (status, body) = send(test_app(), post_predict(payload.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("missing required fields: crop"));
}

#[tokio::test]
async fn test_preview_limit() {
    let request = Request::builder().uri("/model/preview?limit=2").body(Body::empty()).unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    assert!(body["columns"].as_array().unwrap().contains(&json!("yield_10kt")));
}

#[tokio::test]
async fn test_preview_bad_limit_falls_back() {
    let app = test_app();

    let request = Request::builder().uri("/model/preview?limit=abc").body(Body::empty()).unwrap();
    let (_, body) = send(app.clone(), request).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 5);

    let request = Request::builder().uri("/model/preview?limit=0").body(Body::empty()).unwrap();
    let (_, body) = send(app, request).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}
