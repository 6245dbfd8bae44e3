mod common;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use somnia::api::{ErrorResponse, OPTIONS_TIP};
use somnia::server::{build_router, serve_on, MODEL_NOT_LOADED_DETAIL};
use somnia::{ApiClient, ClientError, PredictionService};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use common::{accountant_request, healthy_request, shipped_model};

struct TestServer {
    client: ApiClient,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn spawn_server(service: PredictionService, cors: bool) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(Arc::new(service), cors);
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve_on(listener, router, async move {
        let _ = rx.await;
    }));
    TestServer {
        client: ApiClient::new(format!("http://{}", addr)),
        shutdown: Some(tx),
    }
}

async fn loaded() -> TestServer {
    spawn_server(PredictionService::with_model(shipped_model()), true).await
}

#[tokio::test]
async fn test_health_endpoints() -> Result<(), ClientError> {
    let server = loaded().await;
    let health = server.client.health().await?;
    assert_eq!(health.status, "online");
    assert!(health.model_loaded);

    let body: Value = reqwest::get(format!("{}/health", server.client.base_url()))
        .await?
        .json()
        .await?;
    assert_eq!(body["model_loaded"], true);
    Ok(())
}

#[tokio::test]
async fn test_options_and_example() -> Result<(), ClientError> {
    let server = loaded().await;
    let options = server.client.options().await?;
    assert_eq!(options.gender, ["Female", "Male"]);
    assert_eq!(options.occupation.len(), 11);
    assert_eq!(options.sleep_disorders, ["Insomnia", "None", "Sleep Apnea"]);

    let example = server.client.example().await?;
    assert_eq!(example.example_request.occupation, "Accountant");
    assert_eq!(example.message, "Copy this example request to test the API");
    Ok(())
}

#[tokio::test]
async fn test_predict() -> Result<(), ClientError> {
    let server = loaded().await;
    let response = server.client.predict(&accountant_request()).await?;
    assert_eq!(response.prediction, "None");
    assert_eq!(response.confidence, Some(97.3));
    assert_eq!(response.message, "No sleep disorder detected. Maintain healthy lifestyle habits!");
    Ok(())
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() -> Result<(), ClientError> {
    let server = loaded().await;
    let mut body = serde_json::to_value(accountant_request()).unwrap();
    body["occupation"] = json!("Astronaut");

    let (status, body) = server.client.post_raw("/api/predict", &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.detail, "Validation Error");
    assert_eq!(error.tip.as_deref(), Some(OPTIONS_TIP));
    assert!(error.errors[0].contains("Astronaut"));
    assert!(error.errors[0].contains("Software Engineer"));
    Ok(())
}

#[tokio::test]
async fn test_category_status_depends_on_where_it_fails() -> Result<(), ClientError> {
    let server = loaded().await;
    let cases = [
        ("gender", "other", StatusCode::UNPROCESSABLE_ENTITY),
        ("bmi_category", "chubby", StatusCode::UNPROCESSABLE_ENTITY),
        ("occupation", "Astronaut", StatusCode::BAD_REQUEST),
    ];
    for (field, value, expected) in cases {
        let mut body = serde_json::to_value(accountant_request()).unwrap();
        body[field] = json!(value);
        let (status, body) = server.client.post_raw("/api/predict", &body).await?;
        assert_eq!(status, expected, "{field}={value}");
        let error: ErrorResponse = serde_json::from_value(body).unwrap();
        assert!(error.errors[0].starts_with(field));
        assert_eq!(error.tip.as_deref(), Some(OPTIONS_TIP));
    }
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_is_unprocessable() -> Result<(), ClientError> {
    let server = loaded().await;
    let mut body = serde_json::to_value(accountant_request()).unwrap();
    body["age"] = json!(9);
    body["stress_level"] = json!(11);

    let (status, body) = server.client.post_raw("/api/predict", &body).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.errors.len(), 2);
    assert!(error.errors[0].starts_with("age"));
    assert!(error.errors[1].starts_with("stress_level"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_unprocessable() -> Result<(), ClientError> {
    let server = loaded().await;
    let (status, body) = server
        .client
        .post_raw("/api/predict", &json!({"gender": "Male", "age": "thirty"}))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "Validation Error");
    assert_eq!(body["tip"], OPTIONS_TIP);
    Ok(())
}

#[tokio::test]
async fn test_batch() -> Result<(), ClientError> {
    let server = loaded().await;
    let mut bad = serde_json::to_value(accountant_request()).unwrap();
    bad["occupation"] = json!("Astronaut");
    let items = vec![serde_json::to_value(accountant_request()).unwrap(), bad, json!({})];

    let batch = server.client.predict_batch(&items).await?;
    assert_eq!(batch.total, 3);
    assert!(batch.predictions[0].success);
    assert_eq!(batch.predictions[0].result.as_ref().unwrap().prediction, "None");
    assert!(!batch.predictions[1].success);
    assert!(batch.predictions[1].error.as_deref().unwrap().contains("occupation"));
    assert!(!batch.predictions[2].success);
    Ok(())
}

#[tokio::test]
async fn test_without_model_endpoints_are_unavailable() -> Result<(), ClientError> {
    let server = spawn_server(PredictionService::unloaded(), true).await;
    assert!(!server.client.health().await?.model_loaded);

    match server.client.predict(&healthy_request()).await {
        Err(ClientError::Status { status, detail }) => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(detail, MODEL_NOT_LOADED_DETAIL);
        }
        other => panic!("expected 503, got {other:?}"),
    }

    let (status, _) = server.client.post_raw("/api/predict/batch", &json!([])).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(matches!(
        server.client.options().await,
        Err(ClientError::Status { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
    ));
    Ok(())
}

#[tokio::test]
async fn test_cors_header() -> Result<(), ClientError> {
    let server = loaded().await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/options", server.client.base_url()))
        .header("Origin", "http://example.com")
        .send()
        .await?;
    assert_eq!(
        response.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let plain = spawn_server(PredictionService::with_model(shipped_model()), false).await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/options", plain.client.base_url()))
        .header("Origin", "http://example.com")
        .send()
        .await?;
    assert!(response.headers().get("access-control-allow-origin").is_none());
    Ok(())
}

#[tokio::test]
async fn test_smoke_check() {
    let server = loaded().await;
    let report = server.client.smoke_check().await;
    assert!(report.all_passed(), "{}", report);
    assert_eq!(report.steps.len(), 6);

    let unloaded = spawn_server(PredictionService::unloaded(), true).await;
    let report = unloaded.client.smoke_check().await;
    assert!(!report.all_passed());
    assert!(!report.step("health").unwrap().passed);
}
