use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::error::ApiError;
use crate::api::{BatchResponse, ExampleResponse, HealthResponse, OptionsResponse, PredictionResponse};
use crate::classifier::PredictionRequest;
use crate::service::PredictionService;

pub(crate) type AppState = Arc<PredictionService>;

pub(crate) async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(service.health())
}

pub(crate) async fn options(State(service): State<AppState>) -> Result<Json<OptionsResponse>, ApiError> {
    Ok(Json(service.options()?))
}

pub(crate) async fn example(State(service): State<AppState>) -> Result<Json<ExampleResponse>, ApiError> {
    Ok(Json(service.example()?))
}

pub(crate) async fn predict(
    State(service): State<AppState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // An unloaded model takes precedence over a bad body.
    service.predictor()?;
    let Json(request) = body?;
    Ok(Json(service.predict(&request)?))
}

/// Items are taken as raw JSON so that one malformed entry fails alone.
pub(crate) async fn predict_batch(
    State(service): State<AppState>,
    body: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    service.predictor()?;
    let Json(items) = body?;
    Ok(Json(service.predict_batch(items)?))
}
