use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};

use crate::api::{ErrorResponse, OPTIONS_TIP};
use crate::classifier::ClassifierError;

/// Message returned while no model is loaded.
pub const MODEL_NOT_LOADED_DETAIL: &str = "Model not loaded. Please ensure the model file exists.";

/// Failure of a single HTTP request, mapped onto a status code and an
/// [`ErrorResponse`] body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Classifier(ClassifierError::ValidationError(errors)) if errors.has_unknown_category() => {
                StatusCode::BAD_REQUEST
            }
            Self::Classifier(ClassifierError::ValidationError(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Classifier(ClassifierError::ModelNotLoaded) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Body(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::Classifier(ClassifierError::ValidationError(errors)) => {
                ErrorResponse::validation(errors.messages())
            }
            Self::Classifier(ClassifierError::ModelNotLoaded) => ErrorResponse::new(MODEL_NOT_LOADED_DETAIL),
            Self::Classifier(ClassifierError::PredictionError(msg)) => {
                ErrorResponse::new(format!("Prediction error: {}", msg))
            }
            Self::Classifier(other) => ErrorResponse::new(format!("Prediction error: {}", other)),
            Self::Body(rejection) => ErrorResponse {
                detail: "Validation Error".to_string(),
                errors: vec![rejection.body_text()],
                tip: Some(OPTIONS_TIP.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}
