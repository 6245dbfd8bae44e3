//! JSON bodies exchanged over the HTTP API, shared by the server and the
//! smoke-check client.

use serde::{Deserialize, Serialize};

use crate::classifier::{PredictionRequest, PredictionResult};

/// Hint attached to validation failures.
pub const OPTIONS_TIP: &str = "Check the /api/options endpoint to see valid values for categorical fields";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub model_loaded: bool,
}

/// Values the model recognizes for every categorical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub gender: Vec<String>,
    pub occupation: Vec<String>,
    pub bmi_category: Vec<String>,
    pub sleep_disorders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub message: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.label,
            confidence: Some(result.confidence),
            message: result.message,
        }
    }
}

/// Outcome for one position of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub index: usize,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PredictionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn ok(index: usize, result: PredictionResponse) -> Self {
        Self { index, success: true, result: Some(result), error: None }
    }

    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        Self { index, success: false, result: None, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub predictions: Vec<BatchEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub message: String,
    pub example_request: PredictionRequest,
    pub curl_command: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into(), errors: Vec::new(), tip: None }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            detail: "Validation Error".to_string(),
            errors,
            tip: Some(OPTIONS_TIP.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_entry_omits_absent_side() {
        let ok = serde_json::to_value(BatchEntry::ok(
            0,
            PredictionResponse {
                prediction: "None".into(),
                confidence: Some(97.3),
                message: "fine".into(),
            },
        ))
        .unwrap();
        assert!(ok.get("error").is_none());
        assert_eq!(ok["result"]["confidence"], 97.3);

        let failed = serde_json::to_value(BatchEntry::failed(1, "occupation: bad")).unwrap();
        assert!(failed.get("result").is_none());
        assert_eq!(failed["success"], false);
    }

    #[test]
    fn test_missing_confidence_deserializes() {
        let response: PredictionResponse =
            serde_json::from_str(r#"{"prediction":"Insomnia","message":"m"}"#).unwrap();
        assert_eq!(response.confidence, None);
    }
}
