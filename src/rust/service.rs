use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::api::{BatchEntry, BatchResponse, ExampleResponse, HealthResponse, OptionsResponse, PredictionResponse};
use crate::classifier::{
    CategoryField, ClassifierError, FieldError, PredictionRequest, Predictor, TrainedModel,
};
use crate::config::ServerConfig;
use crate::model_manager::ModelError;

/// Everything a request handler needs, built once at startup and never
/// mutated afterwards. Share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PredictionService {
    predictor: Option<Predictor>,
    public_url: String,
}

impl PredictionService {
    /// A service with no model; every model-backed call reports
    /// [`ClassifierError::ModelNotLoaded`].
    pub fn unloaded() -> Self {
        Self {
            predictor: None,
            public_url: ServerConfig::default().public_url(),
        }
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self::with_shared_model(Arc::new(model))
    }

    pub fn with_shared_model(model: Arc<TrainedModel>) -> Self {
        Self {
            predictor: Some(Predictor::new(model)),
            ..Self::unloaded()
        }
    }

    /// Base URL used when rendering example commands.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into();
        self
    }

    /// Loads the configured artifact.
    ///
    /// Unless `require_model` is set, a missing or invalid artifact is logged
    /// and the service starts without a model so the health endpoint can
    /// report it.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ModelError> {
        let manager = config.model_manager();
        let service = match manager.load_verified(config.expected_sha256.as_deref()) {
            Ok(model) => {
                info!("Model loaded successfully from {:?}", manager.model_path());
                Self::with_model(model)
            }
            Err(e) if config.require_model => return Err(e),
            Err(ModelError::NotFound(path)) => {
                warn!("Model file not found at {}. Prediction endpoints will return 503", path);
                Self::unloaded()
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                Self::unloaded()
            }
        };
        Ok(service.with_public_url(config.public_url()))
    }

    pub fn is_model_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn predictor(&self) -> Result<&Predictor, ClassifierError> {
        self.predictor.as_ref().ok_or(ClassifierError::ModelNotLoaded)
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "online".to_string(),
            message: "Sleep Disorder Prediction API is running".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_loaded: self.is_model_loaded(),
        }
    }

    pub fn options(&self) -> Result<OptionsResponse, ClassifierError> {
        let model = self.predictor()?.model();
        let values = |field| model.category(field).values().to_vec();
        Ok(OptionsResponse {
            gender: values(CategoryField::Gender),
            occupation: values(CategoryField::Occupation),
            bmi_category: values(CategoryField::BmiCategory),
            sleep_disorders: values(CategoryField::SleepDisorder),
        })
    }

    /// A request built from values the loaded model actually knows.
    pub fn example_request(&self) -> Result<PredictionRequest, ClassifierError> {
        let model = self.predictor()?.model();
        let first = |field| {
            model
                .category(field)
                .values()
                .first()
                .cloned()
                .unwrap_or_default()
        };
        Ok(PredictionRequest {
            gender: first(CategoryField::Gender),
            age: 30,
            occupation: first(CategoryField::Occupation),
            sleep_duration: 7.5,
            quality_of_sleep: 8,
            physical_activity_level: 6,
            stress_level: 5,
            bmi_category: first(CategoryField::BmiCategory),
            heart_rate: 75,
            daily_steps: 8000,
            systolic_bp: 120,
            diastolic_bp: 80,
        })
    }

    pub fn example(&self) -> Result<ExampleResponse, ClassifierError> {
        let example_request = self.example_request()?;
        let body = serde_json::to_string(&example_request)
            .map_err(|e| ClassifierError::PredictionError(e.to_string()))?;
        Ok(ExampleResponse {
            message: "Copy this example request to test the API".to_string(),
            curl_command: format!(
                "curl -X POST {}/api/predict -H \"Content-Type: application/json\" -d '{}'",
                self.public_url, body
            ),
            example_request,
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ClassifierError> {
        let predictor = self.predictor()?;
        debug!("Prediction request: {:?}", request);
        let result = predictor.predict_request(request)?;
        info!("Prediction: {} ({:.2}%)", result.label, result.confidence);
        Ok(result.into())
    }

    /// Predicts each raw JSON item on its own. Items that do not even parse
    /// as a request are reported at their index like any other failure.
    pub fn predict_batch(&self, items: Vec<Value>) -> Result<BatchResponse, ClassifierError> {
        self.predictor()?;
        let total = items.len();
        info!("Batch prediction for {} items", total);

        let predictions = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let outcome = serde_json::from_value::<PredictionRequest>(item)
                    .map_err(|e| {
                        ClassifierError::from(FieldError::Malformed {
                            field: "request".to_string(),
                            message: e.to_string(),
                        })
                    })
                    .and_then(|request| self.predict(&request));
                match outcome {
                    Ok(response) => BatchEntry::ok(index, response),
                    Err(e) => {
                        debug!("Batch item {} failed: {}", index, e);
                        BatchEntry::failed(index, e.to_string())
                    }
                }
            })
            .collect();

        Ok(BatchResponse { predictions, total })
    }
}
