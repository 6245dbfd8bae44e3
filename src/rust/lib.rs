//! Sleep-disorder prediction backed by a pre-trained decision tree.
//!
//! Raw health and lifestyle attributes are validated and encoded with the
//! label encoders learned at training time, then run through the tree to get
//! a class (`None`, `Insomnia`, `Sleep Apnea`, ...) with a confidence.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use somnia::{CategoryField, CategoryMap, Feature, PredictionRequest, Predictor, TrainedModel, TreeNode};
//! use std::sync::Arc;
//!
//! let model = TrainedModel::builder()
//!     .with_canonical_feature_order()
//!     .with_category(CategoryField::Gender, CategoryMap::from_values(["Female", "Male"])?)?
//!     .with_category(CategoryField::Occupation, CategoryMap::from_values(["Doctor", "Nurse"])?)?
//!     .with_category(CategoryField::BmiCategory, CategoryMap::from_values(["Normal", "Overweight"])?)?
//!     .with_category(
//!         CategoryField::SleepDisorder,
//!         CategoryMap::from_values(["Insomnia", "None", "Sleep Apnea"])?,
//!     )?
//!     .with_tree(TreeNode::split(
//!         Feature::StressLevel.index(),
//!         6.5,
//!         TreeNode::leaf(vec![1.0, 8.0, 1.0]),
//!         TreeNode::leaf(vec![7.0, 1.0, 2.0]),
//!     ))
//!     .build()?;
//!
//! let predictor = Predictor::new(Arc::new(model));
//! let request = PredictionRequest {
//!     gender: "f".into(),
//!     age: 41,
//!     occupation: "Nurse".into(),
//!     sleep_duration: 5.5,
//!     quality_of_sleep: 4,
//!     physical_activity_level: 3,
//!     stress_level: 8,
//!     bmi_category: "overweight".into(),
//!     heart_rate: 88,
//!     daily_steps: 3500,
//!     systolic_bp: 138,
//!     diastolic_bp: 92,
//! };
//!
//! let result = predictor.predict_request(&request)?;
//! assert_eq!(result.label, "Insomnia");
//! assert_eq!(result.confidence, 70.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! [`PredictionService`] holds the loaded model and is shared read-only by
//! every request; [`server::build_router`] exposes it over HTTP.
//!
//! ```rust,no_run
//! # async fn run() -> std::io::Result<()> {
//! use somnia::{PredictionService, ServerConfig};
//!
//! let config = ServerConfig::default();
//! let service = PredictionService::from_config(&config).map_err(std::io::Error::other)?;
//! somnia::server::serve(&config, service).await
//! # }
//! ```

pub mod api;
pub mod classifier;
pub mod client;
pub mod config;
pub mod model_manager;
pub mod server;
pub mod service;

pub use classifier::{
    advisory_message, normalize_category, Bound, CategoryField, CategoryMap, ClassProbability,
    ClassifierError, Feature, FeatureEncoder, FeatureVector, FieldError, PredictionRequest,
    PredictionResult, Predictor, TrainedModel, TrainedModelBuilder, TreeNode, ValidationErrors,
};
pub use client::{ApiClient, CheckReport, ClientError};
pub use config::ServerConfig;
pub use model_manager::{ModelError, ModelManager};
pub use service::PredictionService;

/// Initializes `env_logger`, defaulting to the `info` level when `RUST_LOG`
/// is unset. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
