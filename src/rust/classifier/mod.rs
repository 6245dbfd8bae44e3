mod builder;
mod category;
mod encoder;
mod error;
mod feature;
mod model;
mod predictor;
pub mod tree;
mod utils;

pub use builder::TrainedModelBuilder;
pub use category::{CategoryField, CategoryMap};
pub use encoder::{normalize_category, FeatureEncoder, PredictionRequest, RawValue};
pub use error::{Bound, ClassifierError, FieldError, ValidationErrors};
pub use feature::{parse_feature_order, Feature, FeatureVector, FEATURE_COUNT};
pub use model::{Artifact, Categories, ModelMetadata, TrainedModel, ARTIFACT_FORMAT_VERSION};
pub use predictor::{advisory_message, ClassProbability, PredictionResult, Predictor, NO_DISORDER};
pub use tree::{DecisionTree, TreeNode};
