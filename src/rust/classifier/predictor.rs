use std::sync::Arc;

use log::debug;
use ndarray::ArrayView1;
use serde::Serialize;

use super::encoder::{FeatureEncoder, PredictionRequest};
use super::error::ClassifierError;
use super::feature::FeatureVector;
use super::model::TrainedModel;
use super::utils::{argmax, to_percent};

/// Class label meaning "no disorder".
pub const NO_DISORDER: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Outcome of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub code: usize,
    /// Maximum class probability as a percentage, rounded to two decimals
    pub confidence: f64,
    /// Every class in code order
    pub probabilities: Vec<ClassProbability>,
    pub message: String,
}

impl PredictionResult {
    pub fn is_disorder(&self) -> bool {
        self.label != NO_DISORDER
    }
}

/// Advisory text shown alongside a predicted label.
pub fn advisory_message(label: &str) -> String {
    if label == NO_DISORDER {
        "No sleep disorder detected. Maintain healthy lifestyle habits!".to_string()
    } else {
        format!(
            "Potential sleep disorder detected: {}. Consider consulting a healthcare professional.",
            label
        )
    }
}

/// Runs the trained classifier on encoded features.
///
/// Cheap to clone; clones share the same model.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<TrainedModel>,
}

impl Predictor {
    pub fn new(model: Arc<TrainedModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(self.model.categories())
    }

    /// Class probabilities for values already laid out in the model's feature
    /// order.
    pub fn predict_proba(&self, ordered: ArrayView1<f64>) -> Result<Vec<f64>, ClassifierError> {
        Ok(self.model.tree().predict_proba(ordered)?.to_vec())
    }

    /// Predicts from an encoded feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ClassifierError> {
        let ordered = features.ordered(self.model.feature_order());
        let probas = self.model.tree().predict_proba(ordered.view())?;
        let (code, max_proba) = argmax(&probas).ok_or_else(|| {
            ClassifierError::PredictionError("Classifier returned no class probabilities".into())
        })?;

        let classes = &self.model.categories().sleep_disorder;
        let label = classes
            .label(code)
            .ok_or_else(|| {
                ClassifierError::PredictionError(format!("Class code {} has no label", code))
            })?
            .to_string();

        let probabilities = classes
            .values()
            .iter()
            .zip(probas.iter())
            .map(|(label, &probability)| ClassProbability { label: label.clone(), probability })
            .collect();

        debug!("Predicted '{}' (code {}, p={:.4})", label, code, max_proba);

        Ok(PredictionResult {
            message: advisory_message(&label),
            confidence: to_percent(max_proba),
            label,
            code,
            probabilities,
        })
    }

    /// Validates, encodes and predicts in one step.
    pub fn predict_request(&self, request: &PredictionRequest) -> Result<PredictionResult, ClassifierError> {
        let features = self.encoder().encode(request)?;
        self.predict(&features)
    }

    /// Predicts every request independently; one failure never affects the
    /// others. Results line up with the input positions.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Vec<Result<PredictionResult, ClassifierError>> {
        requests.iter().map(|request| self.predict_request(request)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::category::{CategoryField, CategoryMap};
    use crate::classifier::feature::{Feature, FEATURE_COUNT};
    use crate::classifier::tree::TreeNode;
    use ndarray::Array1;

    fn predictor_with_tree(root: TreeNode) -> Predictor {
        let model = TrainedModel::builder()
            .with_canonical_feature_order()
            .with_category(CategoryField::Gender, CategoryMap::from_values(["Female", "Male"]).unwrap())
            .unwrap()
            .with_category(CategoryField::Occupation, CategoryMap::from_values(["Doctor"]).unwrap())
            .unwrap()
            .with_category(CategoryField::BmiCategory, CategoryMap::from_values(["Normal"]).unwrap())
            .unwrap()
            .with_category(
                CategoryField::SleepDisorder,
                CategoryMap::from_values(["Insomnia", "None", "Sleep Apnea"]).unwrap(),
            )
            .unwrap()
            .with_tree(root)
            .build()
            .unwrap();
        Predictor::new(Arc::new(model))
    }

    fn features(stress: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[Feature::StressLevel.index()] = stress;
        FeatureVector::from_canonical(values)
    }

    #[test]
    fn test_predicts_label_confidence_and_message() {
        let predictor = predictor_with_tree(TreeNode::split(
            Feature::StressLevel.index(),
            6.5,
            TreeNode::leaf(vec![2.0, 180.0, 3.0]),
            TreeNode::leaf(vec![1.0, 0.0, 3.0]),
        ));

        let calm = predictor.predict(&features(3.0)).unwrap();
        assert_eq!(calm.label, "None");
        assert_eq!(calm.code, 1);
        assert_eq!(calm.confidence, 97.3);
        assert!(!calm.is_disorder());
        assert_eq!(calm.message, "No sleep disorder detected. Maintain healthy lifestyle habits!");
        assert_eq!(calm.probabilities.len(), 3);

        let stressed = predictor.predict(&features(9.0)).unwrap();
        assert_eq!(stressed.label, "Sleep Apnea");
        assert_eq!(stressed.confidence, 75.0);
        assert!(stressed.message.contains("Sleep Apnea"));
    }

    #[test]
    fn test_tie_goes_to_lowest_class_code() {
        let predictor = predictor_with_tree(TreeNode::leaf(vec![1.0, 2.0, 2.0]));
        let result = predictor.predict(&features(1.0)).unwrap();
        assert_eq!(result.label, "None");
        assert_eq!(result.confidence, 40.0);

        let predictor = predictor_with_tree(TreeNode::leaf(vec![1.0, 1.0, 1.0]));
        assert_eq!(predictor.predict(&features(1.0)).unwrap().label, "Insomnia");
    }

    #[test]
    fn test_wrong_width_is_an_internal_error() {
        let predictor = predictor_with_tree(TreeNode::leaf(vec![1.0, 1.0, 1.0]));
        let err = predictor.predict_proba(Array1::<f64>::zeros(11).view()).unwrap_err();
        assert_eq!(err, ClassifierError::FeatureMismatch { expected: 12, got: 11 });
    }

    #[test]
    fn test_advisory_message() {
        assert!(advisory_message("Insomnia").starts_with("Potential sleep disorder detected: Insomnia."));
    }
}
