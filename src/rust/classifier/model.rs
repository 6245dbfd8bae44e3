use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::builder::TrainedModelBuilder;
use super::category::{CategoryField, CategoryMap};
use super::error::ClassifierError;
use super::feature::Feature;
use super::tree::{DecisionTree, TreeNode};

/// Artifact schema version this crate reads and writes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Training-time facts carried along with the model. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_samples_leaf: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_on: Option<String>,
}

/// On-disk layout of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Class lists keyed by column name, each sorted in code order
    pub label_encoders: BTreeMap<String, Vec<String>>,
    pub tree: TreeNode,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

/// The four label encoders learned at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct Categories {
    pub gender: CategoryMap,
    pub occupation: CategoryMap,
    pub bmi_category: CategoryMap,
    pub sleep_disorder: CategoryMap,
}

impl Categories {
    pub fn get(&self, field: CategoryField) -> &CategoryMap {
        match field {
            CategoryField::Gender => &self.gender,
            CategoryField::Occupation => &self.occupation,
            CategoryField::BmiCategory => &self.bmi_category,
            CategoryField::SleepDisorder => &self.sleep_disorder,
        }
    }
}

/// A loaded, validated classifier together with everything needed to encode
/// its inputs and decode its outputs. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub(crate) tree: DecisionTree,
    pub(crate) categories: Categories,
    pub(crate) feature_order: Vec<Feature>,
    pub(crate) metadata: ModelMetadata,
}

// Shared read-only across request handlers
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<TrainedModel>();
    }
};

impl TrainedModel {
    pub fn builder() -> TrainedModelBuilder {
        TrainedModelBuilder::new()
    }

    /// Validates an artifact and turns it into a usable model.
    pub fn from_artifact(artifact: Artifact) -> Result<Self, ClassifierError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ClassifierError::BuildError(format!(
                "Unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let mut builder = Self::builder().with_feature_names(&artifact.feature_names)?;
        for (column, classes) in artifact.label_encoders {
            let field = CategoryField::from_column_name(&column).ok_or_else(|| {
                ClassifierError::BuildError(format!("Unknown label encoder '{}'", column))
            })?;
            let map = CategoryMap::try_from(classes).map_err(|e| {
                ClassifierError::BuildError(format!("Label encoder '{}': {}", column, e))
            })?;
            builder = builder.with_category(field, map)?;
        }
        builder
            .with_tree(artifact.tree)
            .with_metadata(artifact.metadata)
            .build()
    }

    pub fn to_artifact(&self) -> Artifact {
        Artifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: self
                .feature_order
                .iter()
                .map(|f| f.column_name().to_string())
                .collect(),
            label_encoders: CategoryField::ALL
                .into_iter()
                .map(|field| {
                    (
                        field.column_name().to_string(),
                        self.categories.get(field).values().to_vec(),
                    )
                })
                .collect(),
            tree: self.tree.root().clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn category(&self, field: CategoryField) -> &CategoryMap {
        self.categories.get(field)
    }

    /// Feature order the tree was trained with.
    pub fn feature_order(&self) -> &[Feature] {
        &self.feature_order
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Sleep-disorder labels, in class-code order.
    pub fn class_labels(&self) -> &[String] {
        self.categories.sleep_disorder.values()
    }
}
