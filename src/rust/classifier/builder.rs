use log::{debug, info};

use super::category::{CategoryField, CategoryMap};
use super::error::ClassifierError;
use super::feature::{parse_feature_order, Feature, FEATURE_COUNT};
use super::model::{Categories, ModelMetadata, TrainedModel};
use super::tree::{DecisionTree, TreeNode};

/// A builder for assembling a [`TrainedModel`] with a fluent interface.
///
/// Every piece is checked as it is added and the whole model is cross-checked
/// in [`build`](TrainedModelBuilder::build), so a bad artifact fails here
/// instead of deep inside a prediction.
#[derive(Default, Debug)]
pub struct TrainedModelBuilder {
    feature_order: Option<Vec<Feature>>,
    gender: Option<CategoryMap>,
    occupation: Option<CategoryMap>,
    bmi_category: Option<CategoryMap>,
    sleep_disorder: Option<CategoryMap>,
    tree: Option<TreeNode>,
    metadata: ModelMetadata,
}

impl TrainedModelBuilder {
    /// Creates a new empty builder
    ///
    /// # Example
    /// ```
    /// use somnia::TrainedModelBuilder;
    ///
    /// let builder = TrainedModelBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the feature order the tree was trained with, by column name
    ///
    /// # Arguments
    /// * `names` - All twelve column names, in training order
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The order is already set
    ///   - A name is unknown or repeated, or a column is missing
    pub fn with_feature_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, ClassifierError> {
        if self.feature_order.is_some() {
            return Err(ClassifierError::BuildError("Feature order already set".to_string()));
        }
        self.feature_order = Some(parse_feature_order(names)?);
        Ok(self)
    }

    /// Uses the canonical training order
    /// (`Gender, Age, Occupation, ..., SystolicBP, DiastolicBP`).
    pub fn with_canonical_feature_order(mut self) -> Self {
        self.feature_order = Some(Feature::ALL.to_vec());
        self
    }

    /// Adds the label encoder for one categorical column
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - An error if the column already has an encoder
    ///
    /// # Example
    /// ```
    /// use somnia::{CategoryField, CategoryMap, TrainedModelBuilder};
    ///
    /// let builder = TrainedModelBuilder::new()
    ///     .with_category(
    ///         CategoryField::Gender,
    ///         CategoryMap::from_values(["Male", "Female"]).unwrap(),
    ///     );
    /// assert!(builder.is_ok());
    /// ```
    pub fn with_category(mut self, field: CategoryField, map: CategoryMap) -> Result<Self, ClassifierError> {
        let slot = match field {
            CategoryField::Gender => &mut self.gender,
            CategoryField::Occupation => &mut self.occupation,
            CategoryField::BmiCategory => &mut self.bmi_category,
            CategoryField::SleepDisorder => &mut self.sleep_disorder,
        };
        if slot.is_some() {
            return Err(ClassifierError::BuildError(format!(
                "Label encoder for '{}' already set",
                field
            )));
        }
        debug!("{} encoder: {} values", field, map.len());
        *slot = Some(map);
        Ok(self)
    }

    /// Sets the root of the fitted decision tree
    pub fn with_tree(mut self, root: TreeNode) -> Self {
        self.tree = Some(root);
        self
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    fn take_category(slot: Option<CategoryMap>, field: CategoryField) -> Result<CategoryMap, ClassifierError> {
        slot.ok_or_else(|| {
            ClassifierError::BuildError(format!("Missing label encoder for '{}'", field))
        })
    }

    /// Builds and returns the final TrainedModel
    ///
    /// # Returns
    /// * `Result<TrainedModel, ClassifierError>` - The model if successful, or an error if:
    ///   - The feature order, any of the four label encoders or the tree is missing
    ///   - The tree references features that do not exist
    ///   - A leaf's class weights do not match the sleep-disorder classes
    pub fn build(self) -> Result<TrainedModel, ClassifierError> {
        let feature_order = self
            .feature_order
            .ok_or_else(|| ClassifierError::BuildError("Feature order must be set".to_string()))?;
        let categories = Categories {
            gender: Self::take_category(self.gender, CategoryField::Gender)?,
            occupation: Self::take_category(self.occupation, CategoryField::Occupation)?,
            bmi_category: Self::take_category(self.bmi_category, CategoryField::BmiCategory)?,
            sleep_disorder: Self::take_category(self.sleep_disorder, CategoryField::SleepDisorder)?,
        };
        let root = self
            .tree
            .ok_or_else(|| ClassifierError::BuildError("Decision tree must be set".to_string()))?;

        let tree = DecisionTree::new(root, FEATURE_COUNT, categories.sleep_disorder.len())?;
        info!(
            "Decision tree validated: depth {}, {} leaves, {} classes",
            tree.depth(),
            tree.root().n_leaves(),
            tree.n_classes()
        );

        Ok(TrainedModel {
            tree,
            categories,
            feature_order,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> TrainedModelBuilder {
        TrainedModelBuilder::new()
            .with_canonical_feature_order()
            .with_category(CategoryField::Gender, CategoryMap::from_values(["Female", "Male"]).unwrap())
            .unwrap()
            .with_category(CategoryField::Occupation, CategoryMap::from_values(["Doctor", "Nurse"]).unwrap())
            .unwrap()
            .with_category(CategoryField::BmiCategory, CategoryMap::from_values(["Normal", "Obese"]).unwrap())
            .unwrap()
            .with_category(
                CategoryField::SleepDisorder,
                CategoryMap::from_values(["Insomnia", "None", "Sleep Apnea"]).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_build_complete_model() {
        let model = complete_builder()
            .with_tree(TreeNode::split(
                Feature::StressLevel.index(),
                6.5,
                TreeNode::leaf(vec![1.0, 8.0, 1.0]),
                TreeNode::leaf(vec![7.0, 1.0, 2.0]),
            ))
            .build()
            .unwrap();
        assert_eq!(model.feature_order(), Feature::ALL);
        assert_eq!(model.class_labels(), ["Insomnia", "None", "Sleep Apnea"]);
        assert_eq!(model.tree().depth(), 1);
    }

    #[test]
    fn test_missing_pieces_fail() {
        let err = complete_builder().build().unwrap_err();
        assert_eq!(err, ClassifierError::BuildError("Decision tree must be set".to_string()));

        let err = TrainedModelBuilder::new()
            .with_canonical_feature_order()
            .with_tree(TreeNode::leaf(vec![1.0]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Gender"));
    }

    #[test]
    fn test_duplicate_category_fails() {
        let result = complete_builder()
            .with_category(CategoryField::Gender, CategoryMap::from_values(["X"]).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_feature_order_set_twice_fails() {
        let names: Vec<&str> = Feature::ALL.iter().map(|f| f.column_name()).collect();
        let result = complete_builder().with_feature_names(&names);
        assert!(result.is_err());
    }

    #[test]
    fn test_leaf_class_count_checked_against_sleep_disorder_classes() {
        let err = complete_builder()
            .with_tree(TreeNode::leaf(vec![1.0, 1.0]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ClassifierError::BuildError(_)));
    }
}
