//! Read-only CART decision tree evaluation.
//!
//! Trees are fitted elsewhere and arrive through the model artifact; this
//! module only validates their structure and walks them.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::normalize_distribution;

/// Internal node: samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Index into the model's feature order
    pub feature: usize,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Terminal node holding per-class weights (training sample counts or
/// probabilities), indexed by class code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub distribution: Vec<f64>,
}

/// A node in a decision tree (either a split or a leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

impl TreeNode {
    pub fn leaf(distribution: Vec<f64>) -> Self {
        TreeNode::Leaf(Leaf { distribution })
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split(Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(split) => split.left.n_leaves() + split.right.n_leaves(),
        }
    }
}

/// A validated classification tree with normalized leaf distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: TreeNode,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    /// Validates `root` against the expected input width and class count.
    pub fn new(root: TreeNode, n_features: usize, n_classes: usize) -> Result<Self, ClassifierError> {
        if n_classes == 0 {
            return Err(ClassifierError::BuildError("Tree must predict at least one class".into()));
        }
        let root = Self::validate(root, n_features, n_classes)?;
        Ok(Self { root, n_features, n_classes })
    }

    fn validate(node: TreeNode, n_features: usize, n_classes: usize) -> Result<TreeNode, ClassifierError> {
        match node {
            TreeNode::Leaf(leaf) => {
                if leaf.distribution.len() != n_classes {
                    return Err(ClassifierError::BuildError(format!(
                        "Leaf has {} class weights, expected {}",
                        leaf.distribution.len(),
                        n_classes
                    )));
                }
                let distribution = normalize_distribution(&leaf.distribution).ok_or_else(|| {
                    ClassifierError::BuildError(format!(
                        "Leaf weights {:?} must be finite, non-negative and not all zero",
                        leaf.distribution
                    ))
                })?;
                Ok(TreeNode::leaf(distribution))
            }
            TreeNode::Split(split) => {
                if split.feature >= n_features {
                    return Err(ClassifierError::BuildError(format!(
                        "Split references feature {} but the model has {} features",
                        split.feature, n_features
                    )));
                }
                if !split.threshold.is_finite() {
                    return Err(ClassifierError::BuildError(format!(
                        "Split on feature {} has a non-finite threshold",
                        split.feature
                    )));
                }
                let left = Self::validate(*split.left, n_features, n_classes)?;
                let right = Self::validate(*split.right, n_features, n_classes)?;
                Ok(TreeNode::split(split.feature, split.threshold, left, right))
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Class probabilities for one sample laid out in the model's feature order.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        if x.len() != self.n_features {
            return Err(ClassifierError::FeatureMismatch {
                expected: self.n_features,
                got: x.len(),
            });
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::PredictionError(format!(
                "Feature {} is not a finite number",
                i
            )));
        }

        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(Array1::from(leaf.distribution.clone())),
                TreeNode::Split(split) => {
                    node = if x[split.feature] <= split.threshold {
                        split.left.as_ref()
                    } else {
                        split.right.as_ref()
                    };
                }
            }
        }
    }
}
