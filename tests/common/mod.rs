#![allow(dead_code)]

use std::path::PathBuf;

use somnia::{
    CategoryField, CategoryMap, Feature, ModelManager, PredictionRequest, TrainedModel, TreeNode,
};

/// Path of the demo artifact shipped in `models/`.
pub fn shipped_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("sleep_disorder_model.json")
}

pub fn shipped_model() -> TrainedModel {
    ModelManager::new(shipped_model_path())
        .load_model()
        .expect("shipped artifact should load")
}

/// Small hand-built model: high stress means insomnia, otherwise a nurse is
/// flagged for sleep apnea and everyone else is fine.
pub fn fixture_model() -> TrainedModel {
    TrainedModel::builder()
        .with_canonical_feature_order()
        .with_category(CategoryField::Gender, CategoryMap::from_values(["Female", "Male"]).unwrap())
        .unwrap()
        .with_category(
            CategoryField::Occupation,
            CategoryMap::from_values(["Doctor", "Engineer", "Nurse", "Teacher"]).unwrap(),
        )
        .unwrap()
        .with_category(
            CategoryField::BmiCategory,
            CategoryMap::from_values(["Normal", "Normal Weight", "Obese", "Overweight"]).unwrap(),
        )
        .unwrap()
        .with_category(
            CategoryField::SleepDisorder,
            CategoryMap::from_values(["Insomnia", "None", "Sleep Apnea"]).unwrap(),
        )
        .unwrap()
        .with_tree(TreeNode::split(
            Feature::StressLevel.index(),
            7.5,
            TreeNode::split(
                Feature::Occupation.index(),
                1.5,
                TreeNode::leaf(vec![1.0, 18.0, 1.0]),
                TreeNode::split(
                    Feature::Occupation.index(),
                    2.5,
                    TreeNode::leaf(vec![2.0, 3.0, 15.0]),
                    TreeNode::leaf(vec![1.0, 9.0, 0.0]),
                ),
            ),
            TreeNode::leaf(vec![16.0, 2.0, 2.0]),
        ))
        .build()
        .unwrap()
}

pub fn healthy_request() -> PredictionRequest {
    PredictionRequest {
        gender: "Male".to_string(),
        age: 30,
        occupation: "Engineer".to_string(),
        sleep_duration: 7.5,
        quality_of_sleep: 8,
        physical_activity_level: 6,
        stress_level: 5,
        bmi_category: "Normal".to_string(),
        heart_rate: 75,
        daily_steps: 8000,
        systolic_bp: 120,
        diastolic_bp: 80,
    }
}

/// [`healthy_request`] with an occupation only the shipped model knows.
pub fn accountant_request() -> PredictionRequest {
    PredictionRequest {
        occupation: "Accountant".to_string(),
        ..healthy_request()
    }
}
