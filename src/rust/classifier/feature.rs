use std::fmt;

use ndarray::Array1;

use super::category::CategoryField;
use super::error::ClassifierError;

/// Number of input features the classifier consumes.
pub const FEATURE_COUNT: usize = 12;

/// One input column of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Gender,
    Age,
    Occupation,
    SleepDuration,
    QualityOfSleep,
    PhysicalActivityLevel,
    StressLevel,
    BmiCategory,
    HeartRate,
    DailySteps,
    SystolicBp,
    DiastolicBp,
}

impl Feature {
    /// Canonical training order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Gender,
        Feature::Age,
        Feature::Occupation,
        Feature::SleepDuration,
        Feature::QualityOfSleep,
        Feature::PhysicalActivityLevel,
        Feature::StressLevel,
        Feature::BmiCategory,
        Feature::HeartRate,
        Feature::DailySteps,
        Feature::SystolicBp,
        Feature::DiastolicBp,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column_name(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Age => "Age",
            Self::Occupation => "Occupation",
            Self::SleepDuration => "Sleep Duration",
            Self::QualityOfSleep => "Quality of Sleep",
            Self::PhysicalActivityLevel => "Physical Activity Level",
            Self::StressLevel => "Stress Level",
            Self::BmiCategory => "BMI Category",
            Self::HeartRate => "Heart Rate",
            Self::DailySteps => "Daily Steps",
            Self::SystolicBp => "SystolicBP",
            Self::DiastolicBp => "DiastolicBP",
        }
    }

    pub fn request_field(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Occupation => "occupation",
            Self::SleepDuration => "sleep_duration",
            Self::QualityOfSleep => "quality_of_sleep",
            Self::PhysicalActivityLevel => "physical_activity_level",
            Self::StressLevel => "stress_level",
            Self::BmiCategory => "bmi_category",
            Self::HeartRate => "heart_rate",
            Self::DailySteps => "daily_steps",
            Self::SystolicBp => "systolic_bp",
            Self::DiastolicBp => "diastolic_bp",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }

    /// The label encoder backing this feature, if it is categorical.
    pub fn category(self) -> Option<CategoryField> {
        match self {
            Self::Gender => Some(CategoryField::Gender),
            Self::Occupation => Some(CategoryField::Occupation),
            Self::BmiCategory => Some(CategoryField::BmiCategory),
            _ => None,
        }
    }

    /// Inclusive range accepted for a numeric feature.
    pub fn bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Age => Some((10.0, 100.0)),
            Self::SleepDuration => Some((0.0, 12.0)),
            Self::QualityOfSleep | Self::PhysicalActivityLevel | Self::StressLevel => {
                Some((1.0, 10.0))
            }
            Self::HeartRate => Some((40.0, 150.0)),
            Self::DailySteps => Some((0.0, 50_000.0)),
            Self::SystolicBp => Some((90.0, 200.0)),
            Self::DiastolicBp => Some((60.0, 130.0)),
            Self::Gender | Self::Occupation | Self::BmiCategory => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Resolves a recorded feature-name list into typed features.
///
/// The list must name every known column exactly once; any other shape means
/// the artifact was trained against a different schema.
pub fn parse_feature_order<S: AsRef<str>>(names: &[S]) -> Result<Vec<Feature>, ClassifierError> {
    if names.len() != FEATURE_COUNT {
        return Err(ClassifierError::BuildError(format!(
            "Expected {} feature names, got {}",
            FEATURE_COUNT,
            names.len()
        )));
    }
    let mut order = Vec::with_capacity(FEATURE_COUNT);
    for name in names {
        let name = name.as_ref();
        let feature = Feature::from_column_name(name)
            .ok_or_else(|| ClassifierError::BuildError(format!("Unknown feature name '{}'", name)))?;
        if order.contains(&feature) {
            return Err(ClassifierError::BuildError(format!("Duplicate feature name '{}'", name)));
        }
        order.push(feature);
    }
    Ok(order)
}

/// Encoded input values keyed by feature.
///
/// Values are stored in canonical order; use [`FeatureVector::ordered`] to lay
/// them out the way a particular model expects.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Wraps already-encoded values given in canonical order.
    pub fn from_canonical(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Values in canonical order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Lays the values out in `order`.
    pub fn ordered(&self, order: &[Feature]) -> Array1<f64> {
        order.iter().map(|&f| self.get(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_index_matches_position() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(Feature::from_column_name(feature.column_name()), Some(*feature));
        }
    }

    #[test]
    fn test_parse_feature_order() {
        let names: Vec<&str> = Feature::ALL.iter().map(|f| f.column_name()).collect();
        assert_eq!(parse_feature_order(&names).unwrap(), Feature::ALL.to_vec());

        let mut swapped = names.clone();
        swapped.swap(0, 1);
        let order = parse_feature_order(&swapped).unwrap();
        assert_eq!(order[0], Feature::Age);

        assert!(parse_feature_order(&names[..11]).is_err());

        let mut dup = names.clone();
        dup[1] = "Gender";
        assert!(parse_feature_order(&dup).is_err());

        let mut unknown = names;
        unknown[3] = "Sleep Hours";
        assert!(parse_feature_order(&unknown).is_err());
    }

    #[test]
    fn test_ordered_respects_model_order() {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        let vector = FeatureVector::from_canonical(values);
        let reversed: Vec<Feature> = Feature::ALL.iter().rev().copied().collect();
        let laid_out = vector.ordered(&reversed);
        assert_eq!(laid_out.len(), FEATURE_COUNT);
        assert_eq!(laid_out[0], 11.0);
        assert_eq!(laid_out[11], 0.0);
    }

    #[test]
    fn test_categorical_features_have_no_bounds() {
        for feature in Feature::ALL {
            assert_ne!(feature.category().is_some(), feature.bounds().is_some());
        }
    }
}
