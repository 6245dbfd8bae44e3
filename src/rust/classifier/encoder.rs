use serde::{Deserialize, Serialize};

use super::category::CategoryField;
use super::error::{Bound, ClassifierError, FieldError, ValidationErrors};
use super::feature::{Feature, FeatureVector, FEATURE_COUNT};
use super::model::Categories;

/// Accepted spellings for gender, matched case-insensitively.
const GENDER_SYNONYMS: &[(&str, &str)] = &[
    ("male", "Male"),
    ("m", "Male"),
    ("female", "Female"),
    ("f", "Female"),
];

/// Accepted spellings for BMI category, matched case-insensitively.
const BMI_SYNONYMS: &[(&str, &str)] = &[
    ("normal", "Normal"),
    ("normal weight", "Normal Weight"),
    ("overweight", "Overweight"),
    ("obese", "Obese"),
];

/// Raw, human-entered attributes for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub gender: String,
    pub age: i64,
    pub occupation: String,
    pub sleep_duration: f64,
    pub quality_of_sleep: i64,
    pub physical_activity_level: i64,
    pub stress_level: i64,
    pub bmi_category: String,
    pub heart_rate: i64,
    pub daily_steps: i64,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
}

/// A request value before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl PredictionRequest {
    pub fn value(&self, feature: Feature) -> RawValue<'_> {
        match feature {
            Feature::Gender => RawValue::Text(&self.gender),
            Feature::Age => RawValue::Number(self.age as f64),
            Feature::Occupation => RawValue::Text(&self.occupation),
            Feature::SleepDuration => RawValue::Number(self.sleep_duration),
            Feature::QualityOfSleep => RawValue::Number(self.quality_of_sleep as f64),
            Feature::PhysicalActivityLevel => RawValue::Number(self.physical_activity_level as f64),
            Feature::StressLevel => RawValue::Number(self.stress_level as f64),
            Feature::BmiCategory => RawValue::Text(&self.bmi_category),
            Feature::HeartRate => RawValue::Number(self.heart_rate as f64),
            Feature::DailySteps => RawValue::Number(self.daily_steps as f64),
            Feature::SystolicBp => RawValue::Number(self.systolic_bp as f64),
            Feature::DiastolicBp => RawValue::Number(self.diastolic_bp as f64),
        }
    }
}

/// Maps a user-entered categorical value onto its canonical label.
///
/// Gender and BMI category go through their synonym tables; occupation is
/// taken verbatim and checked against the learned classes by the encoder.
pub fn normalize_category(field: CategoryField, raw: &str) -> Result<String, FieldError> {
    let table = match field {
        CategoryField::Gender => GENDER_SYNONYMS,
        CategoryField::BmiCategory => BMI_SYNONYMS,
        CategoryField::Occupation | CategoryField::SleepDisorder => return Ok(raw.to_string()),
    };
    let key = raw.to_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .ok_or_else(|| FieldError::InvalidChoice {
            field: field.request_field().to_string(),
            value: raw.to_string(),
            allowed: canonical_labels(table),
        })
}

fn canonical_labels(table: &[(&str, &str)]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for (_, canonical) in table {
        if !labels.iter().any(|l| l == canonical) {
            labels.push(canonical.to_string());
        }
    }
    labels
}

fn check_range(feature: Feature, value: f64) -> Result<f64, FieldError> {
    let field = feature.request_field().to_string();
    if !value.is_finite() {
        return Err(FieldError::NotFinite { field, value });
    }
    let Some((min, max)) = feature.bounds() else {
        return Ok(value);
    };
    if value < min {
        Err(FieldError::OutOfRange { field, bound: Bound::Minimum, limit: min, value })
    } else if value > max {
        Err(FieldError::OutOfRange { field, bound: Bound::Maximum, limit: max, value })
    } else {
        Ok(value)
    }
}

/// Turns raw attributes into the numeric vector the classifier consumes,
/// using the label encoders learned at training time.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    categories: &'a Categories,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(categories: &'a Categories) -> Self {
        Self { categories }
    }

    /// Validates and encodes every field.
    ///
    /// Encoding is all-or-nothing: on failure the error lists every field that
    /// did not validate, in feature order.
    pub fn encode(&self, request: &PredictionRequest) -> Result<FeatureVector, ClassifierError> {
        let mut values = [0.0; FEATURE_COUNT];
        let mut errors = Vec::new();

        for feature in Feature::ALL {
            let encoded = match request.value(feature) {
                RawValue::Text(raw) => self.encode_category(feature, raw),
                RawValue::Number(value) => check_range(feature, value),
            };
            match encoded {
                Ok(value) => values[feature.index()] = value,
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(FeatureVector::from_canonical(values))
        } else {
            Err(ValidationErrors::new(errors).into())
        }
    }

    fn encode_category(&self, feature: Feature, raw: &str) -> Result<f64, FieldError> {
        let field = feature.category().ok_or_else(|| FieldError::Malformed {
            field: feature.request_field().to_string(),
            message: "expected a number".to_string(),
        })?;
        let canonical = normalize_category(field, raw)?;
        let map = self.categories.get(field);
        map.code(&canonical)
            .map(|code| code as f64)
            .ok_or_else(|| FieldError::UnknownCategory {
                field: field.request_field().to_string(),
                value: raw.to_string(),
                valid: map.values().to_vec(),
            })
    }
}
