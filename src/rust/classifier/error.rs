use std::fmt;

/// Which end of an inclusive range a value fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Minimum,
    Maximum,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimum => write!(f, "minimum"),
            Self::Maximum => write!(f, "maximum"),
        }
    }
}

/// A problem with a single input field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A numeric value outside its inclusive range
    OutOfRange {
        field: String,
        bound: Bound,
        limit: f64,
        value: f64,
    },
    /// A numeric value that is NaN or infinite
    NotFinite { field: String, value: f64 },
    /// A categorical spelling outside the accepted synonyms for the field
    InvalidChoice {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
    /// A categorical value the model's label encoder does not know
    UnknownCategory {
        field: String,
        value: String,
        valid: Vec<String>,
    },
    /// The field could not be read at all (missing, wrong JSON type, ...)
    Malformed { field: String, message: String },
}

impl FieldError {
    /// The request field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::OutOfRange { field, .. }
            | Self::NotFinite { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::UnknownCategory { field, .. }
            | Self::Malformed { field, .. } => field,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { field, bound: Bound::Minimum, limit, value } => {
                write!(f, "{}: value {} is below the minimum of {}", field, value, limit)
            }
            Self::OutOfRange { field, bound: Bound::Maximum, limit, value } => {
                write!(f, "{}: value {} is above the maximum of {}", field, value, limit)
            }
            Self::NotFinite { field, value } => {
                write!(f, "{}: value {} is not a finite number", field, value)
            }
            Self::InvalidChoice { field, value, allowed } => write!(
                f,
                "{}: '{}' must be one of: {}",
                field,
                value,
                allowed.join(", ")
            ),
            Self::UnknownCategory { field, value, valid } => write!(
                f,
                "{}: '{}' is not a recognized value. Valid values are: {}",
                field,
                value,
                valid.join(", ")
            ),
            Self::Malformed { field, message } => write!(f, "{}: {}", field, message),
        }
    }
}

/// Every field that failed validation for one request, in feature order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if any categorical value was well-formed but unknown to the
    /// model's label encoders.
    pub fn has_unknown_category(&self) -> bool {
        self.0
            .iter()
            .any(|e| matches!(e, FieldError::UnknownCategory { .. }))
    }

    /// Human-readable message per failing field.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self::single(err)
    }
}

/// Represents the different types of errors that can occur while encoding
/// features, building a model or making predictions.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// The input did not pass validation; caller-fixable
    ValidationError(ValidationErrors),
    /// No trained model is loaded; operator-fixable
    ModelNotLoaded,
    /// The feature vector does not match what the model was trained on
    FeatureMismatch { expected: usize, got: usize },
    /// Unexpected failure while evaluating the model
    PredictionError(String),
    /// The model or artifact is structurally invalid
    BuildError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(errors) => write!(f, "Validation error: {}", errors),
            Self::ModelNotLoaded => write!(f, "Model not loaded"),
            Self::FeatureMismatch { expected, got } => write!(
                f,
                "Feature mismatch: model expects {} features, got {}",
                expected, got
            ),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<ValidationErrors> for ClassifierError {
    fn from(errors: ValidationErrors) -> Self {
        ClassifierError::ValidationError(errors)
    }
}

impl From<FieldError> for ClassifierError {
    fn from(err: FieldError) -> Self {
        ClassifierError::ValidationError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_names_field_bound_and_value() {
        let err = FieldError::OutOfRange {
            field: "age".into(),
            bound: Bound::Minimum,
            limit: 10.0,
            value: 9.0,
        };
        assert_eq!(err.to_string(), "age: value 9 is below the minimum of 10");
    }

    #[test]
    fn test_unknown_category_lists_valid_values() {
        let err = FieldError::UnknownCategory {
            field: "occupation".into(),
            value: "Astronaut".into(),
            valid: vec!["Doctor".into(), "Nurse".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Astronaut"));
        assert!(msg.ends_with("Doctor, Nurse"));
    }

    #[test]
    fn test_invalid_choice_is_not_an_unknown_category() {
        let errors = ValidationErrors::single(FieldError::InvalidChoice {
            field: "gender".into(),
            value: "other".into(),
            allowed: vec!["Male".into(), "Female".into()],
        });
        assert!(!errors.has_unknown_category());
        assert_eq!(errors.to_string(), "gender: 'other' must be one of: Male, Female");
    }

    #[test]
    fn test_validation_errors_join() {
        let errors = ValidationErrors::new(vec![
            FieldError::Malformed { field: "age".into(), message: "missing".into() },
            FieldError::NotFinite { field: "sleep_duration".into(), value: f64::NAN },
        ]);
        assert_eq!(errors.len(), 2);
        assert!(!errors.has_unknown_category());
        assert_eq!(
            errors.to_string(),
            "age: missing; sleep_duration: value NaN is not a finite number"
        );
    }
}
