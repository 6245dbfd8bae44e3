use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// The four categorical columns the model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryField {
    Gender,
    Occupation,
    BmiCategory,
    SleepDisorder,
}

impl CategoryField {
    pub const ALL: [CategoryField; 4] = [
        CategoryField::Gender,
        CategoryField::Occupation,
        CategoryField::BmiCategory,
        CategoryField::SleepDisorder,
    ];

    /// Column name as recorded in the training data and the artifact.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Occupation => "Occupation",
            Self::BmiCategory => "BMI Category",
            Self::SleepDisorder => "Sleep Disorder",
        }
    }

    /// Field name as used in API requests and error messages.
    pub fn request_field(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Occupation => "occupation",
            Self::BmiCategory => "bmi_category",
            Self::SleepDisorder => "sleep_disorder",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column_name() == name)
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Immutable label encoding for one categorical column.
///
/// Codes are dense, start at 0 and follow the lexicographic order of the
/// values, which is how the classifier was trained to see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryMap {
    values: Vec<String>,
    codes: HashMap<String, usize>,
}

impl CategoryMap {
    /// Builds a map from any collection of observed values, sorting and
    /// de-duplicating them the way a label encoder is fitted.
    pub fn from_values<I, S>(values: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if unique.is_empty() {
            return Err(ClassifierError::BuildError(
                "Cannot build a category map from no values".to_string(),
            ));
        }
        Ok(Self::from_sorted(unique.into_iter().collect()))
    }

    fn from_sorted(values: Vec<String>) -> Self {
        let codes = values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();
        Self { values, codes }
    }

    pub fn code(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    pub fn label(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// All known values, in code order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Accepts a persisted class list only if it is already in code order.
impl TryFrom<Vec<String>> for CategoryMap {
    type Error = ClassifierError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        if values.is_empty() {
            return Err(ClassifierError::BuildError(
                "Category map must contain at least one value".to_string(),
            ));
        }
        if let Some(pair) = values.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ClassifierError::BuildError(format!(
                "Category values must be unique and sorted, found '{}' before '{}'",
                pair[0], pair[1]
            )));
        }
        Ok(Self::from_sorted(values))
    }
}

impl From<CategoryMap> for Vec<String> {
    fn from(map: CategoryMap) -> Self {
        map.values
    }
}
