//! Search inputs and their validation
//!
//! Inputs are validated before any statement is dispatched, so a bad
//! submission never reaches the database.

use crate::catalog::{FieldShape, FilterField};
use crate::errors::{Error, Result};
use rusqlite::types::Value;
use std::collections::{BTreeMap, HashSet};

/// Raw value for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

/// Field → value map for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    values: BTreeMap<FilterField, FilterValue>,
}

impl FilterInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: FilterField, value: impl Into<String>) -> Self {
        Self::new().with_single(field, value)
    }

    pub fn list<I, S>(field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with_list(field, values)
    }

    pub fn with_single(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.values.insert(field, FilterValue::Single(value.into()));
        self
    }

    pub fn with_list<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.values.insert(field, FilterValue::List(values));
        self
    }

    /// Build the input for `field` from command-line words.
    ///
    /// List fields take every word as an element (a word may itself hold
    /// several newline- or comma-separated values); single fields join the
    /// words with a space.
    pub fn from_args(field: FilterField, words: &[String]) -> Self {
        match field.shape() {
            FieldShape::List => Self::list(
                field,
                words
                    .iter()
                    .flat_map(|w| w.split(['\n', ',']))
                    .map(str::to_string),
            ),
            FieldShape::Single => Self::single(field, words.join(" ")),
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.values.get(&field)
    }
}

/// A validated lookup value, ready to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Single(String),
    List(Vec<String>),
}

impl Lookup {
    /// Parameter for `?1`; lists are bound as one JSON array
    pub fn to_param(&self) -> Value {
        match self {
            Lookup::Single(value) => Value::Text(value.clone()),
            Lookup::List(values) => Value::Text(serde_json::Value::from(values.clone()).to_string()),
        }
    }

    /// Individual values (one for single lookups)
    pub fn values(&self) -> Vec<&str> {
        match self {
            Lookup::Single(value) => vec![value.as_str()],
            Lookup::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Validate the value supplied for `field`.
pub fn validate_field(field: FilterField, input: &FilterInput) -> Result<Lookup> {
    let value = input
        .get(field)
        .ok_or_else(|| Error::validation(field.name(), "is required"))?;

    match (field.shape(), value) {
        (FieldShape::Single, FilterValue::Single(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(Error::validation(field.name(), "must not be blank"));
            }
            Ok(Lookup::Single(trimmed.to_string()))
        }
        (FieldShape::List, FilterValue::List(raw)) => {
            let values = normalize_list(raw);
            if values.is_empty() {
                return Err(Error::validation(
                    field.name(),
                    "needs at least one non-blank value",
                ));
            }
            Ok(Lookup::List(values))
        }
        (FieldShape::Single, FilterValue::List(_)) => {
            Err(Error::validation(field.name(), "expects a single value, got a list"))
        }
        (FieldShape::List, FilterValue::Single(_)) => {
            Err(Error::validation(field.name(), "expects a list, got a single value"))
        }
    }
}

/// Trim, drop blanks, and keep the first occurrence of each value.
pub fn normalize_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}
