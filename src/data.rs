//! Data
//!
//! Population records as they arrive from the caller. Each record maps field names to
//! loosely typed values; the test only ever reads the binary condition field.
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::errors::HomogeneityError;

/// A single field value of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Interpret the value as a binary indicator.
    ///
    /// `1`, `1.0` and `true` map to `Some(true)`, `0`, `0.0` and `false` to `Some(false)`.
    /// Anything else, including `Null`, is not binary.
    pub fn as_binary(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Int(0) => Some(false),
            FieldValue::Int(1) => Some(true),
            FieldValue::Float(v) if *v == 0.0 => Some(false),
            FieldValue::Float(v) if *v == 1.0 => Some(true),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "\"{}\"", s),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One row of a population.
pub type Record = HashMap<String, FieldValue>;

/// An ordered collection of records drawn from one population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Population {
    pub records: Vec<Record>,
}

impl Population {
    pub fn new(records: Vec<Record>) -> Self {
        Population { records }
    }

    /// Build a population holding a single binary field.
    ///
    /// * `field` - Name of the field on every record.
    /// * `values` - One indicator per record.
    pub fn from_binary_column(field: &str, values: &[bool]) -> Self {
        let records = values
            .iter()
            .map(|v| {
                let mut record = Record::with_capacity(1);
                record.insert(field.to_string(), FieldValue::Bool(*v));
                record
            })
            .collect();
        Population { records }
    }

    /// Build a population with `condition` records set to `1` and `inverse` records set to `0`.
    pub fn from_counts(field: &str, condition: usize, inverse: usize) -> Self {
        let mut values = vec![true; condition];
        values.extend(std::iter::repeat(false).take(inverse));
        Population::from_binary_column(field, &values)
    }

    /// Load a population from a json array of objects.
    pub fn from_json(json_str: &str) -> Result<Self, HomogeneityError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| HomogeneityError::UnableToRead(e.to_string()))
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Population {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Population {
            records: iter.into_iter().collect(),
        }
    }
}
