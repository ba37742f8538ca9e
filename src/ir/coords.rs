//! Coordinate labels and the caller-supplied coordinate/dimension maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single label on a coordinate axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Label {
    /// Integer labels `origin, origin + 1, ...` for an axis of length `len`.
    pub fn range(origin: i64, len: usize) -> Vec<Label> {
        (0..len as i64).map(|i| Label::Int(origin + i)).collect()
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<f64> for Label {
    fn from(value: f64) -> Self {
        Label::Float(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Float(v) => write!(f, "{}", v),
            Label::Str(v) => f.write_str(v),
        }
    }
}

/// Dimension name to the labels of that axis.
pub type Coords = BTreeMap<String, Vec<Label>>;

/// Variable name to the dimension names of its non-sample axes.
pub type Dims = BTreeMap<String, Vec<String>>;
