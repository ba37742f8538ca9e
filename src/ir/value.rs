//! Dynamic input values accepted by the conversion dispatcher.
//!
//! A [`Value`] stands in for "anything a caller might hand over": plain
//! scalars and strings, raw arrays, labeled data, an existing container, or
//! a sampler result object described by its class name and originating
//! module. The dispatcher classifies values by inspecting these variants and
//! the type information carried by [`SamplerObject`]; it never needs the
//! producing library itself.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::container::InferenceData;
use crate::error::InferConvError;
use super::dataset::{DataArray, Dataset};

/// Free-form keyword options passed through to extractors.
pub type Keywords = BTreeMap<String, Value>;

/// An arbitrary convertible value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Array(ArrayD<f64>),
    DataArray(DataArray),
    Dataset(Dataset),
    Mapping(BTreeMap<String, Value>),
    /// A structured record with named fields (a tree-like nested value).
    Record(Record),
    Container(InferenceData),
    Object(SamplerObject),
}

impl Value {
    /// The runtime type name reported in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::DataArray(_) => "data array",
            Value::Dataset(_) => "dataset",
            Value::Mapping(_) => "mapping",
            Value::Record(record) => &record.type_name,
            Value::Container(_) => "InferenceData",
            Value::Object(object) => &object.class_name,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// A string or a list of strings, as a list.
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        match self {
            Value::Str(s) => Some(vec![s.as_str()]),
            Value::List(items) => items.iter().map(Value::as_str).collect(),
            _ => None,
        }
    }

    /// A mapping whose values are all arrays.
    pub fn as_array_map(&self) -> Option<BTreeMap<String, ArrayD<f64>>> {
        match self {
            Value::Mapping(entries) => entries
                .iter()
                .map(|(k, v)| match v {
                    Value::Array(a) => Some((k.clone(), a.clone())),
                    Value::DataArray(a) => Some((k.clone(), a.values.clone())),
                    _ => None,
                })
                .collect(),
            Value::Dataset(ds) => Some(ds.to_arrays()),
            _ => None,
        }
    }
}

impl Value {
    /// Converts numeric content into an array.
    ///
    /// Scalars become 0-d arrays and nested lists must be rectangular.
    /// Anything else yields `None`.
    pub fn into_array(self) -> Option<ArrayD<f64>> {
        match self {
            Value::Array(a) => Some(a),
            Value::DataArray(a) => Some(a.values),
            Value::Int(n) => Some(ArrayD::from_elem(IxDyn(&[]), n as f64)),
            Value::Float(x) => Some(ArrayD::from_elem(IxDyn(&[]), x)),
            Value::Bool(b) => Some(ArrayD::from_elem(IxDyn(&[]), if b { 1.0 } else { 0.0 })),
            Value::List(items) => {
                let rows = items
                    .into_iter()
                    .map(Value::into_array)
                    .collect::<Option<Vec<_>>>()?;
                let inner = rows.first().map(|r| r.shape().to_vec()).unwrap_or_default();
                if rows.iter().any(|r| r.shape() != inner.as_slice()) {
                    return None;
                }
                let mut shape = vec![rows.len()];
                shape.extend_from_slice(&inner);
                let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
                ArrayD::from_shape_vec(IxDyn(&shape), data).ok()
            }
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<ArrayD<f64>> for Value {
    fn from(value: ArrayD<f64>) -> Self {
        Value::Array(value)
    }
}

impl From<Dataset> for Value {
    fn from(value: Dataset) -> Self {
        Value::Dataset(value)
    }
}

impl From<DataArray> for Value {
    fn from(value: DataArray) -> Self {
        Value::DataArray(value)
    }
}

impl From<InferenceData> for Value {
    fn from(value: InferenceData) -> Self {
        Value::Container(value)
    }
}

impl From<SamplerObject> for Value {
    fn from(value: SamplerObject) -> Self {
        Value::Object(value)
    }
}

/// A structured record: a named type with named fields, possibly nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: String,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// Leaf arrays of the record, keyed by their `.`-joined field path.
    ///
    /// Nested mappings and records are descended into; every other leaf
    /// must convert to an array.
    pub fn flatten_arrays(&self) -> Result<BTreeMap<String, ArrayD<f64>>, InferConvError> {
        let mut out = BTreeMap::new();
        flatten_into(&self.fields, "", &mut out)?;
        Ok(out)
    }
}

fn flatten_into(
    fields: &BTreeMap<String, Value>,
    prefix: &str,
    out: &mut BTreeMap<String, ArrayD<f64>>,
) -> Result<(), InferConvError> {
    for (name, value) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            Value::Mapping(inner) => flatten_into(inner, &path, out)?,
            Value::Record(inner) => flatten_into(&inner.fields, &path, out)?,
            leaf => {
                let received = leaf.type_name().to_string();
                match leaf.clone().into_array() {
                    Some(array) => {
                        out.insert(path, array);
                    }
                    None => return Err(InferConvError::InvalidVariable { name: path, received }),
                }
            }
        }
    }
    Ok(())
}

/// A result object produced by a sampling library.
///
/// Identified the way a duck-typed caller would: by its class name and the
/// module path it originates from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerObject {
    pub class_name: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub draws: SamplerDraws,
}

impl SamplerObject {
    pub fn new(
        class_name: impl Into<String>,
        module: impl Into<String>,
        draws: SamplerDraws,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            module: module.into(),
            draws,
        }
    }
}

/// Arrays recorded by a sampler run.
///
/// Layout conventions differ per library and are interpreted by the
/// matching extractor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerDraws {
    /// Parameter draws.
    #[serde(default)]
    pub samples: BTreeMap<String, ArrayD<f64>>,
    /// Sampler diagnostics (energy, divergences, ...).
    #[serde(default)]
    pub stats: BTreeMap<String, ArrayD<f64>>,
    /// Pointwise log-likelihood values.
    #[serde(default)]
    pub log_likelihood: BTreeMap<String, ArrayD<f64>>,
}

impl SamplerDraws {
    pub fn with_sample(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.samples.insert(name.into(), values);
        self
    }

    pub fn with_stat(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.stats.insert(name.into(), values);
        self
    }

    pub fn with_log_likelihood(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.log_likelihood.insert(name.into(), values);
        self
    }
}
