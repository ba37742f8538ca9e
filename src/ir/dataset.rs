//! Labeled datasets: named variables whose axes are bound to coordinates.

use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coords::{Coords, Dims, Label};
use crate::error::InferConvError;

/// Variable name given to an unnamed array when it is promoted to a dataset.
pub const DEFAULT_VARIABLE_NAME: &str = "x";

/// Leading dimensions of every sampled variable.
pub const SAMPLE_DIMS: [&str; 2] = ["chain", "draw"];

/// A single variable: an n-dimensional array plus one dimension name per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub dims: Vec<String>,
    pub values: ArrayD<f64>,
}

impl Variable {
    pub fn new(dims: Vec<String>, values: ArrayD<f64>) -> Self {
        Self { dims, values }
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Averages the variable over the named dimensions, dropping them.
    ///
    /// Dimensions the variable does not have are ignored. Averaging over an
    /// empty axis yields NaN values.
    pub fn mean_over(&self, dims: &[&str]) -> Variable {
        let mut values = self.values.clone();
        let mut names = self.dims.clone();
        for dim in dims {
            if let Some(axis) = names.iter().position(|d| d == dim) {
                values = match values.mean_axis(Axis(axis)) {
                    Some(mean) => mean,
                    None => {
                        let mut shape = values.shape().to_vec();
                        shape.remove(axis);
                        ArrayD::from_elem(shape, f64::NAN)
                    }
                };
                names.remove(axis);
            }
        }
        Variable::new(names, values)
    }
}

/// A mapping from variable name to labeled array.
///
/// Every axis of every variable is bound to a coordinate of the same name,
/// and variables sharing a dimension share its labels. [`Dataset::insert`]
/// and [`Dataset::set_coord`] reject anything that would break that.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    variables: BTreeMap<String, Variable>,

    #[serde(default)]
    coords: Coords,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from raw arrays laid out as `(chain, draw, ...)`.
    ///
    /// Arrays are promoted to at least two dimensions (a 1-D array becomes a
    /// single chain). See [`Dataset::from_arrays_with`] for the naming rules.
    pub fn from_arrays(
        arrays: BTreeMap<String, ArrayD<f64>>,
        coords: Option<&Coords>,
        dims: Option<&Dims>,
        index_origin: i64,
    ) -> Result<Self, InferConvError> {
        Self::from_arrays_with(arrays, coords, dims, &SAMPLE_DIMS, index_origin)
    }

    /// Builds a dataset from raw arrays whose leading axes are `sample_dims`.
    ///
    /// - Trailing axes take the names in `dims[var]` (entries that repeat a
    ///   sample dimension are skipped), then `{var}_dim_{i}`.
    /// - Labels come from `coords` when given; otherwise sample dimensions
    ///   count from 0 and the rest from `index_origin`.
    pub fn from_arrays_with(
        arrays: BTreeMap<String, ArrayD<f64>>,
        coords: Option<&Coords>,
        dims: Option<&Dims>,
        sample_dims: &[&str],
        index_origin: i64,
    ) -> Result<Self, InferConvError> {
        let mut dataset = Dataset::new();

        for (name, values) in arrays {
            let values = promote(values, sample_dims.len().max(1));
            let event_ndim = values.ndim() - sample_dims.len();

            let user_dims: Vec<&String> = dims
                .and_then(|d| d.get(&name))
                .map(|d| {
                    d.iter()
                        .filter(|dim| !sample_dims.contains(&dim.as_str()))
                        .collect()
                })
                .unwrap_or_default();
            if user_dims.len() > event_ndim {
                return Err(InferConvError::DimsMismatch {
                    variable: name,
                    ndim: values.ndim(),
                    dims: user_dims.len() + sample_dims.len(),
                });
            }

            let mut var_dims: Vec<String> = sample_dims.iter().map(|d| d.to_string()).collect();
            for i in 0..event_ndim {
                match user_dims.get(i) {
                    Some(dim) => var_dims.push((*dim).clone()),
                    None => var_dims.push(format!("{}_dim_{}", name, i)),
                }
            }

            for (axis, dim) in var_dims.iter().enumerate() {
                if dataset.coords.contains_key(dim) {
                    continue;
                }
                let len = values.shape()[axis];
                let labels = match coords.and_then(|c| c.get(dim)) {
                    Some(labels) => labels.clone(),
                    None if axis < sample_dims.len() => Label::range(0, len),
                    None => Label::range(index_origin, len),
                };
                dataset.set_coord(dim.clone(), labels)?;
            }

            dataset.insert(name, Variable::new(var_dims, values))?;
        }

        Ok(dataset)
    }

    /// Adds a variable, creating default integer coordinates for any of its
    /// dimensions that have none yet.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        variable: Variable,
    ) -> Result<(), InferConvError> {
        let name = name.into();
        if variable.dims.len() != variable.values.ndim() {
            return Err(InferConvError::DimsMismatch {
                variable: name,
                ndim: variable.values.ndim(),
                dims: variable.dims.len(),
            });
        }

        for (dim, &len) in variable.dims.iter().zip(variable.values.shape()) {
            match self.coords.get(dim) {
                Some(labels) if labels.len() != len => {
                    return Err(InferConvError::CoordLength {
                        dim: dim.clone(),
                        expected: len,
                        found: labels.len(),
                    });
                }
                Some(_) => {}
                None => {
                    self.coords.insert(dim.clone(), Label::range(0, len));
                }
            }
        }

        self.variables.insert(name, variable);
        Ok(())
    }

    /// Sets the labels of a coordinate axis.
    pub fn set_coord(
        &mut self,
        dim: impl Into<String>,
        labels: Vec<Label>,
    ) -> Result<(), InferConvError> {
        let dim = dim.into();
        if let Some(len) = self.axis_len(&dim) {
            if len != labels.len() {
                return Err(InferConvError::CoordLength {
                    dim,
                    expected: len,
                    found: labels.len(),
                });
            }
        }
        self.coords.insert(dim, labels);
        Ok(())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Length of `dim` as used by the variables, if any variable uses it.
    pub fn axis_len(&self, dim: &str) -> Option<usize> {
        self.variables.values().find_map(|var| {
            var.dims
                .iter()
                .position(|d| d == dim)
                .map(|axis| var.values.shape()[axis])
        })
    }

    /// Checks the coordinate invariant over the whole dataset.
    ///
    /// Needed for datasets that bypassed [`Dataset::insert`], e.g. ones read
    /// back from disk.
    pub fn check_consistency(&self) -> Result<(), InferConvError> {
        for (name, var) in &self.variables {
            if var.dims.len() != var.values.ndim() {
                return Err(InferConvError::DimsMismatch {
                    variable: name.clone(),
                    ndim: var.values.ndim(),
                    dims: var.dims.len(),
                });
            }
            for (dim, &len) in var.dims.iter().zip(var.values.shape()) {
                let found = self.coords.get(dim).map_or(0, Vec::len);
                if found != len {
                    return Err(InferConvError::CoordLength {
                        dim: dim.clone(),
                        expected: len,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn coord(&self, dim: &str) -> Option<&[Label]> {
        self.coords.get(dim).map(Vec::as_slice)
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The dataset's variables as a plain name → array mapping.
    pub fn to_arrays(&self) -> BTreeMap<String, ArrayD<f64>> {
        self.variables
            .iter()
            .map(|(k, v)| (k.clone(), v.values.clone()))
            .collect()
    }
}

/// A single labeled array, optionally named.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub dims: Vec<String>,
    #[serde(default)]
    pub coords: Coords,
    pub values: ArrayD<f64>,
}

impl DataArray {
    /// Wraps an array with dimensions `dim_0, dim_1, ...` and no name.
    pub fn new(values: ArrayD<f64>) -> Self {
        let dims = (0..values.ndim()).map(|i| format!("dim_{}", i)).collect();
        Self {
            name: None,
            dims,
            coords: Coords::new(),
            values,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dims(mut self, dims: Vec<String>) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_coord(mut self, dim: impl Into<String>, labels: Vec<Label>) -> Self {
        self.coords.insert(dim.into(), labels);
        self
    }

    /// Promotes the array to a one-variable dataset keyed by its name
    /// (or [`DEFAULT_VARIABLE_NAME`] when unnamed).
    pub fn into_dataset(self) -> Result<Dataset, InferConvError> {
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_VARIABLE_NAME.to_string());
        let mut dataset = Dataset::new();
        for (dim, labels) in self.coords {
            if self.dims.contains(&dim) {
                let axis = self.dims.iter().position(|d| *d == dim).unwrap_or(0);
                let expected = self.values.shape().get(axis).copied().unwrap_or(0);
                if labels.len() != expected {
                    return Err(InferConvError::CoordLength {
                        dim,
                        expected,
                        found: labels.len(),
                    });
                }
            }
            dataset.coords.insert(dim, labels);
        }
        dataset.insert(name, Variable::new(self.dims, self.values))?;
        Ok(dataset)
    }
}

/// Prepends unit axes until the array has at least `min_ndim` dimensions.
fn promote(mut values: ArrayD<f64>, min_ndim: usize) -> ArrayD<f64> {
    while values.ndim() < min_ndim {
        values = values.insert_axis(Axis(0));
    }
    values
}
