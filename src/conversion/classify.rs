//! Input shape classification.
//!
//! Shapes are tried in a fixed order and the first matching predicate wins.
//! Several predicates overlap (a dataset also exposes the mapping protocol),
//! so the order in [`RULES`] is part of the contract.

use std::fmt;

use crate::config::Settings;
use crate::error::InferConvError;
use crate::ir::Value;

/// The source shapes the dispatcher recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// An already-canonical container.
    Container,
    /// A path: CmdStan CSV output or a serialized container.
    Path,
    /// A PyStan or CmdStanPy fit.
    StanFit,
    /// An emcee ensemble sampler.
    EnsembleSampler,
    /// Bean Machine samples.
    MonteCarloSamples,
    /// A Pyro or NumPyro MCMC run.
    Mcmc,
    Dataset,
    DataArray,
    /// A mapping of variable names to arrays.
    Mapping,
    /// A tree-like nested record.
    Nested,
    Array,
    /// A list of CmdStan CSV files, one per chain.
    CsvFileList,
}

impl Shape {
    /// Every shape, in classification order.
    pub const ALL: [Shape; 12] = [
        Shape::Container,
        Shape::Path,
        Shape::StanFit,
        Shape::EnsembleSampler,
        Shape::MonteCarloSamples,
        Shape::Mcmc,
        Shape::Dataset,
        Shape::DataArray,
        Shape::Mapping,
        Shape::Nested,
        Shape::Array,
        Shape::CsvFileList,
    ];

    /// The name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Container => "InferenceData",
            Shape::Path => "str",
            Shape::StanFit => "pystan fit",
            Shape::EnsembleSampler => "emcee sampler",
            Shape::MonteCarloSamples => "beanmachine samples",
            Shape::Mcmc => "pyro or numpyro mcmc",
            Shape::Dataset => "xarray dataset",
            Shape::DataArray => "xarray dataarray",
            Shape::Mapping => "dict",
            Shape::Nested => "pytree",
            Shape::Array => "numpy array",
            Shape::CsvFileList => "list of cmdstan csv files",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Predicate = fn(&Value, &Settings) -> bool;

/// Classification rules in priority order.
pub const RULES: [(Shape, Predicate); 12] = [
    (Shape::Container, |v, _| is_container(v)),
    (Shape::Path, |v, _| is_path(v)),
    (Shape::StanFit, |v, _| is_stan_fit(v)),
    (Shape::EnsembleSampler, |v, _| is_ensemble_sampler(v)),
    (Shape::MonteCarloSamples, |v, _| is_monte_carlo_samples(v)),
    (Shape::Mcmc, |v, _| is_mcmc(v)),
    (Shape::Dataset, |v, _| is_dataset(v)),
    (Shape::DataArray, |v, _| is_data_array(v)),
    (Shape::Mapping, |v, _| is_mapping(v)),
    (Shape::Nested, is_nested),
    (Shape::Array, |v, _| is_array(v)),
    (Shape::CsvFileList, |v, _| is_csv_file_list(v)),
];

/// Determines the shape of `value`.
///
/// # Errors
/// Returns [`InferConvError::UnsupportedInput`] listing every supported shape
/// when no rule matches.
pub fn classify(value: &Value, settings: &Settings) -> Result<Shape, InferConvError> {
    RULES
        .iter()
        .find(|(_, matches)| matches(value, settings))
        .map(|(shape, _)| *shape)
        .ok_or_else(|| InferConvError::UnsupportedInput {
            supported: supported_list(),
            received: value.type_name().to_string(),
        })
}

pub(crate) fn supported_list() -> String {
    let mut names: Vec<&str> = Shape::ALL.iter().map(Shape::name).collect();
    names.sort_unstable();
    names.join(", ")
}

pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Container(_))
}

pub fn is_path(value: &Value) -> bool {
    matches!(value, Value::Str(_))
}

pub fn is_stan_fit(value: &Value) -> bool {
    match value {
        Value::Object(obj) => {
            obj.class_name == "StanFit4Model"
                || obj.class_name == "CmdStanMCMC"
                || obj.module == "stan.fit"
        }
        _ => false,
    }
}

pub fn is_ensemble_sampler(value: &Value) -> bool {
    matches!(value, Value::Object(obj) if obj.class_name == "EnsembleSampler")
}

pub fn is_monte_carlo_samples(value: &Value) -> bool {
    matches!(value, Value::Object(obj) if obj.class_name == "MonteCarloSamples")
}

/// A Pyro or NumPyro `MCMC` run. Runs from any other module do not match.
pub fn is_mcmc(value: &Value) -> bool {
    matches!(value, Value::Object(obj)
        if obj.class_name == "MCMC" && mcmc_library(&obj.module).is_some())
}

/// The MCMC library a module path belongs to.
///
/// `numpyro` is checked on its own: it is not a `pyro` submodule.
pub fn mcmc_library(module: &str) -> Option<McmcLibrary> {
    if module.starts_with("numpyro") {
        Some(McmcLibrary::NumPyro)
    } else if module.starts_with("pyro") {
        Some(McmcLibrary::Pyro)
    } else {
        None
    }
}

/// Libraries producing an `MCMC` result object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum McmcLibrary {
    Pyro,
    NumPyro,
}

pub fn is_dataset(value: &Value) -> bool {
    matches!(value, Value::Dataset(_))
}

pub fn is_data_array(value: &Value) -> bool {
    matches!(value, Value::DataArray(_))
}

/// Anything exposing a name-to-array mapping, datasets included.
pub fn is_mapping(value: &Value) -> bool {
    matches!(value, Value::Mapping(_) | Value::Dataset(_))
}

/// A tree-like structure of named fields. Only recognized when nested
/// structures are enabled; lists never count.
pub fn is_nested(value: &Value, settings: &Settings) -> bool {
    settings.data.nested_structures && matches!(value, Value::Record(_) | Value::Mapping(_))
}

pub fn is_array(value: &Value) -> bool {
    matches!(value, Value::Array(_))
}

/// A non-empty list whose first entry is a CSV path.
pub fn is_csv_file_list(value: &Value) -> bool {
    match value {
        Value::List(items) => {
            matches!(items.first(), Some(Value::Str(path)) if path.ends_with(".csv"))
        }
        _ => false,
    }
}
