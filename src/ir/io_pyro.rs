//! Extractors for Pyro and NumPyro `MCMC` results.
//!
//! Posterior samples come from the `MCMC` object, either grouped by chain
//! as `(chain, draw, ...)` or flattened to `(chain * draw, ...)` when
//! `num_chains` is given. Prior and predictive samples arrive as plain
//! mappings of arrays whose leading axis is the (flattened) draw axis.

use ndarray::{ArrayD, Axis, IxDyn};

use super::args::ArgumentBag;
use super::assemble::{ArrayMap, GroupAssembler};
use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::value::SamplerObject;
use crate::error::InferConvError;

const ACCEPTED: &[&str] = &[
    "posterior",
    "prior",
    "posterior_predictive",
    "predictions",
    "constant_data",
    "observed_data",
    "num_chains",
    "index_origin",
];

/// Arguments for [`from_pyro`] and [`from_numpyro`].
#[derive(Clone, Debug, Default)]
pub struct PyroArgs {
    pub posterior: Option<SamplerObject>,
    pub prior: Option<ArrayMap>,
    pub posterior_predictive: Option<ArrayMap>,
    pub predictions: Option<ArrayMap>,
    pub constant_data: Option<ArrayMap>,
    pub observed_data: Option<ArrayMap>,
    pub num_chains: Option<usize>,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub index_origin: Option<i64>,
}

impl PyroArgs {
    pub fn from_bag(bag: ArgumentBag, extractor: &'static str) -> Result<Self, InferConvError> {
        let mut kw = bag.into_keywords(extractor, ACCEPTED)?;
        let (coords, dims) = kw.take_coords_dims();
        Ok(Self {
            posterior: kw.take_object("posterior")?,
            prior: kw.take_array_map("prior")?,
            posterior_predictive: kw.take_array_map("posterior_predictive")?,
            predictions: kw.take_array_map("predictions")?,
            constant_data: kw.take_array_map("constant_data")?,
            observed_data: kw.take_array_map("observed_data")?,
            num_chains: kw.take_usize("num_chains")?,
            coords,
            dims,
            index_origin: kw.take_int("index_origin")?,
        })
    }
}

/// Converts a Pyro `MCMC` run. Sampler statistics keep their names.
pub fn from_pyro(args: PyroArgs) -> Result<InferenceData, InferConvError> {
    convert_mcmc(args, Engine::Pyro)
}

/// Converts a NumPyro `MCMC` run, renaming its sampler statistics.
pub fn from_numpyro(args: PyroArgs) -> Result<InferenceData, InferConvError> {
    convert_mcmc(args, Engine::NumPyro)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Engine {
    Pyro,
    NumPyro,
}

impl Engine {
    fn extractor(self) -> &'static str {
        match self {
            Engine::Pyro => "from_pyro",
            Engine::NumPyro => "from_numpyro",
        }
    }

    fn library(self) -> &'static str {
        match self {
            Engine::Pyro => "pyro",
            Engine::NumPyro => "numpyro",
        }
    }
}

fn convert_mcmc(args: PyroArgs, engine: Engine) -> Result<InferenceData, InferConvError> {
    let extractor = engine.extractor();
    let mut posterior = ArrayMap::new();
    let mut stats = ArrayMap::new();
    let mut log_likelihood = ArrayMap::new();

    if let Some(mcmc) = args.posterior {
        let draws = mcmc.draws;
        posterior = group_chains(draws.samples, args.num_chains, extractor)?;
        stats = group_chains(draws.stats, args.num_chains, extractor)?;
        log_likelihood = group_chains(draws.log_likelihood, args.num_chains, extractor)?;
        if engine == Engine::NumPyro {
            stats = rename_numpyro_stats(stats);
        }
    }

    let chains = args
        .num_chains
        .or_else(|| posterior.values().next().map(|v| v.shape()[0]))
        .unwrap_or(1);

    let prior = args
        .prior
        .map(|arrays| add_chain_axis(arrays, extractor))
        .transpose()?
        .unwrap_or_default();
    let posterior_predictive = args
        .posterior_predictive
        .map(|arrays| split_draws(arrays, chains, extractor))
        .transpose()?
        .unwrap_or_default();
    let predictions = args
        .predictions
        .map(|arrays| split_draws(arrays, chains, extractor))
        .transpose()?
        .unwrap_or_default();

    Ok(GroupAssembler::new(
        args.coords.as_ref(),
        args.dims.as_ref(),
        args.index_origin,
        engine.library(),
    )
    .sampled(GroupName::Posterior, posterior)?
    .sampled(GroupName::SampleStats, stats)?
    .sampled(GroupName::LogLikelihood, log_likelihood)?
    .sampled(GroupName::PosteriorPredictive, posterior_predictive)?
    .sampled(GroupName::Predictions, predictions)?
    .sampled(GroupName::Prior, prior)?
    .plain(GroupName::ObservedData, args.observed_data)?
    .plain(GroupName::ConstantData, args.constant_data)?
    .finish())
}

/// Reshapes flat `(chain * draw, ...)` arrays when `num_chains` is given;
/// otherwise checks that arrays already lead with `(chain, draw)`.
fn group_chains(
    arrays: ArrayMap,
    num_chains: Option<usize>,
    extractor: &'static str,
) -> Result<ArrayMap, InferConvError> {
    arrays
        .into_iter()
        .map(|(name, values)| {
            let values = match num_chains {
                Some(chains) => reshape_leading(&name, values, chains, extractor)?,
                None if values.ndim() >= 2 => values,
                None => {
                    return Err(InferConvError::InvalidSamplerOutput {
                        extractor,
                        message: format!(
                            "'{}' is flat; pass num_chains to split it into chains",
                            name
                        ),
                    })
                }
            };
            Ok((name, values))
        })
        .collect()
}

/// Splits the leading axis into `(chains, draws)` when it divides evenly,
/// otherwise treats every sample as one chain.
fn split_draws(
    arrays: ArrayMap,
    chains: usize,
    extractor: &'static str,
) -> Result<ArrayMap, InferConvError> {
    arrays
        .into_iter()
        .map(|(name, values)| {
            let leading = values.shape().first().copied().unwrap_or(1);
            let values = if chains > 1 && leading % chains == 0 {
                reshape_leading(&name, values, chains, extractor)?
            } else {
                values.insert_axis(Axis(0))
            };
            Ok((name, values))
        })
        .collect()
}

fn add_chain_axis(arrays: ArrayMap, extractor: &'static str) -> Result<ArrayMap, InferConvError> {
    split_draws(arrays, 1, extractor)
}

fn reshape_leading(
    name: &str,
    values: ArrayD<f64>,
    chains: usize,
    extractor: &'static str,
) -> Result<ArrayD<f64>, InferConvError> {
    let leading = values.shape().first().copied().unwrap_or(0);
    if leading % chains != 0 {
        return Err(InferConvError::InvalidSamplerOutput {
            extractor,
            message: format!(
                "'{}' has {} samples, not divisible into {} chains",
                name, leading, chains
            ),
        });
    }

    let mut shape = vec![chains, leading / chains];
    shape.extend_from_slice(&values.shape()[1..]);
    let data: Vec<f64> = values.iter().copied().collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| InferConvError::InvalidSamplerOutput {
        extractor,
        message: format!("cannot reshape '{}': {}", name, e),
    })
}

/// NumPyro's extra fields under their container names.
///
/// The potential energy is the negated log density.
fn rename_numpyro_stats(stats: ArrayMap) -> ArrayMap {
    stats
        .into_iter()
        .map(|(name, values)| match name.as_str() {
            "potential_energy" => ("lp".to_string(), values.mapv(|v| -v)),
            "accept_prob" => ("acceptance_rate".to_string(), values),
            "num_steps" => ("n_steps".to_string(), values),
            "adapt_state.step_size" => ("step_size".to_string(), values),
            _ => (name, values),
        })
        .collect()
}
