//! Extractor for ensemble sampler results (`emcee.EnsembleSampler`).
//!
//! An ensemble sampler records one packed chain per run: an array shaped
//! `(draw, walker, ndim)` holding every parameter side by side. Walkers
//! become chains and the last axis is split into one variable per
//! parameter.

use ndarray::{ArrayD, Axis};

use super::args::ArgumentBag;
use super::assemble::{ArrayMap, GroupAssembler};
use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::value::SamplerObject;
use crate::error::InferConvError;

const EXTRACTOR: &str = "from_emcee";

const ACCEPTED: &[&str] = &["sampler", "var_names", "index_origin"];

/// Sampler draw holding the packed `(draw, walker, ndim)` chain.
pub const CHAIN_KEY: &str = "chain";

/// Optional sampler statistic with the per-walker log probability.
pub const LOG_PROB_KEY: &str = "log_prob";

/// Arguments for [`from_emcee`].
#[derive(Clone, Debug)]
pub struct EmceeArgs {
    pub sampler: SamplerObject,
    pub var_names: Option<Vec<String>>,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub index_origin: Option<i64>,
}

impl EmceeArgs {
    pub fn from_bag(bag: ArgumentBag) -> Result<Self, InferConvError> {
        let mut kw = bag.into_keywords(EXTRACTOR, ACCEPTED)?;
        let (coords, dims) = kw.take_coords_dims();
        let sampler = kw
            .take_object("sampler")?
            .ok_or(InferConvError::MissingKeyword {
                extractor: EXTRACTOR,
                keyword: "sampler",
            })?;
        Ok(Self {
            sampler,
            var_names: kw.take_str_list("var_names")?,
            coords,
            dims,
            index_origin: kw.take_int("index_origin")?,
        })
    }
}

/// Converts an ensemble sampler into `posterior` and, when the log
/// probability was recorded, `sample_stats`.
pub fn from_emcee(args: EmceeArgs) -> Result<InferenceData, InferConvError> {
    let mut draws = args.sampler.draws;
    let chain = draws
        .samples
        .remove(CHAIN_KEY)
        .ok_or_else(|| invalid(format!("sampler has no '{}' draws", CHAIN_KEY)))?;
    if chain.ndim() != 3 {
        return Err(invalid(format!(
            "expected '{}' shaped (draw, walker, ndim), got {} dimension(s)",
            CHAIN_KEY,
            chain.ndim()
        )));
    }

    // (draw, walker, ndim) -> (walker, draw, ndim)
    let chain = chain.permuted_axes(vec![1, 0, 2]);
    let ndim = chain.shape()[2];
    let names = match args.var_names {
        Some(names) if names.len() != ndim => {
            return Err(invalid(format!(
                "{} var_names given for {} parameters",
                names.len(),
                ndim
            )))
        }
        Some(names) => names,
        None => (0..ndim).map(|i| format!("var_{}", i)).collect(),
    };

    let posterior: ArrayMap = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, chain.index_axis(Axis(2), i).to_owned()))
        .collect();

    let mut stats = ArrayMap::new();
    if let Some(log_prob) = draws.stats.remove(LOG_PROB_KEY) {
        stats.insert("lp".to_string(), walkers_first(log_prob)?);
    }

    Ok(GroupAssembler::new(
        args.coords.as_ref(),
        args.dims.as_ref(),
        args.index_origin,
        "emcee",
    )
    .sampled(GroupName::Posterior, posterior)?
    .sampled(GroupName::SampleStats, stats)?
    .finish())
}

fn walkers_first(values: ArrayD<f64>) -> Result<ArrayD<f64>, InferConvError> {
    if values.ndim() != 2 {
        return Err(invalid(format!(
            "expected '{}' shaped (draw, walker), got {} dimension(s)",
            LOG_PROB_KEY,
            values.ndim()
        )));
    }
    Ok(values.reversed_axes())
}

fn invalid(message: String) -> InferConvError {
    InferConvError::InvalidSamplerOutput {
        extractor: EXTRACTOR,
        message,
    }
}
