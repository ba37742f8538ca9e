//! Extractors for Stan fit objects (PyStan and CmdStanPy).
//!
//! A Stan fit carries parameter draws laid out as `(chain, draw, ...)` and
//! sampler diagnostics named with a trailing double underscore (`lp__`,
//! `divergent__`, ...). Diagnostics become `sample_stats` under their
//! conventional names; variables named by the predictive/log-likelihood
//! keywords are moved out of the posterior into their own groups.

use super::args::{ArgumentBag, KeywordReader};
use super::assemble::{take_variables, ArrayMap, GroupAssembler};
use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::value::SamplerObject;
use crate::error::InferConvError;

/// Keywords accepted by both Stan fit extractors.
const ACCEPTED: &[&str] = &[
    "posterior",
    "posterior_predictive",
    "predictions",
    "prior",
    "prior_predictive",
    "log_likelihood",
    "observed_data",
    "constant_data",
    "index_origin",
];

/// Stan diagnostic column names and their container names.
const STAT_NAMES: &[(&str, &str)] = &[
    ("lp__", "lp"),
    ("accept_stat__", "acceptance_rate"),
    ("stepsize__", "step_size"),
    ("treedepth__", "tree_depth"),
    ("n_leapfrog__", "n_steps"),
    ("divergent__", "diverging"),
    ("energy__", "energy"),
];

/// Arguments for [`from_pystan`] and [`from_cmdstanpy`].
#[derive(Clone, Debug, Default)]
pub struct StanFitArgs {
    pub posterior: Option<SamplerObject>,
    pub prior: Option<SamplerObject>,
    pub posterior_predictive: Vec<String>,
    pub predictions: Vec<String>,
    pub prior_predictive: Vec<String>,
    pub log_likelihood: Vec<String>,
    pub observed_data: Option<ArrayMap>,
    pub constant_data: Option<ArrayMap>,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub index_origin: Option<i64>,
}

impl StanFitArgs {
    /// Reads the extractor's keywords out of a routed argument bag.
    pub fn from_bag(bag: ArgumentBag, extractor: &'static str) -> Result<Self, InferConvError> {
        let mut kw = bag.into_keywords(extractor, ACCEPTED)?;
        let (coords, dims) = kw.take_coords_dims();
        Ok(Self {
            posterior: kw.take_object("posterior")?,
            prior: kw.take_object("prior")?,
            posterior_predictive: names(&mut kw, "posterior_predictive")?,
            predictions: names(&mut kw, "predictions")?,
            prior_predictive: names(&mut kw, "prior_predictive")?,
            log_likelihood: names(&mut kw, "log_likelihood")?,
            observed_data: kw.take_array_map("observed_data")?,
            constant_data: kw.take_array_map("constant_data")?,
            coords,
            dims,
            index_origin: kw.take_int("index_origin")?,
        })
    }
}

fn names(kw: &mut KeywordReader, key: &str) -> Result<Vec<String>, InferConvError> {
    Ok(kw.take_str_list(key)?.unwrap_or_default())
}

/// Converts a PyStan fit (`StanFit4Model` or a `stan.fit` object).
pub fn from_pystan(args: StanFitArgs) -> Result<InferenceData, InferConvError> {
    convert_fit(args, "from_pystan", "pystan")
}

/// Converts a CmdStanPy fit (`CmdStanMCMC`).
pub fn from_cmdstanpy(args: StanFitArgs) -> Result<InferenceData, InferConvError> {
    convert_fit(args, "from_cmdstanpy", "cmdstanpy")
}

fn convert_fit(
    args: StanFitArgs,
    extractor: &'static str,
    library: &'static str,
) -> Result<InferenceData, InferConvError> {
    let mut assembler = GroupAssembler::new(
        args.coords.as_ref(),
        args.dims.as_ref(),
        args.index_origin,
        library,
    );

    if let Some(fit) = args.posterior {
        let (mut params, stats) = split_fit(fit);
        let predictive = take_variables(
            &mut params,
            &args.posterior_predictive,
            extractor,
            GroupName::PosteriorPredictive,
        )?;
        let predictions =
            take_variables(&mut params, &args.predictions, extractor, GroupName::Predictions)?;
        let log_likelihood = take_variables(
            &mut params,
            &args.log_likelihood,
            extractor,
            GroupName::LogLikelihood,
        )?;

        assembler = assembler
            .sampled(GroupName::Posterior, params)?
            .sampled(GroupName::SampleStats, stats)?
            .sampled(GroupName::PosteriorPredictive, predictive)?
            .sampled(GroupName::Predictions, predictions)?
            .sampled(GroupName::LogLikelihood, log_likelihood)?;
    }

    if let Some(fit) = args.prior {
        let (mut params, stats) = split_fit(fit);
        let predictive = take_variables(
            &mut params,
            &args.prior_predictive,
            extractor,
            GroupName::PriorPredictive,
        )?;

        assembler = assembler
            .sampled(GroupName::Prior, params)?
            .sampled(GroupName::SampleStatsPrior, stats)?
            .sampled(GroupName::PriorPredictive, predictive)?;
    }

    Ok(assembler
        .plain(GroupName::ObservedData, args.observed_data)?
        .plain(GroupName::ConstantData, args.constant_data)?
        .finish())
}

/// Splits a fit into parameters and renamed diagnostics.
///
/// Diagnostics may be reported separately or mixed in with the samples; a
/// trailing `__` marks them either way.
fn split_fit(fit: SamplerObject) -> (ArrayMap, ArrayMap) {
    let draws = fit.draws;
    let (stats_in_samples, params): (ArrayMap, ArrayMap) = draws
        .samples
        .into_iter()
        .partition(|(name, _)| name.ends_with("__"));

    let mut stats = rename_stan_stats(draws.stats);
    stats.extend(rename_stan_stats(stats_in_samples));
    (params, stats)
}

/// Renames Stan diagnostic columns to their container names.
pub(crate) fn rename_stan_stats(stats: ArrayMap) -> ArrayMap {
    stats
        .into_iter()
        .map(|(name, values)| (stan_stat_name(&name), values))
        .collect()
}

/// The container name of a Stan diagnostic column.
pub(crate) fn stan_stat_name(column: &str) -> String {
    STAT_NAMES
        .iter()
        .find(|(stan, _)| *stan == column)
        .map(|(_, renamed)| renamed.to_string())
        .unwrap_or_else(|| column.trim_end_matches("__").to_string())
}
