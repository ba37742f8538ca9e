//! Extractor for Bean Machine results (`MonteCarloSamples`).

use super::args::ArgumentBag;
use super::assemble::GroupAssembler;
use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::value::SamplerObject;
use crate::error::InferConvError;

const EXTRACTOR: &str = "from_beanmachine";

const ACCEPTED: &[&str] = &["sampler", "index_origin"];

/// Arguments for [`from_beanmachine`].
#[derive(Clone, Debug)]
pub struct BeanMachineArgs {
    pub sampler: SamplerObject,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub index_origin: Option<i64>,
}

impl BeanMachineArgs {
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
            coords,
            dims,
            index_origin: kw.take_int("index_origin")?,
        })
    }
}

/// Converts Monte Carlo samples laid out as `(chain, draw, ...)`.
///
/// Samples fill `posterior`; recorded log-likelihoods fill `log_likelihood`.
pub fn from_beanmachine(args: BeanMachineArgs) -> Result<InferenceData, InferConvError> {
    let draws = args.sampler.draws;
    if let Some((name, _)) = draws
        .samples
        .iter()
        .chain(draws.log_likelihood.iter())
        .find(|(_, values)| values.ndim() < 2)
    {
        return Err(InferConvError::InvalidSamplerOutput {
            extractor: EXTRACTOR,
            message: format!("'{}' is not laid out as (chain, draw, ...)", name),
        });
    }

    Ok(GroupAssembler::new(
        args.coords.as_ref(),
        args.dims.as_ref(),
        args.index_origin,
        "beanmachine",
    )
    .sampled(GroupName::Posterior, draws.samples)?
    .sampled(GroupName::LogLikelihood, draws.log_likelihood)?
    .finish())
}
