//! The fixed vocabulary of container group names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InferConvError;

/// A named slot within an [`InferenceData`](super::InferenceData) container.
///
/// The text form (used as keyword names and in serialized containers) is the
/// snake_case variant name, e.g. `sample_stats_prior`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupName {
    #[default]
    Posterior,
    PosteriorPredictive,
    Predictions,
    LogLikelihood,
    SampleStats,
    Prior,
    PriorPredictive,
    SampleStatsPrior,
    ObservedData,
    ConstantData,
    PredictionsConstantData,
}

impl GroupName {
    /// Every group, in canonical order.
    pub const ALL: [GroupName; 11] = [
        GroupName::Posterior,
        GroupName::PosteriorPredictive,
        GroupName::Predictions,
        GroupName::LogLikelihood,
        GroupName::SampleStats,
        GroupName::Prior,
        GroupName::PriorPredictive,
        GroupName::SampleStatsPrior,
        GroupName::ObservedData,
        GroupName::ConstantData,
        GroupName::PredictionsConstantData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupName::Posterior => "posterior",
            GroupName::PosteriorPredictive => "posterior_predictive",
            GroupName::Predictions => "predictions",
            GroupName::LogLikelihood => "log_likelihood",
            GroupName::SampleStats => "sample_stats",
            GroupName::Prior => "prior",
            GroupName::PriorPredictive => "prior_predictive",
            GroupName::SampleStatsPrior => "sample_stats_prior",
            GroupName::ObservedData => "observed_data",
            GroupName::ConstantData => "constant_data",
            GroupName::PredictionsConstantData => "predictions_constant_data",
        }
    }

    /// The group a value staged under this name is attached to before an
    /// extractor that expects named sample groups is invoked.
    ///
    /// Only the two sampler-statistics groups alias; everything else maps to
    /// itself.
    pub fn routed(&self) -> GroupName {
        match self {
            GroupName::SampleStats => GroupName::Posterior,
            GroupName::SampleStatsPrior => GroupName::Prior,
            other => *other,
        }
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupName {
    type Err = InferConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupName::ALL
            .iter()
            .copied()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| InferConvError::UnknownGroup(s.to_string()))
    }
}
