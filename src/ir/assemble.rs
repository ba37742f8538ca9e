//! Shared group assembly for the per-engine extractors.

use ndarray::ArrayD;
use std::collections::BTreeMap;

use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::dataset::{Dataset, SAMPLE_DIMS};
use super::group::GroupName;
use crate::config;
use crate::error::InferConvError;

/// Variable name to raw array.
pub type ArrayMap = BTreeMap<String, ArrayD<f64>>;

/// Accumulates groups into a container, building each from raw arrays with
/// the same coordinates, dimensions and index origin.
pub(crate) struct GroupAssembler<'a> {
    idata: InferenceData,
    coords: Option<&'a Coords>,
    dims: Option<&'a Dims>,
    index_origin: i64,
    library: &'static str,
}

impl<'a> GroupAssembler<'a> {
    pub(crate) fn new(
        coords: Option<&'a Coords>,
        dims: Option<&'a Dims>,
        index_origin: Option<i64>,
        library: &'static str,
    ) -> Self {
        Self {
            idata: InferenceData::new(),
            coords,
            dims,
            index_origin: index_origin.unwrap_or_else(|| config::global().data.index_origin),
            library,
        }
    }

    /// Adds a group of `(chain, draw, ...)` arrays. Empty maps add nothing.
    pub(crate) fn sampled(mut self, group: GroupName, arrays: ArrayMap) -> Result<Self, InferConvError> {
        if !arrays.is_empty() {
            let dataset = self.build(arrays, &SAMPLE_DIMS)?;
            self.idata = self.idata.with_group(group, dataset);
        }
        Ok(self)
    }

    /// Adds a group of arrays without sample dimensions (observed or
    /// constant data).
    pub(crate) fn plain(mut self, group: GroupName, arrays: Option<ArrayMap>) -> Result<Self, InferConvError> {
        if let Some(arrays) = arrays.filter(|a| !a.is_empty()) {
            let dataset = self.build(arrays, &[])?;
            self.idata = self.idata.with_group(group, dataset);
        }
        Ok(self)
    }

    pub(crate) fn finish(self) -> InferenceData {
        self.idata
    }

    fn build(&self, arrays: ArrayMap, sample_dims: &[&str]) -> Result<Dataset, InferConvError> {
        let mut dataset =
            Dataset::from_arrays_with(arrays, self.coords, self.dims, sample_dims, self.index_origin)?;
        dataset.set_attr("inference_library", self.library);
        Ok(dataset)
    }
}

/// Moves the named variables out of `arrays`.
///
/// Fails if any name is missing, naming the group it was requested for.
pub(crate) fn take_variables(
    arrays: &mut ArrayMap,
    names: &[String],
    extractor: &'static str,
    group: GroupName,
) -> Result<ArrayMap, InferConvError> {
    let mut out = ArrayMap::new();
    for name in names {
        let values = arrays
            .remove(name)
            .ok_or_else(|| InferConvError::InvalidSamplerOutput {
                extractor,
                message: format!("variable '{}' requested for {} was not sampled", name, group),
            })?;
        out.insert(name.clone(), values);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn empty_groups_are_skipped() {
        let idata = GroupAssembler::new(None, None, Some(0), "test")
            .sampled(GroupName::Posterior, ArrayMap::new())
            .unwrap()
            .plain(GroupName::ObservedData, None)
            .unwrap()
            .finish();
        assert!(idata.is_empty());
    }

    #[test]
    fn groups_carry_library_attr() {
        let mut arrays = ArrayMap::new();
        arrays.insert("mu".into(), ArrayD::zeros(IxDyn(&[2, 3])));
        let idata = GroupAssembler::new(None, None, Some(0), "emcee")
            .sampled(GroupName::Posterior, arrays)
            .unwrap()
            .finish();

        let posterior = idata.group(GroupName::Posterior).unwrap();
        assert_eq!(
            posterior.attrs().get("inference_library").map(String::as_str),
            Some("emcee")
        );
    }

    #[test]
    fn missing_requested_variable_fails() {
        let mut arrays = ArrayMap::new();
        let err = take_variables(
            &mut arrays,
            &["y_hat".to_string()],
            "from_pystan",
            GroupName::PosteriorPredictive,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'y_hat'"));
        assert!(err.to_string().contains("posterior_predictive"));
    }
}
