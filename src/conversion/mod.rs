//! The conversion dispatcher.
//!
//! [`Converter::convert`] takes an arbitrary [`Value`], classifies it,
//! hands it to the matching extractor and returns a canonical
//! [`InferenceData`] container. Inputs that are already labeled data (or
//! can be turned into labeled data directly) become a single-group
//! container under the requested group.
//!
//! ```
//! use inferconv::conversion::{convert_to_container, ConvertArgs};
//! use inferconv::ir::{GroupName, Value};
//! use ndarray::arr1;
//!
//! let value = Value::Array(arr1(&[1.0, 2.0, 3.0]).into_dyn());
//! let idata = convert_to_container(value, ConvertArgs::new()).unwrap();
//!
//! let x = idata.group(GroupName::Posterior).unwrap().variable("x").unwrap();
//! assert_eq!(x.shape(), &[1, 3]);
//! ```

pub mod classify;
pub mod report;
pub mod route;

pub use classify::{classify, McmcLibrary, Shape};
pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, GroupCounts,
};
pub use route::route;

use crate::config::{self, Settings};
use crate::error::InferConvError;
use crate::ir::io_beanmachine::{from_beanmachine, BeanMachineArgs};
use crate::ir::io_cmdstan_csv::{from_cmdstan, CmdStanArgs, CSV_EXTENSION};
use crate::ir::io_emcee::{from_emcee, EmceeArgs};
use crate::ir::io_pyro::{from_numpyro, from_pyro, PyroArgs};
use crate::ir::io_stan::{from_cmdstanpy, from_pystan, StanFitArgs};
use crate::ir::{
    ArgumentBag, ArrayMap, Coords, Dataset, Dims, GroupName, InferenceData, Keywords, Value,
    DEFAULT_VARIABLE_NAME,
};

/// Entry points to try when a group cannot be projected out of a
/// conversion.
pub const ALTERNATIVES: &[&str] = &[
    "convert_to_container",
    "from_cmdstan",
    "from_pystan",
    "from_cmdstanpy",
    "from_emcee",
    "from_beanmachine",
    "from_pyro",
    "from_numpyro",
];

/// Keyword the dispatcher fills from the settings unless the caller set it.
const INDEX_ORIGIN_KEY: &str = "index_origin";

/// A conversion request: the target group, optional labels, and keyword
/// options passed through to the extractor.
#[derive(Clone, Debug, Default)]
pub struct ConvertArgs {
    pub group: GroupName,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub options: Keywords,
}

impl ConvertArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: GroupName) -> Self {
        self.group = group;
        self
    }

    pub fn coords(mut self, coords: Coords) -> Self {
        self.coords = Some(coords);
        self
    }

    pub fn dims(mut self, dims: Dims) -> Self {
        self.dims = Some(dims);
        self
    }

    /// Adds a keyword option for the extractor.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn has_coords_or_dims(&self) -> bool {
        self.coords.is_some() || self.dims.is_some()
    }
}

/// Converts values into containers under a fixed set of [`Settings`].
#[derive(Clone, Copy, Debug)]
pub struct Converter<'s> {
    settings: &'s Settings,
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Self::new(config::global())
    }
}

impl<'s> Converter<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Converts `value` into a container.
    ///
    /// An existing container is returned as is, without copying.
    ///
    /// # Errors
    /// Fails when the value has no recognized shape, when coordinates or
    /// dimensions are given for already-labeled containers, or when the
    /// extractor fails. Extractor errors are returned unchanged.
    pub fn convert(&self, value: Value, args: ConvertArgs) -> Result<InferenceData, InferConvError> {
        self.convert_with_report(value, args).map(|(idata, _)| idata)
    }

    /// Like [`Converter::convert`], also reporting how the value was
    /// interpreted.
    pub fn convert_with_report(
        &self,
        value: Value,
        args: ConvertArgs,
    ) -> Result<(InferenceData, ConversionReport), InferConvError> {
        let shape = classify(&value, self.settings)?;
        tracing::debug!(shape = %shape, group = %args.group, "classified input");

        let mut report = ConversionReport::new(shape, args.group);
        let group = args.group;
        let idata = match shape {
            Shape::Container => self.keep_container(value, args, &mut report)?,
            Shape::Path => self.convert_path(value, args, &mut report)?,
            Shape::StanFit => self.convert_stan_fit(value, args, &mut report)?,
            Shape::EnsembleSampler => {
                let bag = self.stage_as(value, args, "sampler");
                from_emcee(EmceeArgs::from_bag(bag)?)?
            }
            Shape::MonteCarloSamples => {
                let bag = self.stage_as(value, args, "sampler");
                from_beanmachine(BeanMachineArgs::from_bag(bag)?)?
            }
            Shape::Mcmc => self.convert_mcmc(value, args)?,
            Shape::CsvFileList => {
                let bag = self.route_staged(value, args, &mut report);
                from_cmdstan(CmdStanArgs::from_bag(bag)?)?
            }
            Shape::Dataset
            | Shape::DataArray
            | Shape::Mapping
            | Shape::Nested
            | Shape::Array => {
                let dataset = self.to_dataset(shape, value, args, &mut report)?;
                InferenceData::single(group, dataset)
            }
        };

        if shape != Shape::Container && !idata.has_group(group) {
            report.add(ConversionIssue::info(
                ConversionIssueCode::RequestedGroupAbsent,
                format!("the converted data has no '{}' group", group),
            ));
        }
        report.record_output(&idata);
        Ok((idata, report))
    }

    /// Converts `value` and takes out the requested group.
    ///
    /// # Errors
    /// Fails with [`InferConvError::MissingGroup`] when the conversion does
    /// not produce that group; no other group is substituted.
    pub fn convert_to_dataset(
        &self,
        value: Value,
        args: ConvertArgs,
    ) -> Result<Dataset, InferConvError> {
        let group = args.group;
        self.convert(value, args)?
            .into_group(group)
            .ok_or_else(|| InferConvError::MissingGroup {
                group: group.to_string(),
                alternatives: ALTERNATIVES.join(", "),
            })
    }

    fn keep_container(
        &self,
        value: Value,
        args: ConvertArgs,
        report: &mut ConversionReport,
    ) -> Result<InferenceData, InferConvError> {
        if args.has_coords_or_dims() {
            return Err(InferConvError::CoordsWithStructuredInput {
                input: "InferenceData value",
            });
        }
        match value {
            Value::Container(idata) => {
                report.add(ConversionIssue::info(
                    ConversionIssueCode::ContainerUnchanged,
                    "input is already a container and is returned unchanged",
                ));
                Ok(idata)
            }
            other => Err(shape_mismatch(&other)),
        }
    }

    fn convert_path(
        &self,
        value: Value,
        args: ConvertArgs,
        report: &mut ConversionReport,
    ) -> Result<InferenceData, InferConvError> {
        let path = match value {
            Value::Str(path) => path,
            other => return Err(shape_mismatch(&other)),
        };

        if path.ends_with(CSV_EXTENSION) {
            let bag = self.route_staged(Value::Str(path), args, report);
            return from_cmdstan(CmdStanArgs::from_bag(bag)?);
        }

        if args.has_coords_or_dims() {
            return Err(InferConvError::CoordsWithStructuredInput {
                input: "a serialized InferenceData file",
            });
        }
        report.add(ConversionIssue::info(
            ConversionIssueCode::ContainerReadFromFile,
            format!("container read from {}", path),
        ));
        InferenceData::from_file(std::path::Path::new(&path))
    }

    fn convert_stan_fit(
        &self,
        value: Value,
        args: ConvertArgs,
        report: &mut ConversionReport,
    ) -> Result<InferenceData, InferConvError> {
        let cmdstanpy = matches!(&value, Value::Object(obj) if obj.class_name == "CmdStanMCMC");
        let bag = self.route_staged(value, args, report);
        if cmdstanpy {
            from_cmdstanpy(StanFitArgs::from_bag(bag, "from_cmdstanpy")?)
        } else {
            from_pystan(StanFitArgs::from_bag(bag, "from_pystan")?)
        }
    }

    fn convert_mcmc(&self, value: Value, args: ConvertArgs) -> Result<InferenceData, InferConvError> {
        let library = match &value {
            Value::Object(obj) => classify::mcmc_library(&obj.module),
            _ => None,
        };
        let library = library.ok_or_else(|| shape_mismatch(&value))?;
        let bag = self.stage_as(value, args, "posterior");
        match library {
            McmcLibrary::Pyro => from_pyro(PyroArgs::from_bag(bag, "from_pyro")?),
            McmcLibrary::NumPyro => from_numpyro(PyroArgs::from_bag(bag, "from_numpyro")?),
        }
    }

    /// Builds the labeled dataset for shapes that skip the extractors.
    fn to_dataset(
        &self,
        shape: Shape,
        value: Value,
        args: ConvertArgs,
        report: &mut ConversionReport,
    ) -> Result<Dataset, InferConvError> {
        let origin = self.settings.data.index_origin;
        match value {
            Value::Dataset(dataset) => {
                warn_ignored_labels(&args, report);
                Ok(dataset)
            }
            Value::DataArray(mut array) => {
                warn_ignored_labels(&args, report);
                if array.name.is_none() {
                    report.add(ConversionIssue::info(
                        ConversionIssueCode::DefaultVariableName,
                        format!("unnamed data array stored as '{}'", DEFAULT_VARIABLE_NAME),
                    ));
                    array.name = Some(DEFAULT_VARIABLE_NAME.to_string());
                }
                array.into_dataset()
            }
            Value::Mapping(entries) => {
                let arrays = entries
                    .into_iter()
                    .map(|(name, value)| {
                        let received = value.type_name().to_string();
                        match value.into_array() {
                            Some(array) => Ok((name, array)),
                            None => Err(InferConvError::InvalidVariable { name, received }),
                        }
                    })
                    .collect::<Result<ArrayMap, _>>()?;
                Dataset::from_arrays(arrays, args.coords.as_ref(), args.dims.as_ref(), origin)
            }
            Value::Record(record) => Dataset::from_arrays(
                record.flatten_arrays()?,
                args.coords.as_ref(),
                args.dims.as_ref(),
                origin,
            ),
            Value::Array(array) => {
                let mut arrays = ArrayMap::new();
                arrays.insert(DEFAULT_VARIABLE_NAME.to_string(), array);
                Dataset::from_arrays(arrays, args.coords.as_ref(), args.dims.as_ref(), origin)
            }
            other => {
                tracing::debug!(shape = %shape, received = other.type_name(), "shape mismatch");
                Err(shape_mismatch(&other))
            }
        }
    }

    /// Stages the value under the group keyword, then applies the
    /// statistics-group alias.
    fn route_staged(
        &self,
        value: Value,
        args: ConvertArgs,
        report: &mut ConversionReport,
    ) -> ArgumentBag {
        let group = args.group;
        if group.routed() != group {
            report.add(ConversionIssue::info(
                ConversionIssueCode::StatsGroupRouted,
                format!("{} input read as the {} run", group, group.routed()),
            ));
        }
        route(group, self.stage(value, args))
    }

    /// Stages the value, then moves it from the group keyword to `keyword`.
    fn stage_as(&self, value: Value, args: ConvertArgs, keyword: &str) -> ArgumentBag {
        let group = args.group;
        self.stage(value, args).rename(group.as_str(), keyword)
    }

    fn stage(&self, value: Value, args: ConvertArgs) -> ArgumentBag {
        let mut options = args.options;
        options
            .entry(INDEX_ORIGIN_KEY.to_string())
            .or_insert(Value::Int(self.settings.data.index_origin));
        ArgumentBag::stage(args.group, value, args.coords, args.dims, options)
    }
}

/// Converts `value` into a container using the process-wide settings.
pub fn convert_to_container(value: Value, args: ConvertArgs) -> Result<InferenceData, InferConvError> {
    Converter::default().convert(value, args)
}

/// Converts `value` and returns only `group`, using the process-wide
/// settings.
pub fn convert_to_dataset(
    value: Value,
    group: GroupName,
    coords: Option<Coords>,
    dims: Option<Dims>,
) -> Result<Dataset, InferConvError> {
    let args = ConvertArgs {
        group,
        coords,
        dims,
        options: Keywords::new(),
    };
    Converter::default().convert_to_dataset(value, args)
}

fn warn_ignored_labels(args: &ConvertArgs, report: &mut ConversionReport) {
    if args.has_coords_or_dims() {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CoordsDimsIgnored,
            "coords and dims have no effect on already labeled input",
        ));
    }
}

fn shape_mismatch(value: &Value) -> InferConvError {
    InferConvError::UnsupportedInput {
        supported: classify::supported_list(),
        received: value.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DataArray, Label, Record, SamplerDraws, SamplerObject};
    use ndarray::{arr1, arr2, ArrayD, IxDyn};
    use std::collections::BTreeMap;

    fn settings() -> Settings {
        Settings::detect()
    }

    fn posterior_container() -> InferenceData {
        let mut arrays = ArrayMap::new();
        arrays.insert("mu".into(), ArrayD::zeros(IxDyn(&[2, 5])));
        InferenceData::single(
            GroupName::Posterior,
            Dataset::from_arrays(arrays, None, None, 0).unwrap(),
        )
    }

    fn coords_for(dim: &str, labels: Vec<Label>) -> Coords {
        let mut coords = Coords::new();
        coords.insert(dim.to_string(), labels);
        coords
    }

    #[test]
    fn container_is_returned_without_copy() {
        let idata = posterior_container();
        let before = idata
            .group(GroupName::Posterior)
            .unwrap()
            .variable("mu")
            .unwrap()
            .values
            .as_ptr();

        let settings = settings();
        let out = Converter::new(&settings)
            .convert(Value::Container(idata), ConvertArgs::new().group(GroupName::Prior))
            .unwrap();

        let after = out
            .group(GroupName::Posterior)
            .unwrap()
            .variable("mu")
            .unwrap()
            .values
            .as_ptr();
        assert_eq!(before, after);
        assert!(!out.has_group(GroupName::Prior));
    }

    #[test]
    fn container_rejects_coords_and_dims() {
        let settings = settings();
        let converter = Converter::new(&settings);

        let with_coords = ConvertArgs::new().coords(coords_for("school", vec![Label::from("a")]));
        let err = converter
            .convert(Value::Container(posterior_container()), with_coords)
            .unwrap_err();
        assert!(matches!(err, InferConvError::CoordsWithStructuredInput { .. }));

        let with_dims = ConvertArgs::new().dims(Dims::new());
        assert!(converter
            .convert(Value::Container(posterior_container()), with_dims)
            .is_err());
    }

    #[test]
    fn non_csv_path_rejects_coords() {
        let settings = settings();
        let args = ConvertArgs::new().dims(Dims::new());
        let err = Converter::new(&settings)
            .convert(Value::from("trace.json"), args)
            .unwrap_err();
        assert!(err.to_string().contains("Cannot use coords or dims"));
    }

    #[test]
    fn non_csv_path_reads_serialized_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        posterior_container().to_file(&path).unwrap();

        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(Value::from(path.to_str().unwrap()), ConvertArgs::new())
            .unwrap();
        assert_eq!(idata, posterior_container());
    }

    #[test]
    fn array_becomes_posterior_x() {
        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(Value::Array(arr1(&[1.0, 2.0, 3.0]).into_dyn()), ConvertArgs::new())
            .unwrap();

        assert_eq!(idata.group_names().collect::<Vec<_>>(), vec![GroupName::Posterior]);
        let posterior = idata.group(GroupName::Posterior).unwrap();
        assert_eq!(posterior.variable_names().collect::<Vec<_>>(), vec!["x"]);
        let x = posterior.variable("x").unwrap();
        assert_eq!(x.values.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mapping_takes_coords_and_dims() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "alpha".to_string(),
            Value::Array(arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn()),
        );
        let mut coords = coords_for("chain", vec![Label::from(0i64), Label::from(1i64)]);
        coords.insert("draw".into(), vec![Label::from("a"), Label::from("b")]);
        let mut dims = Dims::new();
        dims.insert("alpha".into(), vec!["chain".into(), "draw".into()]);

        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(
                Value::Mapping(entries),
                ConvertArgs::new().coords(coords).dims(dims),
            )
            .unwrap();

        let posterior = idata.group(GroupName::Posterior).unwrap();
        let alpha = posterior.variable("alpha").unwrap();
        assert_eq!(alpha.shape(), &[2, 2]);
        assert_eq!(alpha.dims, vec!["chain", "draw"]);
        assert_eq!(
            posterior.coord("draw").unwrap(),
            &[Label::from("a"), Label::from("b")]
        );
    }

    #[test]
    fn mapping_with_non_numeric_entry_fails() {
        let mut entries = BTreeMap::new();
        entries.insert("label".to_string(), Value::from("text"));
        let settings = settings();
        let err = Converter::new(&settings)
            .convert(Value::Mapping(entries), ConvertArgs::new())
            .unwrap_err();
        assert!(matches!(err, InferConvError::InvalidVariable { .. }));
    }

    #[test]
    fn unnamed_data_array_is_named_x() {
        let settings = settings();
        let (idata, report) = Converter::new(&settings)
            .convert_with_report(
                Value::DataArray(DataArray::new(ArrayD::zeros(IxDyn(&[4])))),
                ConvertArgs::new().group(GroupName::ObservedData),
            )
            .unwrap();

        let observed = idata.group(GroupName::ObservedData).unwrap();
        assert!(observed.variable("x").is_some());
        assert!(report
            .issues
            .iter()
            .any(|i| i.code == ConversionIssueCode::DefaultVariableName));
    }

    #[test]
    fn dataset_lands_under_requested_group() {
        let dataset = posterior_container().into_group(GroupName::Posterior).unwrap();
        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(
                Value::Dataset(dataset.clone()),
                ConvertArgs::new().group(GroupName::Predictions),
            )
            .unwrap();
        assert_eq!(idata.group(GroupName::Predictions), Some(&dataset));
    }

    #[test]
    fn nested_record_is_flattened() {
        let record = Record {
            type_name: "Params".into(),
            fields: [(
                "mu".to_string(),
                Value::Array(ArrayD::zeros(IxDyn(&[2, 3]))),
            )]
            .into_iter()
            .collect(),
        };
        let mut settings = settings();
        settings.data.nested_structures = true;
        let idata = Converter::new(&settings)
            .convert(Value::Record(record), ConvertArgs::new())
            .unwrap();
        assert!(idata.group(GroupName::Posterior).unwrap().variable("mu").is_some());
    }

    #[test]
    fn nested_record_converts_list_leaves() {
        let record = Record {
            type_name: "Params".into(),
            fields: [
                (
                    "mu".to_string(),
                    Value::List(vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]),
                ),
                (
                    "tau".to_string(),
                    Value::List(vec![Value::Float(0.5), Value::Int(1), Value::Float(0.25)]),
                ),
            ]
            .into_iter()
            .collect(),
        };
        let mut settings = settings();
        settings.data.nested_structures = true;
        let idata = Converter::new(&settings)
            .convert(Value::Record(record), ConvertArgs::new())
            .unwrap();
        let posterior = idata.group(GroupName::Posterior).unwrap();
        assert_eq!(posterior.variable("mu").unwrap().values.shape(), &[1, 3]);
        assert_eq!(posterior.variable("tau").unwrap().values.shape(), &[1, 3]);
    }

    #[test]
    fn nested_record_with_text_leaf_is_rejected() {
        let record = Record {
            type_name: "Params".into(),
            fields: [("label".to_string(), Value::from("run-1"))].into_iter().collect(),
        };
        let mut settings = settings();
        settings.data.nested_structures = true;
        let err = Converter::new(&settings)
            .convert(Value::Record(record), ConvertArgs::new())
            .unwrap_err();
        assert!(matches!(err, InferConvError::InvalidVariable { ref name, .. } if name == "label"));
    }

    #[test]
    fn unsupported_input_reports_type() {
        let settings = settings();
        let err = Converter::new(&settings)
            .convert(Value::Int(42), ConvertArgs::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Can only convert"));
        for shape in Shape::ALL {
            assert!(message.contains(shape.name()));
        }
    }

    #[test]
    fn stan_fit_routes_by_class_name() {
        let fit = |class_name: &str| {
            Value::Object(SamplerObject::new(
                class_name,
                "fit",
                SamplerDraws::default()
                    .with_sample("mu", ArrayD::zeros(IxDyn(&[2, 5])))
                    .with_stat("lp__", ArrayD::zeros(IxDyn(&[2, 5]))),
            ))
        };
        let settings = settings();
        let converter = Converter::new(&settings);

        let idata = converter
            .convert(fit("CmdStanMCMC"), ConvertArgs::new().group(GroupName::SampleStats))
            .unwrap();
        let attrs = idata.group(GroupName::Posterior).unwrap().attrs();
        assert_eq!(attrs.get("inference_library").map(String::as_str), Some("cmdstanpy"));
        assert!(idata.group(GroupName::SampleStats).unwrap().variable("lp").is_some());

        let idata = converter.convert(fit("StanFit4Model"), ConvertArgs::new()).unwrap();
        let attrs = idata.group(GroupName::Posterior).unwrap().attrs();
        assert_eq!(attrs.get("inference_library").map(String::as_str), Some("pystan"));
    }

    #[test]
    fn ensemble_sampler_is_passed_as_sampler() {
        let sampler = SamplerObject::new(
            "EnsembleSampler",
            "emcee.ensemble",
            SamplerDraws::default().with_sample("chain", ArrayD::zeros(IxDyn(&[10, 4, 2]))),
        );
        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(
                Value::Object(sampler),
                ConvertArgs::new().option("var_names", Value::List(vec![
                    Value::from("a"),
                    Value::from("b"),
                ])),
            )
            .unwrap();
        let posterior = idata.group(GroupName::Posterior).unwrap();
        assert_eq!(posterior.variable_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn extractor_keyword_errors_propagate() {
        let samples = SamplerObject::new(
            "MonteCarloSamples",
            "beanmachine",
            SamplerDraws::default().with_sample("mu", ArrayD::zeros(IxDyn(&[1, 5]))),
        );
        let settings = settings();
        let err = Converter::new(&settings)
            .convert(
                Value::Object(samples),
                ConvertArgs::new().option("var_names", "mu"),
            )
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("from_beanmachine() got an unexpected keyword argument 'var_names'"));
    }

    #[test]
    fn numpyro_mcmc_goes_to_numpyro() {
        let mcmc = SamplerObject::new(
            "MCMC",
            "numpyro.infer.mcmc",
            SamplerDraws::default().with_stat("potential_energy", ArrayD::ones(IxDyn(&[1, 3]))),
        );
        let settings = settings();
        let idata = Converter::new(&settings)
            .convert(Value::Object(mcmc), ConvertArgs::new())
            .unwrap();
        let stats = idata.group(GroupName::SampleStats).unwrap();
        assert_eq!(
            stats.attrs().get("inference_library").map(String::as_str),
            Some("numpyro")
        );
        assert!(stats.variable("lp").is_some());
    }

    #[test]
    fn projecting_missing_group_fails() {
        let settings = settings();
        let err = Converter::new(&settings)
            .convert_to_dataset(
                Value::Container(posterior_container()),
                ConvertArgs::new().group(GroupName::Prior),
            )
            .unwrap_err();
        match err {
            InferConvError::MissingGroup { group, alternatives } => {
                assert_eq!(group, "prior");
                assert!(alternatives.contains("from_cmdstan"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn projection_returns_requested_group() {
        let settings = settings();
        let dataset = Converter::new(&settings)
            .convert_to_dataset(
                Value::Array(ArrayD::zeros(IxDyn(&[2, 4]))),
                ConvertArgs::new().group(GroupName::Prior),
            )
            .unwrap();
        assert_eq!(dataset.variable("x").unwrap().shape(), &[2, 4]);
    }
}
