//! Separation plot data preparation.
//!
//! A separation plot shows the observed outcomes of a binary model ordered
//! by predicted probability. This module resolves the observed and predicted
//! series (directly or by name from a container), checks them, and computes
//! the bar layout a plotting backend draws. Drawing itself is left to the
//! backend.

use ndarray::{Array1, ArrayD};
use serde::Serialize;

use crate::config::Settings;
use crate::error::InferConvError;
use crate::ir::{GroupName, InferenceData, Variable, SAMPLE_DIMS};

/// Default label of the predicted series when it was passed as values.
pub const DEFAULT_Y_HAT_LABEL: &str = "y_hat";

/// A series given either directly or by variable name.
#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    Name(String),
    Values(ArrayD<f64>),
}

impl From<&str> for Series {
    fn from(name: &str) -> Self {
        Series::Name(name.to_string())
    }
}

impl From<ArrayD<f64>> for Series {
    fn from(values: ArrayD<f64>) -> Self {
        Series::Values(values)
    }
}

/// Inputs of a separation plot.
#[derive(Clone, Debug, Default)]
pub struct SeparationArgs<'a> {
    /// Container to look named series up in.
    pub idata: Option<&'a InferenceData>,
    /// Observed outcomes, or their name in `observed_data`.
    pub y: Option<Series>,
    /// Predicted probabilities, or their name in `posterior_predictive`.
    pub y_hat: Option<Series>,
    /// Draw the sorted predictions as a line.
    pub y_hat_line: bool,
    /// Mark the total number of expected events.
    pub expected_events: bool,
    /// Plotting backend; the configured default when `None`.
    pub backend: Option<String>,
}

/// Everything a backend needs to draw the plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeparationLayout {
    pub y: Vec<f64>,
    pub y_hat: Vec<f64>,
    pub label_y_hat: String,
    /// Bar positions, evenly spaced over `[0, 1]`.
    pub locs: Vec<f64>,
    /// Bar width: the mean spacing of `locs`.
    pub width: f64,
    /// Indices that sort `y_hat` ascending.
    pub order: Vec<usize>,
    /// Sum of the predicted probabilities.
    pub expected_events: f64,
    pub show_expected_events: bool,
    pub y_hat_line: bool,
    pub backend: String,
}

/// Resolves the series and computes the plot layout.
///
/// # Errors
/// - Without a container, both `y` and `y_hat` must be given as values.
/// - With a container, `y_hat` may only be omitted when `y` is a name
///   (the same variable is then used for both).
/// - Named series must exist in their group.
///
/// Series of different lengths only produce a warning.
pub fn prepare(
    args: SeparationArgs<'_>,
    settings: &Settings,
) -> Result<SeparationLayout, InferConvError> {
    let (y, y_hat, label_y_hat) = resolve(args.idata, args.y, args.y_hat)?;

    if y.len() != y_hat.len() {
        tracing::warn!(
            y = y.len(),
            y_hat = y_hat.len(),
            "y and y_hat must be the same length"
        );
    }

    let locs = Array1::linspace(0.0, 1.0, y_hat.len());
    let width = mean_spacing(&locs);
    let mut order: Vec<usize> = (0..y_hat.len()).collect();
    order.sort_by(|&a, &b| y_hat[a].total_cmp(&y_hat[b]));

    let backend = args
        .backend
        .unwrap_or_else(|| settings.plot.backend.clone())
        .to_lowercase();

    Ok(SeparationLayout {
        expected_events: y_hat.iter().sum(),
        y,
        y_hat,
        label_y_hat,
        locs: locs.to_vec(),
        width,
        order,
        show_expected_events: args.expected_events,
        y_hat_line: args.y_hat_line,
        backend,
    })
}

fn resolve(
    idata: Option<&InferenceData>,
    y: Option<Series>,
    y_hat: Option<Series>,
) -> Result<(Vec<f64>, Vec<f64>, String), InferConvError> {
    let Some(idata) = idata else {
        return match (y, y_hat) {
            (Some(Series::Values(y)), Some(Series::Values(y_hat))) => {
                Ok((flat(&y), flat(&y_hat), DEFAULT_Y_HAT_LABEL.to_string()))
            }
            _ => Err(InferConvError::SeparationInput(
                "y and y_hat must be arrays when no container is given".to_string(),
            )),
        };
    };

    let y_hat = match (&y, y_hat) {
        (_, Some(y_hat)) => y_hat,
        (Some(Series::Name(name)), None) => Series::Name(name.clone()),
        _ => {
            return Err(InferConvError::SeparationInput(
                "y_hat cannot be omitted unless y is a variable name".to_string(),
            ))
        }
    };

    let y = match y {
        Some(Series::Name(name)) => {
            flat(&variable(idata, GroupName::ObservedData, &name)?.values)
        }
        Some(Series::Values(values)) => flat(&values),
        None => {
            return Err(InferConvError::SeparationInput(
                "y must be an array or a variable name".to_string(),
            ))
        }
    };

    let (y_hat, label) = match y_hat {
        Series::Name(name) => {
            let mean = variable(idata, GroupName::PosteriorPredictive, &name)?
                .mean_over(&SAMPLE_DIMS);
            (flat(&mean.values), name)
        }
        Series::Values(values) => (flat(&values), DEFAULT_Y_HAT_LABEL.to_string()),
    };
    Ok((y, y_hat, label))
}

fn variable<'a>(
    idata: &'a InferenceData,
    group: GroupName,
    name: &str,
) -> Result<&'a Variable, InferConvError> {
    idata
        .group(group)
        .ok_or_else(|| {
            InferConvError::SeparationInput(format!("the container has no {} group", group))
        })?
        .variable(name)
        .ok_or_else(|| {
            InferConvError::SeparationInput(format!("'{}' is not a variable of {}", name, group))
        })
}

fn flat(values: &ArrayD<f64>) -> Vec<f64> {
    values.iter().copied().collect()
}

/// Mean gap between consecutive positions; NaN with fewer than two.
fn mean_spacing(locs: &Array1<f64>) -> f64 {
    if locs.len() < 2 {
        return f64::NAN;
    }
    let n = locs.len();
    (locs[n - 1] - locs[0]) / (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Dataset, Variable as Var};
    use ndarray::{arr1, Array, IxDyn};

    fn container() -> InferenceData {
        let mut observed = Dataset::new();
        observed
            .insert(
                "outcome",
                Var::new(vec!["obs".into()], arr1(&[0.0, 1.0, 1.0]).into_dyn()),
            )
            .unwrap();

        // chain 0 predicts 0.2, chain 1 predicts 0.4 everywhere except obs 1
        let predicted = Array::from_shape_fn(IxDyn(&[2, 2, 3]), |i| match (i[0], i[2]) {
            (_, 1) => 0.9,
            (0, _) => 0.2,
            _ => 0.4,
        });
        let mut predictive = Dataset::new();
        predictive
            .insert(
                "outcome",
                Var::new(vec!["chain".into(), "draw".into(), "obs".into()], predicted),
            )
            .unwrap();

        InferenceData::single(GroupName::ObservedData, observed)
            .with_group(GroupName::PosteriorPredictive, predictive)
    }

    #[test]
    fn arrays_without_container() {
        let layout = prepare(
            SeparationArgs {
                y: Some(arr1(&[1.0, 0.0, 1.0, 0.0]).into_dyn().into()),
                y_hat: Some(arr1(&[0.8, 0.1, 0.6, 0.3]).into_dyn().into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap();

        assert_eq!(layout.order, vec![1, 3, 2, 0]);
        assert_eq!(layout.locs.len(), 4);
        assert!((layout.width - 1.0 / 3.0).abs() < 1e-12);
        assert!((layout.expected_events - 1.8).abs() < 1e-12);
        assert_eq!(layout.label_y_hat, "y_hat");
        assert_eq!(layout.backend, "matplotlib");
    }

    #[test]
    fn names_require_container() {
        let err = prepare(
            SeparationArgs {
                y: Some("outcome".into()),
                y_hat: Some(arr1(&[0.5]).into_dyn().into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap_err();
        assert!(matches!(err, InferConvError::SeparationInput(_)));
    }

    #[test]
    fn y_name_doubles_as_y_hat() {
        let idata = container();
        let layout = prepare(
            SeparationArgs {
                idata: Some(&idata),
                y: Some("outcome".into()),
                backend: Some("Bokeh".into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap();

        assert_eq!(layout.label_y_hat, "outcome");
        assert_eq!(layout.y, vec![0.0, 1.0, 1.0]);
        let expected = [0.3, 0.9, 0.3];
        for (got, want) in layout.y_hat.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        assert_eq!(layout.backend, "bokeh");
    }

    #[test]
    fn y_hat_required_when_y_is_values() {
        let idata = container();
        let err = prepare(
            SeparationArgs {
                idata: Some(&idata),
                y: Some(arr1(&[1.0]).into_dyn().into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("y_hat cannot be omitted"));
    }

    #[test]
    fn unknown_variable_is_reported() {
        let idata = container();
        let err = prepare(
            SeparationArgs {
                idata: Some(&idata),
                y: Some("missing".into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn length_mismatch_is_not_an_error() {
        let layout = prepare(
            SeparationArgs {
                y: Some(arr1(&[1.0, 0.0]).into_dyn().into()),
                y_hat: Some(arr1(&[0.5]).into_dyn().into()),
                ..Default::default()
            },
            &Settings::detect(),
        )
        .unwrap();
        assert_eq!(layout.locs, vec![0.0]);
        assert!(layout.width.is_nan());
    }
}
