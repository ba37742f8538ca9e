//! Container inspection and statistics.
//!
//! This module analyzes a converted container and produces a structured
//! report: sample sizes, the variables of every group with their dimensions,
//! and value-quality metrics (non-finite entries).

mod report;

pub use report::{GroupSection, InspectReport, SummarySection, VariableEntry};

use crate::ir::{Dataset, GroupName, InferenceData, Variable};

/// Options for container inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Maximum number of variables listed per group.
    pub top_variables: usize,
    /// Width of size bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_variables: 10,
            bar_width: 20,
        }
    }
}

/// Inspect a container and produce a detailed report.
///
/// This analyzes the container to compute:
/// - Summary counts (groups, variables, chains and draws of the posterior)
/// - Per-group variable listing, largest variables first
/// - Non-finite value counts
pub fn inspect_container(idata: &InferenceData, opts: &InspectOptions) -> InspectReport {
    let groups: Vec<GroupSection> = idata
        .groups()
        .map(|(group, dataset)| inspect_group(group, dataset, opts.top_variables))
        .collect();

    InspectReport {
        summary: compute_summary(idata, &groups),
        groups,
        bar_width: opts.bar_width,
    }
}

fn compute_summary(idata: &InferenceData, groups: &[GroupSection]) -> SummarySection {
    // Sample sizes come from the first sampled group, posterior preferred.
    let sampled = idata
        .group(GroupName::Posterior)
        .filter(|ds| ds.axis_len("chain").is_some())
        .or_else(|| {
            idata
                .groups()
                .map(|(_, ds)| ds)
                .find(|ds| ds.axis_len("chain").is_some())
        });

    SummarySection {
        groups: groups.len(),
        variables: groups.iter().map(|g| g.total_variables).sum(),
        values: groups.iter().map(|g| g.values).sum(),
        non_finite: groups.iter().map(|g| g.non_finite).sum(),
        chains: sampled.and_then(|ds| ds.axis_len("chain")),
        draws: sampled.and_then(|ds| ds.axis_len("draw")),
    }
}

fn inspect_group(group: GroupName, dataset: &Dataset, top_n: usize) -> GroupSection {
    let mut entries: Vec<VariableEntry> = dataset
        .variables()
        .map(|(name, var)| inspect_variable(name, var))
        .collect();

    // Sort by size descending, then by name ascending for deterministic output
    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

    let total_variables = entries.len();
    let values = entries.iter().map(|e| e.size).sum();
    let non_finite = entries.iter().map(|e| e.non_finite).sum();
    entries.truncate(top_n);

    GroupSection {
        group,
        total_variables,
        values,
        non_finite,
        library: dataset.attrs().get("inference_library").cloned(),
        entries,
    }
}

fn inspect_variable(name: &str, var: &Variable) -> VariableEntry {
    let finite: Vec<f64> = var.values.iter().copied().filter(|v| v.is_finite()).collect();
    let mean = if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    };

    VariableEntry {
        name: name.to_string(),
        dims: var.dims.clone(),
        shape: var.shape().to_vec(),
        size: var.values.len(),
        non_finite: var.values.len() - finite.len(),
        mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};
    use std::collections::BTreeMap;

    fn make_test_container() -> InferenceData {
        let mut posterior = BTreeMap::new();
        posterior.insert("mu".to_string(), ArrayD::from_elem(IxDyn(&[4, 100]), 1.5));
        posterior.insert("theta".to_string(), ArrayD::zeros(IxDyn(&[4, 100, 8])));
        let mut stats = BTreeMap::new();
        let mut lp: ArrayD<f64> = ArrayD::zeros(IxDyn(&[4, 100]));
        lp[IxDyn(&[0, 0])] = f64::NAN;
        stats.insert("lp".to_string(), lp);

        let mut posterior = Dataset::from_arrays(posterior, None, None, 0).unwrap();
        posterior.set_attr("inference_library", "pystan");
        InferenceData::single(GroupName::Posterior, posterior).with_group(
            GroupName::SampleStats,
            Dataset::from_arrays(stats, None, None, 0).unwrap(),
        )
    }

    #[test]
    fn test_summary_counts() {
        let report = inspect_container(&make_test_container(), &InspectOptions::default());

        assert_eq!(report.summary.groups, 2);
        assert_eq!(report.summary.variables, 3);
        assert_eq!(report.summary.chains, Some(4));
        assert_eq!(report.summary.draws, Some(100));
        assert_eq!(report.summary.non_finite, 1);
    }

    #[test]
    fn test_variables_sorted_by_size() {
        let report = inspect_container(&make_test_container(), &InspectOptions::default());
        let posterior = &report.groups[0];

        assert_eq!(posterior.group, GroupName::Posterior);
        assert_eq!(posterior.entries[0].name, "theta");
        assert_eq!(posterior.entries[0].shape, vec![4, 100, 8]);
        assert_eq!(posterior.entries[1].mean, Some(1.5));
        assert_eq!(posterior.library.as_deref(), Some("pystan"));
    }

    #[test]
    fn test_top_variables_truncates() {
        let opts = InspectOptions {
            top_variables: 1,
            ..Default::default()
        };
        let report = inspect_container(&make_test_container(), &opts);
        assert_eq!(report.groups[0].entries.len(), 1);
        assert_eq!(report.groups[0].total_variables, 2);
    }

    #[test]
    fn test_display_output() {
        let report = inspect_container(&make_test_container(), &InspectOptions::default());
        let output = format!("{}", report);

        assert!(output.contains("Container Inspection Report"));
        assert!(output.contains("Summary"));
        assert!(output.contains("posterior"));
        assert!(output.contains("sample_stats"));
        assert!(output.contains("theta"));
    }

    #[test]
    fn test_empty_container() {
        let report = inspect_container(&InferenceData::new(), &InspectOptions::default());
        assert_eq!(report.summary.groups, 0);
        assert_eq!(report.summary.chains, None);
        assert!(format!("{}", report).contains("No groups found."));
    }
}
