//! Conversion report types for tracking how an input was interpreted.
//!
//! The report records which shape the input was classified as, which
//! groups the result holds, and any policy decision the dispatcher applied
//! along the way (routing a statistics group, naming an unnamed array,
//! ignoring coordinates).

use serde::Serialize;
use std::fmt;

use super::classify::Shape;
use crate::ir::{GroupName, InferenceData};

/// A report generated during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionReport {
    /// Shape the input was classified as.
    pub shape: Shape,
    /// Group requested by the caller.
    pub group: GroupName,
    /// Groups in the resulting container.
    pub groups: Vec<GroupCounts>,
    /// Notes and warnings raised while dispatching.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for an input of the given shape.
    pub fn new(shape: Shape, group: GroupName) -> Self {
        Self {
            shape,
            group,
            groups: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Record the groups of the finished container.
    pub fn record_output(&mut self, idata: &InferenceData) {
        self.groups = idata
            .groups()
            .map(|(group, dataset)| GroupCounts {
                group,
                variables: dataset.len(),
                chains: dataset.axis_len("chain"),
                draws: dataset.axis_len("draw"),
            })
            .collect();
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  input: {} (group '{}')", self.shape, self.group)?;

        for counts in &self.groups {
            write!(f, "  {}: {} variable(s)", counts.group, counts.variables)?;
            if let (Some(chains), Some(draws)) = (counts.chains, counts.draws) {
                write!(f, ", {} chain(s) x {} draw(s)", chains, draws)?;
            }
            writeln!(f)?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Size of one group in the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub group: GroupName,
    pub variables: usize,
    /// Length of the `chain` axis, if the group is sampled.
    pub chains: Option<usize>,
    /// Length of the `draw` axis, if the group is sampled.
    pub draws: Option<usize>,
}

/// A single issue discovered during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue.
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Something the caller supplied had no effect.
    Warning,
    /// A policy decision; does not affect the outcome.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// An existing container was returned as is.
    ContainerUnchanged,
    /// A container was read from a serialized file.
    ContainerReadFromFile,
    /// A statistics group was routed to the run it is derived from.
    StatsGroupRouted,
    /// An unnamed data array was given the default variable name.
    DefaultVariableName,
    /// Coordinates or dimensions were supplied for labeled input and ignored.
    CoordsDimsIgnored,
    /// The requested group is not among the groups the extractor produced.
    RequestedGroupAbsent,
}
