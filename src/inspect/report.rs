//! Inspect report types and terminal formatting.
//!
//! This module provides structured inspection results that are displayed
//! in the terminal or serialized as JSON.

use serde::Serialize;
use std::fmt;

use crate::ir::GroupName;

/// The result of inspecting a container.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Summary counts for the container.
    pub summary: SummarySection,
    /// One section per group, in canonical group order.
    pub groups: Vec<GroupSection>,
    /// Display options for formatting.
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Summary counts for the container.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    /// Number of groups.
    pub groups: usize,
    /// Number of variables across all groups.
    pub variables: usize,
    /// Number of stored values across all groups.
    pub values: usize,
    /// Values that are NaN or infinite.
    pub non_finite: usize,
    /// Chains of the sampled groups, if any group is sampled.
    pub chains: Option<usize>,
    /// Draws per chain of the sampled groups.
    pub draws: Option<usize>,
}

/// Variables of one group.
#[derive(Clone, Debug, Serialize)]
pub struct GroupSection {
    pub group: GroupName,
    /// Total variables in the group (entries may be truncated).
    pub total_variables: usize,
    /// Number of stored values in the group.
    pub values: usize,
    pub non_finite: usize,
    /// Library that produced the group, when recorded.
    pub library: Option<String>,
    /// Largest variables first.
    pub entries: Vec<VariableEntry>,
}

/// A single variable with its layout.
#[derive(Clone, Debug, Serialize)]
pub struct VariableEntry {
    pub name: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    /// Number of stored values.
    pub size: usize,
    pub non_finite: usize,
    /// Mean of the finite values.
    pub mean: Option<f64>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│               Container Inspection Report                   │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;

        if self.groups.is_empty() {
            writeln!(f)?;
            writeln!(f, "  No groups found.")?;
            return Ok(());
        }

        for group in &self.groups {
            writeln!(f)?;
            self.fmt_group(f, group)?;
        }

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "┌─ Summary ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│   Groups:        {:>8}", format_number(s.groups))?;
        writeln!(f, "│   Variables:     {:>8}", format_number(s.variables))?;
        writeln!(f, "│   Values:        {:>8}", format_number(s.values))?;
        if let (Some(chains), Some(draws)) = (s.chains, s.draws) {
            writeln!(f, "│   Chains:        {:>8}", format_number(chains))?;
            writeln!(f, "│   Draws:         {:>8}", format_number(draws))?;
        }
        if s.non_finite > 0 {
            writeln!(
                f,
                "│   ⚠ Non-finite:  {:>8} ({})",
                format_number(s.non_finite),
                fmt_percent(s.non_finite, s.values)
            )?;
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_group(&self, f: &mut fmt::Formatter<'_>, g: &GroupSection) -> fmt::Result {
        let header = if g.total_variables > g.entries.len() {
            format!("{} (top {} of {})", g.group, g.entries.len(), g.total_variables)
        } else {
            format!("{} ({})", g.group, g.total_variables)
        };

        writeln!(f, "┌─ {} {}┐", header, "─".repeat(57usize.saturating_sub(header.len())))?;
        if let Some(library) = &g.library {
            writeln!(f, "│   library: {}", library)?;
        }

        if g.entries.is_empty() {
            writeln!(f, "│   No variables.")?;
        } else {
            let max_size = g.entries.iter().map(|e| e.size).max().unwrap_or(1);

            for entry in &g.entries {
                let bar = render_bar(entry.size, max_size, self.bar_width);
                writeln!(
                    f,
                    "│   {:<16} {:<24} {}{}",
                    truncate_label(&entry.name, 16),
                    truncate_label(&format_dims(entry), 24),
                    pad_bar(&bar, self.bar_width),
                    entry.mean.map(|m| format!("mean {:.3}", m)).unwrap_or_default()
                )?;
            }
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }
}

/// `(chain=4, draw=100)` style layout of a variable.
fn format_dims(entry: &VariableEntry) -> String {
    let parts: Vec<String> = entry
        .dims
        .iter()
        .zip(&entry.shape)
        .map(|(dim, len)| format!("{}={}", dim, len))
        .collect();
    format!("({})", parts.join(", "))
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Pad a bar string to ensure consistent column alignment.
fn pad_bar(bar: &str, width: usize) -> String {
    let visual_len = bar.chars().count();
    let padding = (width + 2).saturating_sub(visual_len);
    format!("{}{}", bar, " ".repeat(padding))
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_len - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(0, 0), "n/a");
        assert_eq!(fmt_percent(1, 3), "33.3%");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(render_bar(0, 10, 10), "░░░░░░░░░░");
    }

    #[test]
    fn test_format_dims() {
        let entry = VariableEntry {
            name: "theta".into(),
            dims: vec!["chain".into(), "draw".into(), "school".into()],
            shape: vec![4, 100, 8],
            size: 3200,
            non_finite: 0,
            mean: None,
        };
        assert_eq!(format_dims(&entry), "(chain=4, draw=100, school=8)");
    }

    #[test]
    fn test_truncate_label_counts_chars() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("θθθθθθθθθθθθ", 4), "θθθ…");
    }

    #[test]
    fn test_report_serializes_without_display_options() {
        let report = InspectReport {
            summary: SummarySection::default(),
            groups: Vec::new(),
            bar_width: 20,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"summary\""));
        assert!(!json.contains("bar_width"));
    }
}
