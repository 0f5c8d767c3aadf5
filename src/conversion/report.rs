//! Conversion report types for tracking lossiness and policy decisions.
//!
//! A conversion reads with one plugin and writes with another. The report
//! records which plugins ran, the shape of the canonical value in between,
//! and anything the caller should know about what was dropped or reshaped.

use serde::Serialize;
use std::fmt;

use crate::value::Value;

/// A report generated during format conversion.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Plugin id of the reader.
    pub from: String,
    /// Plugin id of the writer.
    pub to: String,
    /// Media type of the produced document.
    pub media_type: String,
    /// Shape of the canonical value passed between the plugins.
    pub counts: ValueCounts,
    /// Issues discovered during conversion.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a conversion between plugins.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (true lossiness).
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

    /// Returns true if this conversion lost information.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    pub fn has_code(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Converted {} -> {} ({})", self.from, self.to, self.media_type)?;
        writeln!(
            f,
            "  {} objects, {} arrays, {} scalars",
            self.counts.objects, self.counts.arrays, self.counts.scalars
        )?;

        for (severity, title) in [
            (ConversionSeverity::Warning, "Warnings"),
            (ConversionSeverity::Info, "Notes"),
        ] {
            let issues: Vec<_> = self
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{} ({}):", title, issues.len())?;
            for issue in issues {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Node counts of a canonical value tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValueCounts {
    pub objects: usize,
    pub arrays: usize,
    /// Null, boolean, number and string nodes.
    pub scalars: usize,
}

impl ValueCounts {
    pub fn of(value: &Value) -> Self {
        let mut counts = Self::default();
        let mut stack = vec![value];
        while let Some(node) = stack.pop() {
            match node {
                Value::Object(obj) => {
                    counts.objects += 1;
                    stack.extend(obj.values());
                }
                Value::Array(items) => {
                    counts.arrays += 1;
                    stack.extend(items.iter());
                }
                _ => counts.scalars += 1,
            }
        }
        counts
    }
}

/// A single issue discovered during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (indicates lossiness).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, does not block).
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
    /// Information was lost or reshaped.
    Warning,
    /// A policy decision or note.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// A read parameter was not declared by the reader and had no effect.
    IgnoredReadParameter,
    /// A write parameter was not declared by the writer and had no effect.
    IgnoredWriteParameter,
    /// The reader carries cells as text (CSV); numeric and boolean types are not recovered.
    CellsReadAsStrings,
    /// Numbers, booleans or nulls were written as text by a text-only writer.
    ScalarsWrittenAsText,
    /// The writer chose its output representation from the root node.
    HostTargetResolved,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::json::from_json_str;

    #[test]
    fn empty_report_is_not_lossy() {
        let report = ConversionReport::new("JSON", "JSON");
        assert!(!report.is_lossy());
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn warning_makes_report_lossy() {
        let mut report = ConversionReport::new("CSV", "JSON");
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CellsReadAsStrings,
            "cells read as strings",
        ));
        assert!(report.is_lossy());
        assert!(report.has_code(ConversionIssueCode::CellsReadAsStrings));
    }

    #[test]
    fn info_does_not_make_report_lossy() {
        let mut report = ConversionReport::new("JSON", "Rust");
        report.add(ConversionIssue::info(
            ConversionIssueCode::HostTargetResolved,
            "output type: Vec<serde_json::Value>",
        ));
        assert!(!report.is_lossy());
        assert_eq!(report.info_count(), 1);
        assert!(report.to_string().contains("Notes (1):"));
    }

    #[test]
    fn counts_cover_every_node() {
        let value = from_json_str(r#"{"a":[1,2,{"b":null}],"c":"x"}"#).unwrap();
        assert_eq!(
            ValueCounts::of(&value),
            ValueCounts {
                objects: 2,
                arrays: 1,
                scalars: 4,
            }
        );
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new("JSON", "CSV");
        report.add(ConversionIssue::warning(
            ConversionIssueCode::ScalarsWrittenAsText,
            "3 scalar(s) written as text",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"from\":\"JSON\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"scalars_written_as_text\""));
    }
}
