//! Lint report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::warning::Warning;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of warnings
    pub total: usize,

    /// Number of enabled rules that ran
    pub rules_run: usize,

    /// Number of tables in the linted schema
    pub tables_checked: usize,

    /// Warning count per rule code
    pub by_rule: BTreeMap<String, usize>,
}

/// Lint report (report.json v1)
///
/// Zero warnings means no issues were found, not that nothing was checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Name of the linted schema
    pub schema: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All warnings, in rule order
    pub warnings: Vec<Warning>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Report {
    /// Create a new empty report
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            schema: schema.into(),
            summary: ReportSummary::default(),
            warnings: Vec::new(),
            metadata: None,
        }
    }

    /// Create a report from warnings
    pub fn from_warnings(schema: impl Into<String>, warnings: Vec<Warning>) -> Self {
        let mut report = Self::new(schema);
        for warning in warnings {
            report.add_warning(warning);
        }
        report
    }

    /// Record run statistics
    pub fn with_counts(mut self, rules_run: usize, tables_checked: usize) -> Self {
        self.summary.rules_run = rules_run;
        self.summary.tables_checked = tables_checked;
        self
    }

    /// Add a warning to the report
    pub fn add_warning(&mut self, warning: Warning) {
        *self
            .summary
            .by_rule
            .entry(warning.rule.as_str().to_string())
            .or_insert(0) += 1;
        self.summary.total += 1;
        self.warnings.push(warning);
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        self.summary.total > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as Markdown
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Lint Report: {}\n\n", self.schema));
        md.push_str(&format!("**Version:** {}\n\n", self.version));
        md.push_str(&format!("**Timestamp:** {}\n\n", self.timestamp));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Rules run: {}\n", self.summary.rules_run));
        md.push_str(&format!("- Tables checked: {}\n", self.summary.tables_checked));
        md.push_str(&format!("- Warnings: {}\n\n", self.summary.total));

        if self.warnings.is_empty() {
            md.push_str("**No issues found.**\n");
            return md;
        }

        md.push_str("## Warnings\n\n");
        md.push_str("| Rule | Target | Message |\n");
        md.push_str("|---|---|---|\n");
        for warning in &self.warnings {
            md.push_str(&format!(
                "| {} | `{}` | {} |\n",
                warning.rule,
                warning.target,
                warning.message.replace('|', "\\|")
            ));
        }

        md
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
