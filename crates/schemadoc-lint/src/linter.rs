//! Runs the rule set against a schema

use schemadoc_core::{Config, LintConfig, Report, Schema, Warning};

use crate::rule::{LintRule, Rule};

/// Ordered rule set plus the global exclude list
#[derive(Debug, Clone)]
pub struct Linter {
    rules: Vec<Rule>,
    exclude: Vec<String>,
}

impl Linter {
    /// Linter with every built-in rule configured from `config`
    pub fn new(config: &LintConfig) -> Self {
        Self {
            rules: Rule::from_config(config),
            exclude: Vec::new(),
        }
    }

    /// Rules from `[lint]`, global exclusions from `lint_exclude`
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.lint).with_exclude(config.lint_exclude.clone())
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules that will inspect the schema
    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_enabled()).count()
    }

    /// Warnings of every enabled rule, rule by rule
    pub fn check(&self, schema: &Schema) -> Vec<Warning> {
        let mut warnings = Vec::new();

        for rule in self.rules.iter().filter(|r| r.is_enabled()) {
            let found = rule.check(schema, &self.exclude);
            tracing::debug!(rule = %rule.code(), warnings = found.len(), "lint rule finished");
            warnings.extend(found);
        }

        warnings
    }

    /// Run the rules and wrap the warnings in a report
    pub fn report(&self, schema: &Schema) -> Report {
        Report::from_warnings(&schema.name, self.check(schema))
            .with_counts(self.enabled_count(), schema.tables.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadoc_core::{RuleCode, Table};

    #[test]
    fn disabled_linter_reports_nothing() {
        let mut schema = Schema::new("app");
        schema.tables = vec![Table::new("users")];

        let linter = Linter::new(&LintConfig::default());
        assert_eq!(linter.rules().len(), RuleCode::ALL.len());
        assert_eq!(linter.enabled_count(), 0);

        let report = linter.report(&schema);
        assert!(!report.has_warnings());
        assert_eq!(report.summary.tables_checked, 1);
    }

    #[test]
    fn warnings_follow_rule_order() {
        let mut schema = Schema::new("app");
        schema.tables = vec![Table::new("users").with_label("BAD")];

        let mut config = Config::default();
        config.lint.label_style.enabled = true;
        config.lint.require_table_comment.enabled = true;

        let warnings = Linter::from_config(&config).check(&schema);
        let rules: Vec<RuleCode> = warnings.iter().map(|w| w.rule).collect();
        assert_eq!(rules, vec![RuleCode::RequireTableComment, RuleCode::LabelStyle]);
    }

    #[test]
    fn global_exclude_applies_to_every_rule() {
        let mut schema = Schema::new("app");
        schema.tables = vec![Table::new("users").with_label("BAD")];

        let mut config = Config::default();
        config.lint.label_style.enabled = true;
        config.lint.require_table_comment.enabled = true;
        config.lint_exclude = vec!["users".to_string()];

        assert!(Linter::from_config(&config).check(&schema).is_empty());
    }
}
