//! Table shape rules

use schemadoc_core::config::{ColumnCount, RequireColumns, UnrelatedTable};
use schemadoc_core::{RuleCode, Schema, Target, Warning};

use crate::exclude::TableFilter;
use crate::rule::LintRule;

impl LintRule for UnrelatedTable {
    fn code(&self) -> RuleCode {
        RuleCode::UnrelatedTable
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// One aggregated warning, targeted at the schema, listing every isolated table
    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let filter = TableFilter::new(schema, exclude, &self.exclude);
        let in_scope: Vec<&str> = schema
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| !filter.is_excluded(name))
            .collect();

        let isolated: Vec<&str> = in_scope
            .iter()
            .copied()
            .filter(|name| !schema.relations.iter().any(|r| r.touches(name)))
            .collect();
        let related = isolated.len() != in_scope.len();

        if isolated.is_empty() || (self.all_or_nothing && !related) {
            return Vec::new();
        }

        vec![Warning::new(
            self.code(),
            Target::schema(&schema.name),
            format!("unrelated (isolated) table exists. [{}]", isolated.join(" ")),
        )]
    }
}

impl LintRule for ColumnCount {
    fn code(&self) -> RuleCode {
        RuleCode::ColumnCount
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let filter = TableFilter::new(schema, exclude, &self.exclude);
        schema
            .tables
            .iter()
            .filter(|t| !filter.is_excluded(&t.name) && t.columns.len() > self.max)
            .map(|t| {
                Warning::new(
                    self.code(),
                    Target::table(&t.name),
                    format!("too many columns. [{}/{}]", t.columns.len(), self.max),
                )
            })
            .collect()
    }
}

impl LintRule for RequireColumns {
    fn code(&self) -> RuleCode {
        RuleCode::RequireColumns
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let tables = TableFilter::global(schema, exclude);
        let required: Vec<(&str, TableFilter)> = self
            .columns
            .iter()
            .map(|c| (c.name.as_str(), TableFilter::new(schema, &[], &c.exclude)))
            .collect();

        let mut warnings = Vec::new();
        for table in schema.tables.iter().filter(|t| !tables.is_excluded(&t.name)) {
            for (column, skip) in &required {
                if skip.is_excluded(&table.name) || table.find_column_by_name(column).is_ok() {
                    continue;
                }
                warnings.push(Warning::new(
                    self.code(),
                    Target::table(&table.name),
                    format!("column '{}' required.", column),
                ));
            }
        }
        warnings
    }
}
