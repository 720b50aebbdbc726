//! Foreign key rules

use std::collections::HashSet;

use schemadoc_core::config::{DuplicateRelations, RequireForeignKeyIndex};
use schemadoc_core::{ConstraintType, RuleCode, Schema, Target, TargetKind, Warning};

use crate::exclude::{MemberFilter, TableFilter};
use crate::rule::LintRule;

/// Child table, parent table, sorted child columns, sorted parent columns
type RelationKey<'a> = (&'a str, &'a str, Vec<&'a str>, Vec<&'a str>);

impl LintRule for DuplicateRelations {
    fn code(&self) -> RuleCode {
        RuleCode::DuplicateRelations
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The first relation with a given key is accepted, every later one is reported
    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let filter = TableFilter::global(schema, exclude);
        let mut seen: HashSet<RelationKey<'_>> = HashSet::new();
        let mut warnings = Vec::new();

        for relation in &schema.relations {
            if filter.is_excluded(&relation.table) || filter.is_excluded(&relation.parent_table) {
                continue;
            }

            let mut columns: Vec<&str> = relation.columns.iter().map(String::as_str).collect();
            columns.sort_unstable();
            let mut parent_columns: Vec<&str> = relation.parent_columns.iter().map(String::as_str).collect();
            parent_columns.sort_unstable();

            let key = (
                relation.table.as_str(),
                relation.parent_table.as_str(),
                columns,
                parent_columns,
            );
            if !seen.insert(key) {
                warnings.push(Warning::new(
                    self.code(),
                    Target::table(&relation.table),
                    format!("duplicate relations. [{} -> {}]", relation.table, relation.parent_table),
                ));
            }
        }

        warnings
    }
}

impl LintRule for RequireForeignKeyIndex {
    fn code(&self) -> RuleCode {
        RuleCode::RequireForeignKeyIndex
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A column counts as indexed when any index of its table lists it, at any position
    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let tables = TableFilter::global(schema, exclude);
        let columns = MemberFilter::new(schema, TargetKind::Column, &self.exclude);
        let mut warnings = Vec::new();

        for table in schema.tables.iter().filter(|t| !tables.is_excluded(&t.name)) {
            let foreign_keys = table
                .constraints
                .iter()
                .filter(|c| c.constraint_type == ConstraintType::ForeignKey);

            for constraint in foreign_keys {
                for column in &constraint.columns {
                    let target = Target::column(&table.name, column);
                    if columns.is_excluded(&target) {
                        continue;
                    }
                    let indexed = table.indexes.iter().any(|i| i.columns.contains(column));
                    if !indexed {
                        warnings.push(Warning::new(
                            self.code(),
                            target,
                            format!("foreign key columns do not have an index. [{}]", table.name),
                        ));
                    }
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadoc_core::{Column, Constraint, Index, Relation, Table};

    fn schema() -> Schema {
        let mut schema = Schema::new("app");
        schema.tables = vec![
            Table::new("A")
                .with_column(Column::new("x", "int"))
                .with_column(Column::new("z", "int")),
            Table::new("B")
                .with_column(Column::new("y", "int"))
                .with_column(Column::new("w", "int")),
        ];
        schema
    }

    fn relation(columns: &[&str], parent_columns: &[&str]) -> Relation {
        Relation {
            table: "A".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            parent_table: "B".to_string(),
            parent_columns: parent_columns.iter().map(|c| c.to_string()).collect(),
            def: String::new(),
        }
    }

    #[test]
    fn second_identical_relation_is_reported() {
        let mut schema = schema();
        schema.install_relation(relation(&["x"], &["y"])).unwrap();
        schema.install_relation(relation(&["x"], &["y"])).unwrap();

        let warnings = DuplicateRelations { enabled: true }.check(&schema, &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].target, Target::table("A"));
        assert_eq!(warnings[0].message, "duplicate relations. [A -> B]");
    }

    #[test]
    fn column_order_does_not_matter() {
        let mut schema = schema();
        schema.install_relation(relation(&["x", "z"], &["y", "w"])).unwrap();
        schema.install_relation(relation(&["z", "x"], &["w", "y"])).unwrap();
        schema.install_relation(relation(&["z"], &["w"])).unwrap();

        let warnings = DuplicateRelations { enabled: true }.check(&schema, &[]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn excluded_endpoint_skips_relation() {
        let mut schema = schema();
        schema.install_relation(relation(&["x"], &["y"])).unwrap();
        schema.install_relation(relation(&["x"], &["y"])).unwrap();

        let exclude = vec!["B".to_string()];
        assert!(DuplicateRelations { enabled: true }.check(&schema, &exclude).is_empty());
    }

    #[test]
    fn foreign_key_index_any_position() {
        let mut schema = schema();
        schema.tables[0].constraints.push(
            Constraint::new("a_fk", ConstraintType::ForeignKey, "A", &["x", "z"])
                .with_reference("B", &["y", "w"]),
        );
        schema.tables[0].indexes.push(Index::new("a_idx", "A", &["z", "x"]));

        let rule = RequireForeignKeyIndex {
            enabled: true,
            exclude: Vec::new(),
        };
        assert!(rule.check(&schema, &[]).is_empty());

        schema.tables[0].indexes.clear();
        let warnings = rule.check(&schema, &[]);
        let targets: Vec<String> = warnings.iter().map(|w| w.target.to_string()).collect();
        assert_eq!(targets, vec!["A.x", "A.z"]);
        assert_eq!(warnings[0].message, "foreign key columns do not have an index. [A]");

        let rule = RequireForeignKeyIndex {
            enabled: true,
            exclude: vec!["A.x".to_string(), "z".to_string()],
        };
        assert!(rule.check(&schema, &[]).is_empty());
    }
}
