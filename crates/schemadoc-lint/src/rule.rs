//! Rule abstraction and the fixed rule set

use schemadoc_core::config::{
    ColumnCount, DuplicateRelations, LabelStyle, LintConfig, RequireColumns,
    RequireForeignKeyIndex, RequireMemberComment, RequireTableComment, UnrelatedTable,
};
use schemadoc_core::{RuleCode, Schema, Warning};

use crate::comment::{Member, MemberComment};

/// A lint rule
///
/// `check` returns an empty list without looking at the schema when the
/// rule is disabled. `exclude` is the global table exclude list.
pub trait LintRule {
    fn code(&self) -> RuleCode;

    fn is_enabled(&self) -> bool;

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning>;
}

/// One built-in rule with its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    RequireTableComment(RequireTableComment),
    RequireColumnComment(RequireMemberComment),
    RequireIndexComment(RequireMemberComment),
    RequireConstraintComment(RequireMemberComment),
    RequireTriggerComment(RequireMemberComment),
    UnrelatedTable(UnrelatedTable),
    ColumnCount(ColumnCount),
    RequireColumns(RequireColumns),
    DuplicateRelations(DuplicateRelations),
    RequireForeignKeyIndex(RequireForeignKeyIndex),
    LabelStyle(LabelStyle),
}

impl Rule {
    /// Every built-in rule, in execution order
    pub fn from_config(config: &LintConfig) -> Vec<Rule> {
        vec![
            Rule::RequireTableComment(config.require_table_comment.clone()),
            Rule::RequireColumnComment(config.require_column_comment.clone()),
            Rule::RequireIndexComment(config.require_index_comment.clone()),
            Rule::RequireConstraintComment(config.require_constraint_comment.clone()),
            Rule::RequireTriggerComment(config.require_trigger_comment.clone()),
            Rule::UnrelatedTable(config.unrelated_table.clone()),
            Rule::ColumnCount(config.column_count.clone()),
            Rule::RequireColumns(config.require_columns.clone()),
            Rule::DuplicateRelations(config.duplicate_relations.clone()),
            Rule::RequireForeignKeyIndex(config.require_foreign_key_index.clone()),
            Rule::LabelStyle(config.label_style.clone()),
        ]
    }
}

impl LintRule for Rule {
    fn code(&self) -> RuleCode {
        match self {
            Rule::RequireTableComment(_) => RuleCode::RequireTableComment,
            Rule::RequireColumnComment(_) => RuleCode::RequireColumnComment,
            Rule::RequireIndexComment(_) => RuleCode::RequireIndexComment,
            Rule::RequireConstraintComment(_) => RuleCode::RequireConstraintComment,
            Rule::RequireTriggerComment(_) => RuleCode::RequireTriggerComment,
            Rule::UnrelatedTable(_) => RuleCode::UnrelatedTable,
            Rule::ColumnCount(_) => RuleCode::ColumnCount,
            Rule::RequireColumns(_) => RuleCode::RequireColumns,
            Rule::DuplicateRelations(_) => RuleCode::DuplicateRelations,
            Rule::RequireForeignKeyIndex(_) => RuleCode::RequireForeignKeyIndex,
            Rule::LabelStyle(_) => RuleCode::LabelStyle,
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Rule::RequireTableComment(r) => r.enabled,
            Rule::RequireColumnComment(r)
            | Rule::RequireIndexComment(r)
            | Rule::RequireConstraintComment(r)
            | Rule::RequireTriggerComment(r) => r.enabled,
            Rule::UnrelatedTable(r) => r.enabled,
            Rule::ColumnCount(r) => r.enabled,
            Rule::RequireColumns(r) => r.enabled,
            Rule::DuplicateRelations(r) => r.enabled,
            Rule::RequireForeignKeyIndex(r) => r.enabled,
            Rule::LabelStyle(r) => r.enabled,
        }
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }
        match self {
            Rule::RequireTableComment(r) => r.check(schema, exclude),
            Rule::RequireColumnComment(r) => MemberComment::new(Member::Column, r).check(schema, exclude),
            Rule::RequireIndexComment(r) => MemberComment::new(Member::Index, r).check(schema, exclude),
            Rule::RequireConstraintComment(r) => {
                MemberComment::new(Member::Constraint, r).check(schema, exclude)
            }
            Rule::RequireTriggerComment(r) => MemberComment::new(Member::Trigger, r).check(schema, exclude),
            Rule::UnrelatedTable(r) => r.check(schema, exclude),
            Rule::ColumnCount(r) => r.check(schema, exclude),
            Rule::RequireColumns(r) => r.check(schema, exclude),
            Rule::DuplicateRelations(r) => r.check(schema, exclude),
            Rule::RequireForeignKeyIndex(r) => r.check(schema, exclude),
            Rule::LabelStyle(r) => r.check(schema, exclude),
        }
    }
}
