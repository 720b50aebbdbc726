//! Lint rule codes and warnings
//!
//! Rule codes double as the configuration keys of the rules. They are part
//! of the report format: never rename or remove one, only add new ones.

use serde::{Deserialize, Serialize};

use crate::target::Target;

/// Stable identifier of a built-in lint rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    RequireTableComment,
    RequireColumnComment,
    RequireIndexComment,
    RequireConstraintComment,
    RequireTriggerComment,
    UnrelatedTable,
    ColumnCount,
    RequireColumns,
    DuplicateRelations,
    RequireForeignKeyIndex,
    LabelStyle,
}

impl RuleCode {
    /// Every rule, in execution order
    pub const ALL: [RuleCode; 11] = [
        Self::RequireTableComment,
        Self::RequireColumnComment,
        Self::RequireIndexComment,
        Self::RequireConstraintComment,
        Self::RequireTriggerComment,
        Self::UnrelatedTable,
        Self::ColumnCount,
        Self::RequireColumns,
        Self::DuplicateRelations,
        Self::RequireForeignKeyIndex,
        Self::LabelStyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireTableComment => "require_table_comment",
            Self::RequireColumnComment => "require_column_comment",
            Self::RequireIndexComment => "require_index_comment",
            Self::RequireConstraintComment => "require_constraint_comment",
            Self::RequireTriggerComment => "require_trigger_comment",
            Self::UnrelatedTable => "unrelated_table",
            Self::ColumnCount => "column_count",
            Self::RequireColumns => "require_columns",
            Self::DuplicateRelations => "duplicate_relations",
            Self::RequireForeignKeyIndex => "require_foreign_key_index",
            Self::LabelStyle => "label_style",
        }
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding of a lint rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Rule that produced the warning
    pub rule: RuleCode,

    /// Entity the warning is about
    pub target: Target,

    /// Human-readable message
    pub message: String,
}

impl Warning {
    pub fn new(rule: RuleCode, target: Target, message: impl Into<String>) -> Self {
        Self {
            rule,
            target,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.target, self.message)
    }
}
