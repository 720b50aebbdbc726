//! SchemaDoc lint engine
//!
//! A fixed, ordered set of structural rules evaluated against a resolved
//! schema graph:
//! - Comment coverage for tables, columns, indexes, constraints and triggers
//! - Isolated tables, column counts and required columns
//! - Duplicate relations and unindexed foreign keys
//! - Label style

pub mod exclude;
pub mod rule;
pub mod comment;
pub mod table;
pub mod relation;
pub mod label;
pub mod linter;

pub use rule::{LintRule, Rule};
pub use comment::{Member, MemberComment};
pub use label::is_key_value_style;
pub use linter::Linter;
