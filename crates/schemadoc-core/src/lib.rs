//! SchemaDoc Core
//!
//! Schema graph model, error taxonomy and the stable lint report types.
//! Never rename rule codes - they are part of the report format.

pub mod error;
pub mod schema;
pub mod target;
pub mod warning;
pub mod report;
pub mod config;

pub use error::{EntityKind, Result, SchemaError};
pub use schema::{
    local_name, Column, Constraint, ConstraintType, Driver, DriverMeta, Index, Label, Relation,
    RelationId, Schema, Table, TableType, Trigger, QUALIFIER_SEPARATOR,
};
pub use target::{Target, TargetKind};
pub use warning::{RuleCode, Warning};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, Dsn, ErConfig, LintConfig};
