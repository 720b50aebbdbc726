//! SchemaDoc Graph
//!
//! Builds the cross-referenced schema graph from extractor output and
//! answers neighborhood queries over it.

pub mod fk;
pub mod views;
pub mod resolver;
pub mod closure;

pub use fk::ForeignKeyDef;
pub use views::referenced_table_names;
pub use resolver::{
    detect_full_table_name, foreign_keys_from_constraints, normalize_search_paths, resolve,
    RawCatalog, RawForeignKey,
};
pub use closure::{RelationGraph, TableClosure};
