//! SchemaDoc Catalog
//!
//! Sources that deliver a resolved schema graph: JSON snapshots written by
//! an earlier run, and in-memory extractor output resolved on load.

pub mod adapter;
pub mod snapshot;
pub mod raw;
pub mod dsn;

pub use adapter::{SchemaSource, SourceError};
pub use snapshot::{decode_snapshot, JsonSnapshotSource, SnapshotOrigin};
pub use raw::RawCatalogSource;
pub use dsn::{open_source, open_source_in};
