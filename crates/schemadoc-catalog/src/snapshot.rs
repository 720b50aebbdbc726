//! JSON snapshot source
//!
//! A snapshot is a serialized [`Schema`]. Back-references are not part of
//! the serialized form, so every decoded snapshot is repaired before use.

use std::path::PathBuf;

use schemadoc_core::Schema;

use crate::adapter::{SchemaSource, SourceError};

/// Where the snapshot JSON comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    File(PathBuf),
    Inline(String),
}

/// Loads a schema from a JSON snapshot
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    origin: SnapshotOrigin,
}

impl JsonSnapshotSource {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SnapshotOrigin::File(path.into()),
        }
    }

    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            origin: SnapshotOrigin::Inline(json.into()),
        }
    }

    pub fn origin(&self) -> &SnapshotOrigin {
        &self.origin
    }

    async fn read(&self) -> Result<String, SourceError> {
        match &self.origin {
            SnapshotOrigin::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            SnapshotOrigin::Inline(json) => Ok(json.clone()),
        }
    }
}

/// Decode a snapshot and restore its back-references
pub fn decode_snapshot(json: &str) -> Result<Schema, SourceError> {
    let mut schema: Schema = serde_json::from_str(json)?;
    schema.repair().map_err(|e| {
        tracing::error!(schema = %schema.name, error = %e, "snapshot failed repair");
        e
    })?;
    Ok(schema)
}

#[async_trait::async_trait]
impl SchemaSource for JsonSnapshotSource {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn load(&self) -> Result<Schema, SourceError> {
        let json = self.read().await?;
        let schema = decode_snapshot(&json)?;
        tracing::debug!(
            schema = %schema.name,
            tables = schema.tables.len(),
            relations = schema.relations.len(),
            "loaded snapshot"
        );
        Ok(schema)
    }

    async fn test_connection(&self) -> Result<(), SourceError> {
        match &self.origin {
            SnapshotOrigin::File(path) => {
                tokio::fs::metadata(path).await?;
                Ok(())
            }
            SnapshotOrigin::Inline(_) => Ok(()),
        }
    }
}
