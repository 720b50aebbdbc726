//! Schema source trait for loading a resolved schema graph

use schemadoc_core::{Schema, SchemaError};

/// Errors that can occur when loading a schema
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The loaded data does not form a consistent schema graph
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Unsupported data source: {0}")]
    Unsupported(String),
}

/// Trait for data sources that deliver one point-in-time schema snapshot
///
/// Whatever the source, the returned schema is fully cross-referenced:
/// every relation endpoint resolves and every back-reference is in place.
#[async_trait::async_trait]
pub trait SchemaSource: Send + Sync {
    /// Get the source name (e.g., "json", "raw")
    fn name(&self) -> &'static str;

    /// Extract and resolve the schema
    async fn load(&self) -> Result<Schema, SourceError>;

    /// Test that the source is reachable
    ///
    /// Useful for validating a DSN before attempting a full load.
    async fn test_connection(&self) -> Result<(), SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_pass_through() {
        let err = SourceError::from(SchemaError::table_not_found("users"));
        assert_eq!(err.to_string(), "table not found: users");
        assert!(matches!(err, SourceError::Schema(SchemaError::NotFound { .. })));
    }
}
