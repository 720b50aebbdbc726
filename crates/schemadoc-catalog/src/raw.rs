//! In-memory extractor output source
//!
//! Holds a [`RawCatalog`] the way a driver would deliver it and resolves
//! relations on every load. Useful for:
//! - Testing relation resolution without a database
//! - Simulating connection failures and slow extractors
//!
//! ```rust,ignore
//! let source = RawCatalogSource::new(catalog).with_latency(50);
//! let schema = source.load().await?;
//! ```

use std::sync::Arc;

use schemadoc_core::{Label, Schema, Table};
use schemadoc_graph::{resolve, RawCatalog, RawForeignKey};
use tokio::sync::RwLock;

use crate::adapter::{SchemaSource, SourceError};

/// Schema source backed by extractor output held in memory
///
/// Clones share the same catalog, so tables added through one handle are
/// visible to the others.
pub struct RawCatalogSource {
    catalog: Arc<RwLock<RawCatalog>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulated extraction latency (milliseconds)
    latency_ms: u64,

    source_name: &'static str,
}

impl RawCatalogSource {
    pub fn new(catalog: RawCatalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            fail_connection: false,
            latency_ms: 0,
            source_name: "raw",
        }
    }

    /// Empty catalog named `name`
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(RawCatalog {
            name: name.into(),
            ..Default::default()
        })
    }

    /// Fail every load and connection test
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom source name, e.g. to stand in for a specific driver
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.source_name = name;
        self
    }

    pub async fn add_table(&self, table: Table) {
        self.catalog.write().await.tables.push(table);
    }

    pub async fn add_foreign_key(&self, table: impl Into<String>, def: impl Into<String>) {
        self.catalog
            .write()
            .await
            .foreign_keys
            .push(RawForeignKey::new(table, def));
    }

    pub async fn add_label(&self, label: impl Into<String>) {
        self.catalog.write().await.labels.push(Label::new(label));
    }

    pub async fn table_count(&self) -> usize {
        self.catalog.read().await.tables.len()
    }

    /// Copy of the current extractor output
    pub async fn snapshot(&self) -> RawCatalog {
        self.catalog.read().await.clone()
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    fn check_connection(&self) -> Result<(), SourceError> {
        if self.fail_connection {
            Err(SourceError::Connection(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Clone for RawCatalogSource {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            source_name: self.source_name,
        }
    }
}

#[async_trait::async_trait]
impl SchemaSource for RawCatalogSource {
    fn name(&self) -> &'static str {
        self.source_name
    }

    async fn load(&self) -> Result<Schema, SourceError> {
        self.simulate_latency().await;
        self.check_connection()?;

        let catalog = self.snapshot().await;
        tracing::debug!(
            source = self.source_name,
            tables = catalog.tables.len(),
            foreign_keys = catalog.foreign_keys.len(),
            "resolving catalog"
        );
        Ok(resolve(catalog)?)
    }

    async fn test_connection(&self) -> Result<(), SourceError> {
        self.simulate_latency().await;
        self.check_connection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadoc_core::{Column, SchemaError};

    fn users_and_posts() -> RawCatalogSource {
        RawCatalogSource::new(
            RawCatalog::from_tables(
                "app",
                vec![
                    Table::new("users").with_column(Column::new("id", "int")),
                    Table::new("posts")
                        .with_column(Column::new("id", "int"))
                        .with_column(Column::new("user_id", "int")),
                ],
            )
            .with_foreign_key("posts", "FOREIGN KEY (user_id) REFERENCES users(id)"),
        )
    }

    #[tokio::test]
    async fn load_resolves_relations() {
        let schema = users_and_posts().load().await.unwrap();
        assert_eq!(schema.relations.len(), 1);
        assert_eq!(schema.relations[0].parent_table, "users");
        assert!(schema.validate().is_ok());
    }

    #[tokio::test]
    async fn connection_failure() {
        let source = users_and_posts().with_connection_failure();
        assert!(matches!(source.test_connection().await, Err(SourceError::Connection(_))));
        assert!(matches!(source.load().await, Err(SourceError::Connection(_))));
    }

    #[tokio::test]
    async fn clones_share_catalog() {
        let source = RawCatalogSource::empty("app");
        let other = source.clone();

        other.add_table(Table::new("users")).await;
        assert_eq!(source.table_count().await, 1);
    }

    #[tokio::test]
    async fn broken_foreign_key_aborts_load() {
        let source = users_and_posts();
        source.add_foreign_key("posts", "FOREIGN KEY (author_id) REFERENCES users(id)").await;

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, SourceError::Schema(SchemaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn latency_is_simulated() {
        let source = users_and_posts().with_latency(20);
        let start = std::time::Instant::now();
        source.test_connection().await.unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(20));
    }

    #[tokio::test]
    async fn custom_name() {
        assert_eq!(users_and_posts().name(), "raw");
        assert_eq!(users_and_posts().with_name("postgres").name(), "postgres");
    }
}
