//! Configuration schema (schemadoc.toml)

use serde::{Deserialize, Serialize};

/// Data source connection string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dsn(pub String);

/// Entity-relationship view settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErConfig {
    /// Hop distance used for per-table closure views
    #[serde(default = "default_distance")]
    pub distance: usize,

    /// Render comments in diagrams
    #[serde(default)]
    pub comment: bool,
}

fn default_distance() -> usize {
    2
}

impl Default for ErConfig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            comment: false,
        }
    }
}

/// Table comments are required
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireTableComment {
    pub enabled: bool,
    pub all_or_nothing: bool,
    /// Table names or patterns
    pub exclude: Vec<String>,
}

/// Comments are required on a sub-table entity (column, index, constraint, trigger)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireMemberComment {
    pub enabled: bool,
    pub all_or_nothing: bool,
    /// Entity names, `table.entity` names or patterns
    pub exclude: Vec<String>,
    /// Table names or patterns
    pub exclude_tables: Vec<String>,
}

/// Tables must take part in at least one relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrelatedTable {
    pub enabled: bool,
    pub all_or_nothing: bool,
    pub exclude: Vec<String>,
}

/// Upper bound on the number of columns per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnCount {
    pub enabled: bool,
    pub max: usize,
    pub exclude: Vec<String>,
}

/// A column every table must have
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredColumn {
    pub name: String,
    /// Tables exempt from this column
    pub exclude: Vec<String>,
}

/// Tables must have the configured columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireColumns {
    pub enabled: bool,
    pub columns: Vec<RequiredColumn>,
}

/// The same relation must not be declared twice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateRelations {
    pub enabled: bool,
}

/// Foreign key columns must appear in some index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireForeignKeyIndex {
    pub enabled: bool,
    /// Column names or `table.column` names
    pub exclude: Vec<String>,
}

/// Labels must follow the `key:value` style
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub enabled: bool,
    pub exclude: Vec<String>,
}

/// Lint rule settings, one section per built-in rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub require_table_comment: RequireTableComment,
    pub require_column_comment: RequireMemberComment,
    pub require_index_comment: RequireMemberComment,
    pub require_constraint_comment: RequireMemberComment,
    pub require_trigger_comment: RequireMemberComment,
    pub unrelated_table: UnrelatedTable,
    pub column_count: ColumnCount,
    pub require_columns: RequireColumns,
    pub duplicate_relations: DuplicateRelations,
    pub require_foreign_key_index: RequireForeignKeyIndex,
    pub label_style: LabelStyle,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data source (`json://path/to/schema.json`, `schema.json`, inline JSON)
    #[serde(default)]
    pub dsn: Option<Dsn>,

    /// Tables excluded from every lint rule
    #[serde(default)]
    pub lint_exclude: Vec<String>,

    /// Diagram settings
    #[serde(default)]
    pub er: ErConfig,

    /// Lint rules
    #[serde(default)]
    pub lint: LintConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: std::path::PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsn: None,
            lint_exclude: Vec::new(),
            er: ErConfig::default(),
            lint: LintConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Replace the configured DSN, e.g. from the environment
    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(Dsn(dsn.into()));
        self
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.er.distance, 2);
        assert!(!config.lint.require_table_comment.enabled);
        assert!(config.dsn.is_none());
    }

    #[test]
    fn parse_rule_sections() {
        let config = Config::from_toml(
            r#"
dsn = "json://testdata/shop.json"
lint_exclude = ["public.schema_migrations"]

[er]
distance = 1

[lint.require_table_comment]
enabled = true
all_or_nothing = true
exclude = ["tmp_*"]

[lint.require_column_comment]
enabled = true
exclude = ["id", "users.created_at"]
exclude_tables = ["logs"]

[lint.column_count]
enabled = true
max = 20

[lint.require_columns]
enabled = true
columns = [{ name = "created_at", exclude = ["logs"] }]
"#,
        )
        .unwrap();

        assert_eq!(config.dsn, Some(Dsn("json://testdata/shop.json".to_string())));
        assert_eq!(config.er.distance, 1);
        assert!(config.lint.require_table_comment.all_or_nothing);
        assert_eq!(config.lint.require_column_comment.exclude_tables, vec!["logs"]);
        assert_eq!(config.lint.column_count.max, 20);
        assert_eq!(config.lint.require_columns.columns[0].name, "created_at");
        assert!(!config.lint.duplicate_relations.enabled);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::from_toml("lint = 3").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemadoc.toml");

        let mut config = Config::default().with_dsn("json://schema.json");
        config.lint.duplicate_relations.enabled = true;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.dsn, config.dsn);
        assert_eq!(loaded.lint, config.lint);
        assert_eq!(loaded.project_root, dir.path());
    }
}
