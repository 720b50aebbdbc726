//! Schema graph model
//!
//! A [`Schema`] owns its tables and its resolved relations. Columns refer
//! back to the relations they take part in through [`RelationId`]s, plain
//! indexes into [`Schema::relations`]. Those back-references are never
//! serialized: a snapshot decoded from JSON must go through
//! [`Schema::repair`] before it is handed to lint, traversal or rendering.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SchemaError};

/// Index of a relation inside [`Schema::relations`]
pub type RelationId = usize;

/// Separator between a qualifier and a local table name (`public.users`)
pub const QUALIFIER_SEPARATOR: char = '.';

/// Kind of table-like object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableType {
    #[default]
    BaseTable,
    View,
    MaterializedView,
    ForeignTable,
    /// Anything a driver reports that has no dedicated variant
    Other(String),
}

impl TableType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::BaseTable => "BASE TABLE",
            Self::View => "VIEW",
            Self::MaterializedView => "MATERIALIZED VIEW",
            Self::ForeignTable => "FOREIGN TABLE",
            Self::Other(other) => other,
        }
    }

    /// Views and materialized views carry a definition that references other tables
    pub fn is_view(&self) -> bool {
        matches!(self, Self::View | Self::MaterializedView)
    }
}

impl From<String> for TableType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BASE TABLE" | "TABLE" => Self::BaseTable,
            "VIEW" => Self::View,
            "MATERIALIZED VIEW" => Self::MaterializedView,
            "FOREIGN TABLE" => Self::ForeignTable,
            _ => Self::Other(value),
        }
    }
}

impl From<TableType> for String {
    fn from(value: TableType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of table constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintType {
    PrimaryKey,
    UniqueKey,
    ForeignKey,
    Check,
    Trigger,
    /// Opaque passthrough of a driver-specific constraint kind
    Other(String),
}

impl ConstraintType {
    /// Map a catalog one-letter code (`p`, `u`, `f`, `c`, `t`)
    pub fn from_code(code: &str) -> Self {
        match code {
            "p" => Self::PrimaryKey,
            "u" => Self::UniqueKey,
            "f" => Self::ForeignKey,
            "c" => Self::Check,
            "t" => Self::Trigger,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::UniqueKey => "UNIQUE",
            Self::ForeignKey => "FOREIGN KEY",
            Self::Check => "CHECK",
            Self::Trigger => "TRIGGER",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ConstraintType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PRIMARY KEY" => Self::PrimaryKey,
            "UNIQUE" => Self::UniqueKey,
            "FOREIGN KEY" => Self::ForeignKey,
            "CHECK" => Self::Check,
            "TRIGGER" => Self::Trigger,
            _ => Self::Other(value),
        }
    }
}

impl From<ConstraintType> for String {
    fn from(value: ConstraintType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form label, conventionally `key:value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Split on the separator when the label has exactly one
    pub fn key_value(&self) -> Option<(&str, &str)> {
        let mut parts = self.name.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => Some((key, value)),
            _ => None,
        }
    }
}

/// Driver-specific metadata used for name resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverMeta {
    /// Qualifier applied to unqualified names in configuration
    #[serde(default)]
    pub current_schema: Option<String>,

    /// Ordered qualifiers to try for unqualified references, most preferred first
    #[serde(default)]
    pub search_paths: Vec<String>,
}

/// Data source driver description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,

    #[serde(default)]
    pub database_version: Option<String>,

    #[serde(default)]
    pub meta: DriverMeta,
}

/// A column of a table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    #[serde(rename = "type", default)]
    pub column_type: String,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub default: Option<String>,

    /// Generated-column expression
    #[serde(default)]
    pub extra_def: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Relations where this column is on the child (referencing) side
    #[serde(skip)]
    pub parent_relations: Vec<RelationId>,

    /// Relations where this column is on the parent (referenced) side
    #[serde(skip)]
    pub child_relations: Vec<RelationId>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            ..Default::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }
}

/// An index on a table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Index {
    pub name: String,

    #[serde(default)]
    pub def: String,

    /// Owning table name
    pub table: String,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_def(mut self, def: impl Into<String>) -> Self {
        self.def = def.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }
}

/// A table constraint as reported by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,

    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,

    #[serde(default)]
    pub def: String,

    /// Owning table name
    pub table: String,

    #[serde(default)]
    pub referenced_table: Option<String>,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub referenced_columns: Option<Vec<String>>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl Constraint {
    pub fn new(
        name: impl Into<String>,
        constraint_type: ConstraintType,
        table: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            constraint_type,
            def: String::new(),
            table: table.into(),
            referenced_table: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_columns: None,
            comment: None,
        }
    }

    pub fn with_def(mut self, def: impl Into<String>) -> Self {
        self.def = def.into();
        self
    }

    pub fn with_reference(mut self, table: impl Into<String>, columns: &[&str]) -> Self {
        self.referenced_table = Some(table.into());
        self.referenced_columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }
}

/// A trigger, owned by its table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,

    #[serde(default)]
    pub def: String,

    #[serde(default)]
    pub comment: Option<String>,
}

impl Trigger {
    pub fn new(name: impl Into<String>, def: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            def: def.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }
}

/// A table-like object (base table, view, materialized view, foreign table)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Qualified, schema-unique name
    pub name: String,

    #[serde(rename = "type", default)]
    pub table_type: TableType,

    #[serde(default)]
    pub comment: Option<String>,

    /// Rendered definition, for views
    #[serde(default)]
    pub def: String,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub indexes: Vec<Index>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub triggers: Vec<Trigger>,

    /// Names of tables a view definition reads from
    #[serde(default)]
    pub referenced_tables: Vec<String>,

    /// Referenced by a view but not part of the introspected table set
    #[serde(default)]
    pub external: bool,

    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Stub for a table known only from a view definition
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: true,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_def(mut self, def: impl Into<String>) -> Self {
        self.def = def.into();
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(Label::new(label));
        self
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }

    /// Find a column by name
    pub fn find_column_by_name(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::column_not_found(&self.name, name))
    }

    /// Mutable variant of [`Table::find_column_by_name`]
    pub fn find_column_by_name_mut(&mut self, name: &str) -> Result<&mut Column> {
        let table = &self.name;
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::column_not_found(table, name))
    }

    /// Unqualified part of the name (`users` for `public.users`)
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }
}

/// A resolved foreign-key edge
///
/// `columns[i]` on `table` references `parent_columns[i]` on `parent_table`.
/// Endpoints are names of entries owned by the [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Child (referencing) table
    pub table: String,

    pub columns: Vec<String>,

    /// Parent (referenced) table
    pub parent_table: String,

    pub parent_columns: Vec<String>,

    /// Original constraint definition
    #[serde(default)]
    pub def: String,
}

impl Relation {
    /// Whether `table` is either endpoint
    pub fn touches(&self, table: &str) -> bool {
        self.table == table || self.parent_table == table
    }

    /// Child and parent column names, positionally paired
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(self.parent_columns.iter())
            .map(|(c, p)| (c.as_str(), p.as_str()))
    }
}

/// Root aggregate: one point-in-time snapshot of a database
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,

    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Stubs for tables referenced by views but not introspected
    #[serde(default)]
    pub external_tables: Vec<Table>,

    #[serde(default)]
    pub driver: Option<Driver>,

    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a table by its qualified name
    pub fn find_table_by_name(&self, name: &str) -> Result<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::table_not_found(name))
    }

    /// Position of a table in [`Schema::tables`]
    pub fn table_position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Current schema reported by the driver, if any
    pub fn current_schema(&self) -> Option<&str> {
        self.driver
            .as_ref()
            .and_then(|d| d.meta.current_schema.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Search path reported by the driver
    pub fn search_paths(&self) -> &[String] {
        self.driver
            .as_ref()
            .map(|d| d.meta.search_paths.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a mix of exact names and glob patterns to table names
    ///
    /// Unqualified entries are also tried under the driver's current schema.
    /// Entries that match nothing, including malformed patterns, are ignored.
    pub fn normalize_table_names<S: AsRef<str>>(&self, patterns: &[S]) -> BTreeSet<String> {
        let mut names = BTreeSet::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let mut candidates = vec![pattern.to_string()];
            if !pattern.contains(QUALIFIER_SEPARATOR) {
                if let Some(current) = self.current_schema() {
                    candidates.push(format!("{}{}{}", current, QUALIFIER_SEPARATOR, pattern));
                }
            }

            if is_glob(pattern) {
                for candidate in &candidates {
                    let compiled = match glob::Pattern::new(candidate) {
                        Ok(compiled) => compiled,
                        Err(e) => {
                            tracing::debug!(pattern = %candidate, error = %e, "ignoring malformed table pattern");
                            continue;
                        }
                    };
                    for table in &self.tables {
                        if compiled.matches(&table.name) {
                            names.insert(table.name.clone());
                        }
                    }
                }
            } else {
                for table in &self.tables {
                    if candidates.iter().any(|c| *c == table.name) {
                        names.insert(table.name.clone());
                    }
                }
            }
        }

        names
    }

    /// Append a relation and wire the column back-references
    ///
    /// Fails with `NotFound` when an endpoint table or column is missing; the
    /// schema is left untouched in that case.
    pub fn install_relation(&mut self, relation: Relation) -> Result<RelationId> {
        let id = self.relations.len();
        let positions = self.table_positions();
        link_relation(&mut self.tables, &positions, id, &relation)?;
        self.relations.push(relation);
        Ok(id)
    }

    /// Rebuild every column back-reference from [`Schema::relations`]
    ///
    /// Used after decoding a snapshot, where back-references are absent.
    pub fn repair(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::Validation(format!(
                    "duplicate table name: {}",
                    table.name
                )));
            }
        }

        for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            column.parent_relations.clear();
            column.child_relations.clear();
        }

        let positions = self.table_positions();
        let Schema { tables, relations, .. } = self;

        for (id, relation) in relations.iter().enumerate() {
            check_arity(relation)?;
            link_relation(tables, &positions, id, relation).map_err(|e| {
                SchemaError::Validation(format!(
                    "relation {} -> {} is dangling: {}",
                    relation.table, relation.parent_table, e
                ))
            })?;
        }

        Ok(())
    }

    /// Check the structural invariants of the graph without changing it
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::Validation(format!(
                    "duplicate table name: {}",
                    table.name
                )));
            }

            let mut columns = HashSet::new();
            for column in &table.columns {
                if !columns.insert(column.name.as_str()) {
                    return Err(SchemaError::Validation(format!(
                        "duplicate column name: {}.{}",
                        table.name, column.name
                    )));
                }
            }

            for index in &table.indexes {
                for column in &index.columns {
                    if !columns.contains(column.as_str()) {
                        return Err(SchemaError::Validation(format!(
                            "index {} lists unknown column: {}.{}",
                            index.name, table.name, column
                        )));
                    }
                }
            }
        }

        for (id, relation) in self.relations.iter().enumerate() {
            check_arity(relation)?;
            let child = self.find_table_by_name(&relation.table)?;
            let parent = self.find_table_by_name(&relation.parent_table)?;
            for (c, p) in relation.column_pairs() {
                if !child.find_column_by_name(c)?.parent_relations.contains(&id) {
                    return Err(SchemaError::Validation(format!(
                        "missing back-reference on {}.{}",
                        child.name, c
                    )));
                }
                if !parent.find_column_by_name(p)?.child_relations.contains(&id) {
                    return Err(SchemaError::Validation(format!(
                        "missing back-reference on {}.{}",
                        parent.name, p
                    )));
                }
            }
        }

        Ok(())
    }

    /// Stable SHA-256 digest of the serialized snapshot
    pub fn fingerprint(&self) -> std::result::Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    fn table_positions(&self) -> HashMap<String, usize> {
        self.tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect()
    }
}

/// Unqualified part of a possibly qualified table name
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(QUALIFIER_SEPARATOR)
        .map(|(_, local)| local)
        .unwrap_or(name)
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn check_arity(relation: &Relation) -> Result<()> {
    if relation.columns.is_empty() || relation.columns.len() != relation.parent_columns.len() {
        return Err(SchemaError::Validation(format!(
            "relation {} -> {} pairs {} columns with {} parent columns",
            relation.table,
            relation.parent_table,
            relation.columns.len(),
            relation.parent_columns.len()
        )));
    }
    Ok(())
}

/// Table position and column positions of one side of a relation
struct Endpoint {
    table: usize,
    columns: Vec<usize>,
}

fn locate_endpoint(
    tables: &[Table],
    positions: &HashMap<String, usize>,
    table_name: &str,
    column_names: &[String],
) -> Result<Endpoint> {
    let table = *positions
        .get(table_name)
        .ok_or_else(|| SchemaError::table_not_found(table_name))?;

    let mut columns = Vec::with_capacity(column_names.len());
    for name in column_names {
        let column = tables[table]
            .columns
            .iter()
            .position(|c| c.name == *name)
            .ok_or_else(|| SchemaError::column_not_found(table_name, name))?;
        columns.push(column);
    }

    Ok(Endpoint { table, columns })
}

/// Wire `id` into the back-references of both sides of `relation`
///
/// Every lookup happens before the first push, so a failure leaves no partial links.
fn link_relation(
    tables: &mut [Table],
    positions: &HashMap<String, usize>,
    id: RelationId,
    relation: &Relation,
) -> Result<()> {
    let child = locate_endpoint(tables, positions, &relation.table, &relation.columns)?;
    let parent = locate_endpoint(tables, positions, &relation.parent_table, &relation.parent_columns)?;

    for column in child.columns {
        let refs = &mut tables[child.table].columns[column].parent_relations;
        if !refs.contains(&id) {
            refs.push(id);
        }
    }
    for column in parent.columns {
        let refs = &mut tables[parent.table].columns[column].child_relations;
        if !refs.contains(&id) {
            refs.push(id);
        }
    }

    Ok(())
}
