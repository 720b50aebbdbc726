//! Relation resolution
//!
//! Turns the flat output of an extractor (tables plus raw foreign key
//! definitions) into a cross-referenced [`Schema`]. Any broken reference
//! aborts the whole pass: a partially linked graph is never returned.

use std::collections::HashSet;

use schemadoc_core::{
    ConstraintType, Driver, Label, Relation, Result, Schema, SchemaError, Table,
    QUALIFIER_SEPARATOR,
};

use crate::fk::ForeignKeyDef;
use crate::views::referenced_table_names;

/// A foreign key as reported by an extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForeignKey {
    /// Owning (child) table, qualified
    pub table: String,

    /// Rendered constraint definition
    pub def: String,
}

impl RawForeignKey {
    pub fn new(table: impl Into<String>, def: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            def: def.into(),
        }
    }
}

/// Everything an extractor delivers for one pass
#[derive(Debug, Clone, Default)]
pub struct RawCatalog {
    pub name: String,
    pub driver: Option<Driver>,
    pub labels: Vec<Label>,
    pub tables: Vec<Table>,
    /// Foreign keys in discovery order
    pub foreign_keys: Vec<RawForeignKey>,
    /// Qualifiers tried for unqualified references, most preferred first.
    /// Falls back to the driver's search path when empty.
    pub search_paths: Vec<String>,
}

impl RawCatalog {
    /// Catalog whose foreign keys are taken from the tables' own constraints
    pub fn from_tables(name: impl Into<String>, tables: Vec<Table>) -> Self {
        let foreign_keys = foreign_keys_from_constraints(&tables);
        Self {
            name: name.into(),
            tables,
            foreign_keys,
            ..Default::default()
        }
    }

    pub fn with_search_paths<S: AsRef<str>>(mut self, search_paths: &[S]) -> Self {
        self.search_paths = search_paths.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_foreign_key(mut self, table: impl Into<String>, def: impl Into<String>) -> Self {
        self.foreign_keys.push(RawForeignKey::new(table, def));
        self
    }
}

/// Foreign key constraints of `tables`, table by table in declaration order
pub fn foreign_keys_from_constraints(tables: &[Table]) -> Vec<RawForeignKey> {
    tables
        .iter()
        .flat_map(|table| {
            table
                .constraints
                .iter()
                .filter(|c| c.constraint_type == ConstraintType::ForeignKey)
                .map(move |c| RawForeignKey::new(&table.name, &c.def))
        })
        .collect()
}

/// Build the cross-referenced schema graph
///
/// Relations are installed in the order of `catalog.foreign_keys`. View
/// definitions are then scanned for the tables they read.
pub fn resolve(catalog: RawCatalog) -> Result<Schema> {
    let RawCatalog {
        name,
        driver,
        labels,
        tables,
        foreign_keys,
        search_paths,
    } = catalog;

    let requested = if search_paths.is_empty() {
        driver
            .as_ref()
            .map(|d| d.meta.search_paths.clone())
            .unwrap_or_default()
    } else {
        search_paths
    };
    let search_paths = normalize_search_paths(&requested);

    let mut driver = driver.unwrap_or_default();
    driver.meta.search_paths = search_paths.clone();

    let mut schema = Schema::new(name);
    schema.tables = tables;
    schema.labels = labels;
    schema.driver = Some(driver);

    let mut seen = HashSet::new();
    for table in &schema.tables {
        if !seen.insert(table.name.as_str()) {
            return Err(SchemaError::Validation(format!(
                "duplicate table name: {}",
                table.name
            )));
        }
    }

    tracing::debug!(
        schema = %schema.name,
        tables = schema.tables.len(),
        foreign_keys = foreign_keys.len(),
        "resolving relations"
    );

    for foreign_key in &foreign_keys {
        let relation = resolve_relation(&schema, &search_paths, foreign_key).map_err(|e| {
            tracing::error!(table = %foreign_key.table, def = %foreign_key.def, error = %e, "relation resolution failed");
            e
        })?;
        schema.install_relation(relation)?;
    }

    resolve_view_references(&mut schema, &search_paths);

    tracing::debug!(
        relations = schema.relations.len(),
        external_tables = schema.external_tables.len(),
        "schema resolved"
    );

    Ok(schema)
}

fn resolve_relation(
    schema: &Schema,
    search_paths: &[String],
    foreign_key: &RawForeignKey,
) -> Result<Relation> {
    let parsed = ForeignKeyDef::parse(&foreign_key.def)?;

    let child = schema.find_table_by_name(&foreign_key.table)?;
    for column in &parsed.columns {
        child.find_column_by_name(column)?;
    }

    let parent_name = detect_full_table_name(
        &parsed.parent_table,
        search_paths,
        schema.tables.iter().map(|t| t.name.as_str()),
    )?;
    let parent = schema.find_table_by_name(&parent_name)?;
    for column in &parsed.parent_columns {
        parent.find_column_by_name(column)?;
    }

    Ok(Relation {
        table: child.name.clone(),
        columns: parsed.columns,
        parent_table: parent.name.clone(),
        parent_columns: parsed.parent_columns,
        def: foreign_key.def.clone(),
    })
}

/// Qualify a referenced table name
///
/// A name that already carries a qualifier is returned as is. Otherwise
/// exactly one known table must be named `<path>.<name>` for some search
/// path entry, or be named `<name>` itself. Zero or several candidates are
/// reported as `AmbiguousReference`.
pub fn detect_full_table_name<'a, I>(name: &str, search_paths: &[String], full_names: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if name.contains(QUALIFIER_SEPARATOR) {
        return Ok(name.to_string());
    }

    let candidates: Vec<String> = full_names
        .into_iter()
        .filter(|full| {
            *full == name
                || search_paths.iter().any(|path| {
                    full.len() == path.len() + 1 + name.len()
                        && full.starts_with(path.as_str())
                        && full.ends_with(name)
                        && full[path.len()..].starts_with(QUALIFIER_SEPARATOR)
                })
        })
        .map(str::to_string)
        .collect();

    match candidates.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(SchemaError::AmbiguousReference {
            name: name.to_string(),
            candidates,
        }),
    }
}

/// Trim whitespace and double quotes from search path entries and drop duplicates
pub fn normalize_search_paths<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|p| p.as_ref().trim().trim_matches('"').trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}

/// Fill `referenced_tables` of every view
///
/// Names that do not resolve to a known table become external stubs.
fn resolve_view_references(schema: &mut Schema, search_paths: &[String]) {
    let known: Vec<String> = schema.tables.iter().map(|t| t.name.clone()).collect();

    for position in 0..schema.tables.len() {
        if !schema.tables[position].table_type.is_view() {
            continue;
        }

        let mut referenced = Vec::new();
        for name in referenced_table_names(&schema.tables[position].def) {
            let resolved = if known.contains(&name) {
                name
            } else {
                match detect_full_table_name(&name, search_paths, known.iter().map(String::as_str)) {
                    Ok(full) if known.contains(&full) => full,
                    _ => {
                        tracing::warn!(
                            view = %schema.tables[position].name,
                            table = %name,
                            "view references a table outside the schema"
                        );
                        if !schema.external_tables.iter().any(|t| t.name == name) {
                            schema.external_tables.push(Table::external(&name));
                        }
                        name
                    }
                }
            };
            if !referenced.contains(&resolved) {
                referenced.push(resolved);
            }
        }

        schema.tables[position].referenced_tables = referenced;
    }
}
