//! Exclusion lists
//!
//! Table exclusions go through [`Schema::normalize_table_names`], so they
//! accept exact names, names relative to the current schema and glob
//! patterns. Entries that match nothing are ignored.

use std::collections::{BTreeSet, HashSet};

use schemadoc_core::{Schema, Target, TargetKind};

/// Tables skipped by a rule: its own exclude list plus the global one
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    excluded: BTreeSet<String>,
}

impl TableFilter {
    pub fn new(schema: &Schema, global: &[String], local: &[String]) -> Self {
        let mut excluded = schema.normalize_table_names(global);
        excluded.extend(schema.normalize_table_names(local));
        Self { excluded }
    }

    /// Global exclusions only
    pub fn global(schema: &Schema, global: &[String]) -> Self {
        Self::new(schema, global, &[])
    }

    pub fn is_excluded(&self, table: &str) -> bool {
        self.excluded.contains(table)
    }
}

/// Sub-table entities skipped by a rule
///
/// An entry is either a bare entity name, excluded on every table, or a
/// `table.entity` name whose table part is matched against the known tables.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    names: HashSet<String>,
    targets: Vec<Target>,
}

impl MemberFilter {
    pub fn new(schema: &Schema, kind: TargetKind, entries: &[String]) -> Self {
        let owners = schema.table_names();
        let mut names = HashSet::new();
        let mut targets = Vec::new();

        for entry in entries {
            match Target::parse_qualified(kind, entry, owners.iter().copied()) {
                Some(target) => targets.push(target),
                None => {
                    names.insert(entry.clone());
                }
            }
        }

        Self { names, targets }
    }

    pub fn is_excluded(&self, target: &Target) -> bool {
        target.member.as_deref().is_some_and(|m| self.names.contains(m))
            || self.targets.contains(target)
    }
}
