//! Identifiers for the entity a lint warning is about
//!
//! Table names may themselves contain the `.` separator (`public.users`), so
//! a target keeps its owner and member apart instead of gluing strings
//! together. The rendered form is only produced for display and matching.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity a [`Target`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Schema,
    Table,
    Column,
    Index,
    Constraint,
    Trigger,
    Label,
}

/// Owner plus optional member, e.g. table `public.users` and column `email`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,

    /// Schema or table name
    pub owner: String,

    /// Sub-table entity name, absent for schema and table targets
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub member: Option<String>,
}

impl Target {
    pub fn schema(name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Schema,
            owner: name.into(),
            member: None,
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Table,
            owner: name.into(),
            member: None,
        }
    }

    /// Sub-table entity (`Column`, `Index`, `Constraint`, `Trigger` or `Label`)
    pub fn member(kind: TargetKind, owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
            member: Some(member.into()),
        }
    }

    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::member(TargetKind::Column, table, column)
    }

    /// Split `owner.member` given the set of known owner names
    ///
    /// The longest known owner that is followed by the separator wins, so
    /// `public.users.id` resolves to owner `public.users` when that table
    /// exists. Label targets use the `owner.Labels.label` form.
    pub fn parse_qualified<'a, I>(kind: TargetKind, text: &str, owners: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let separator = match kind {
            TargetKind::Schema | TargetKind::Table => return None,
            TargetKind::Label => ".Labels.",
            _ => ".",
        };

        owners
            .into_iter()
            .filter(|owner| {
                text.len() > owner.len() + separator.len()
                    && text.starts_with(owner)
                    && text[owner.len()..].starts_with(separator)
            })
            .max_by_key(|owner| owner.len())
            .map(|owner| Self::member(kind, owner, &text[owner.len() + separator.len()..]))
    }

    /// Member name, or the owner for schema and table targets
    pub fn name(&self) -> &str {
        self.member.as_deref().unwrap_or(&self.owner)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.member) {
            (TargetKind::Label, Some(member)) => write!(f, "{}.Labels.{}", self.owner, member),
            (_, Some(member)) => write!(f, "{}.{}", self.owner, member),
            (_, None) => f.write_str(&self.owner),
        }
    }
}
