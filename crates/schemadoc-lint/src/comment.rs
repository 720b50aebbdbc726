//! Comment rules
//!
//! With `all_or_nothing` set, a rule stays silent until at least one entity
//! in scope carries a comment.

use schemadoc_core::config::{RequireMemberComment, RequireTableComment};
use schemadoc_core::{RuleCode, Schema, Table, Target, TargetKind, Warning};

use crate::exclude::{MemberFilter, TableFilter};
use crate::rule::LintRule;

impl LintRule for RequireTableComment {
    fn code(&self) -> RuleCode {
        RuleCode::RequireTableComment
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let filter = TableFilter::new(schema, exclude, &self.exclude);
        let mut warnings = Vec::new();
        let mut commented = false;

        for table in schema.tables.iter().filter(|t| !filter.is_excluded(&t.name)) {
            if table.has_comment() {
                commented = true;
            } else {
                warnings.push(Warning::new(
                    self.code(),
                    Target::table(&table.name),
                    "table comment required.",
                ));
            }
        }

        if self.all_or_nothing && !commented {
            return Vec::new();
        }
        warnings
    }
}

/// Sub-table entity a comment rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Column,
    Index,
    Constraint,
    Trigger,
}

impl Member {
    fn code(self) -> RuleCode {
        match self {
            Self::Column => RuleCode::RequireColumnComment,
            Self::Index => RuleCode::RequireIndexComment,
            Self::Constraint => RuleCode::RequireConstraintComment,
            Self::Trigger => RuleCode::RequireTriggerComment,
        }
    }

    fn target_kind(self) -> TargetKind {
        match self {
            Self::Column => TargetKind::Column,
            Self::Index => TargetKind::Index,
            Self::Constraint => TargetKind::Constraint,
            Self::Trigger => TargetKind::Trigger,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Column => "column comment required.",
            Self::Index => "index comment required.",
            Self::Constraint => "constraint comment required.",
            Self::Trigger => "trigger comment required.",
        }
    }

    /// Name and comment presence of every entity of this kind on `table`
    fn entities(self, table: &Table) -> Vec<(&str, bool)> {
        match self {
            Self::Column => table.columns.iter().map(|c| (c.name.as_str(), c.has_comment())).collect(),
            Self::Index => table.indexes.iter().map(|i| (i.name.as_str(), i.has_comment())).collect(),
            Self::Constraint => table
                .constraints
                .iter()
                .map(|c| (c.name.as_str(), c.has_comment()))
                .collect(),
            Self::Trigger => table.triggers.iter().map(|t| (t.name.as_str(), t.has_comment())).collect(),
        }
    }
}

/// Comment rule over columns, indexes, constraints or triggers
#[derive(Debug, Clone, Copy)]
pub struct MemberComment<'a> {
    member: Member,
    config: &'a RequireMemberComment,
}

impl<'a> MemberComment<'a> {
    pub fn new(member: Member, config: &'a RequireMemberComment) -> Self {
        Self { member, config }
    }
}

impl LintRule for MemberComment<'_> {
    fn code(&self) -> RuleCode {
        self.member.code()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let tables = TableFilter::new(schema, exclude, &self.config.exclude_tables);
        let members = MemberFilter::new(schema, self.member.target_kind(), &self.config.exclude);
        let mut warnings = Vec::new();
        let mut commented = false;

        for table in schema.tables.iter().filter(|t| !tables.is_excluded(&t.name)) {
            for (name, has_comment) in self.member.entities(table) {
                let target = Target::member(self.member.target_kind(), &table.name, name);
                if members.is_excluded(&target) {
                    continue;
                }
                if has_comment {
                    commented = true;
                } else {
                    warnings.push(Warning::new(self.code(), target, self.member.message()));
                }
            }
        }

        if self.config.all_or_nothing && !commented {
            return Vec::new();
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadoc_core::{Column, Index};

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn schema() -> Schema {
        let mut schema = Schema::new("app");
        schema.tables = vec![
            Table::new("users")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("email", "text").with_comment("login"))
                .with_index(Index::new("users_email_idx", "users", &["email"])),
            Table::new("posts")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("body", "text")),
            Table::new("tmp_import").with_column(Column::new("raw", "text")),
        ];
        schema
    }

    #[test]
    fn table_comment_all_or_nothing() {
        let config = RequireTableComment {
            enabled: true,
            all_or_nothing: true,
            exclude: Vec::new(),
        };

        let mut schema = schema();
        assert!(config.check(&schema, &[]).is_empty());

        schema.tables[0].comment = Some("accounts".to_string());
        let targets: Vec<String> = config
            .check(&schema, &[])
            .iter()
            .map(|w| w.target.to_string())
            .collect();
        assert_eq!(targets, vec!["posts", "tmp_import"]);
    }

    #[test]
    fn table_comment_local_and_global_exclude() {
        let config = RequireTableComment {
            enabled: true,
            all_or_nothing: false,
            exclude: strings(&["tmp_*"]),
        };

        let warnings = config.check(&schema(), &strings(&["posts"]));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].target, Target::table("users"));
        assert_eq!(warnings[0].message, "table comment required.");
    }

    #[test]
    fn column_comment_exclusions() {
        let config = RequireMemberComment {
            enabled: true,
            all_or_nothing: false,
            exclude: strings(&["id", "posts.body"]),
            exclude_tables: strings(&["tmp_import"]),
        };

        let warnings = MemberComment::new(Member::Column, &config).check(&schema(), &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn column_comment_targets() {
        let config = RequireMemberComment {
            enabled: true,
            ..Default::default()
        };

        let warnings = MemberComment::new(Member::Column, &config).check(&schema(), &strings(&["tmp_import"]));
        let targets: Vec<String> = warnings.iter().map(|w| w.target.to_string()).collect();
        assert_eq!(targets, vec!["users.id", "posts.id", "posts.body"]);
        assert!(warnings.iter().all(|w| w.rule == RuleCode::RequireColumnComment));
    }

    #[test]
    fn member_all_or_nothing_counts_only_in_scope_entities() {
        let config = RequireMemberComment {
            enabled: true,
            all_or_nothing: true,
            exclude: strings(&["users.email"]),
            exclude_tables: Vec::new(),
        };

        // the only commented column is excluded, so nothing in scope is documented yet
        let warnings = MemberComment::new(Member::Column, &config).check(&schema(), &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn index_comment() {
        let config = RequireMemberComment {
            enabled: true,
            ..Default::default()
        };

        let warnings = MemberComment::new(Member::Index, &config).check(&schema(), &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].target.to_string(), "users.users_email_idx");
        assert_eq!(warnings[0].message, "index comment required.");
    }

    #[test]
    fn disabled_rule_is_silent() {
        let config = RequireMemberComment::default();
        assert!(MemberComment::new(Member::Trigger, &config).check(&schema(), &[]).is_empty());
    }
}
