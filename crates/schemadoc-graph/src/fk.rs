//! Foreign key definition parsing
//!
//! Data sources report foreign keys as rendered constraint definitions such
//! as `FOREIGN KEY (a, b) REFERENCES other_table(x, y) ON DELETE CASCADE`.

use regex::Regex;
use schemadoc_core::{Result, SchemaError};

const FOREIGN_KEY_PATTERN: &str = r"FOREIGN KEY \((.+)\) REFERENCES ([^\s]+)\s?\((.+)\)";

/// Parts of a parsed foreign key definition, names unquoted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub columns: Vec<String>,
    /// Referenced table, possibly unqualified
    pub parent_table: String,
    pub parent_columns: Vec<String>,
}

impl ForeignKeyDef {
    /// Parse a rendered foreign key constraint definition
    ///
    /// Fails with `Parse` when the text does not match the grammar or the
    /// two column lists differ in length.
    pub fn parse(def: &str) -> Result<Self> {
        let parse_error = || SchemaError::Parse {
            def: def.to_string(),
        };

        let pattern = Regex::new(FOREIGN_KEY_PATTERN).map_err(|_| parse_error())?;
        let captures = pattern.captures(def).ok_or_else(parse_error)?;

        let columns = split_columns(&captures[1]);
        let parent_table = unquote(&captures[2]);
        let parent_columns = split_columns(&captures[3]);

        if columns.is_empty() || parent_table.is_empty() || columns.len() != parent_columns.len() {
            return Err(parse_error());
        }

        Ok(Self {
            columns,
            parent_table,
            parent_columns,
        })
    }
}

fn split_columns(list: &str) -> Vec<String> {
    list.split(',')
        .map(unquote)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Drop identifier quoting (`"x"`, `` `x` ``, `[x]`) and surrounding whitespace
fn unquote(identifier: &str) -> String {
    identifier
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_simple_definition() {
        let fk = ForeignKeyDef::parse("FOREIGN KEY (customer_id) REFERENCES customers(id)").unwrap();
        assert_eq!(fk.columns, vec!["customer_id"]);
        assert_eq!(fk.parent_table, "customers");
        assert_eq!(fk.parent_columns, vec!["id"]);
    }

    #[test]
    fn parse_composite_quoted_definition() {
        let fk = ForeignKeyDef::parse(
            r#"FOREIGN KEY ("order_id", "line_no") REFERENCES "sales"."order_lines" ("id", "line_no") ON DELETE CASCADE"#,
        )
        .unwrap();
        assert_eq!(fk.columns, vec!["order_id", "line_no"]);
        assert_eq!(fk.parent_table, "sales.order_lines");
        assert_eq!(fk.parent_columns, vec!["id", "line_no"]);
    }

    #[test]
    fn parse_rejects_other_constraints() {
        let err = ForeignKeyDef::parse("CHECK ((price > 0))").unwrap_err();
        assert_eq!(
            err,
            SchemaError::Parse {
                def: "CHECK ((price > 0))".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_arity_mismatch() {
        assert!(ForeignKeyDef::parse("FOREIGN KEY (a, b) REFERENCES t(x)").is_err());
    }
}
