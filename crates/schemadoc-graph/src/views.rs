//! Table references of view definitions
//!
//! Definitions are parsed with sqlparser. Definitions the parser rejects
//! (vendor syntax, truncated text) fall back to a `FROM`/`JOIN` scan.

use std::collections::HashSet;

use regex::Regex;
use sqlparser::ast::{
    Expr, JoinConstraint, JoinOperator, ObjectName, Query, SelectItem, SetExpr, Statement,
    TableFactor, TableWithJoins,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

const FROM_JOIN_PATTERN: &str = r"(?i)\b(?:FROM|JOIN)\s+([^\s(),;]+)";
const CTE_PATTERN: &str = r"(?i)(?:\bWITH\s+(?:RECURSIVE\s+)?|,\s*)([A-Za-z_][A-Za-z0-9_]*)\s+AS\s*\(";

/// Table names read by a view definition, in order of appearance, without duplicates
///
/// CTE names are not table references and are left out.
pub fn referenced_table_names(def: &str) -> Vec<String> {
    let sql = def.trim();
    if sql.is_empty() {
        return Vec::new();
    }

    match Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        Ok(statements) => {
            let mut collector = ReferenceCollector::default();
            for statement in &statements {
                collector.statement(statement);
            }
            collector.names
        }
        Err(e) => {
            tracing::debug!(error = %e, "view definition did not parse, scanning FROM/JOIN clauses");
            scan_references(sql)
        }
    }
}

#[derive(Default)]
struct ReferenceCollector {
    ctes: HashSet<String>,
    seen: HashSet<String>,
    names: Vec<String>,
}

impl ReferenceCollector {
    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Query(query) => self.query(query),
            Statement::CreateView { query, .. } => self.query(query),
            _ => {}
        }
    }

    fn query(&mut self, query: &Query) {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.clone());
                self.query(&cte.query);
            }
        }
        self.set_expr(&query.body);
    }

    fn set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Select(select) => {
                for table_with_joins in &select.from {
                    self.table_with_joins(table_with_joins);
                }
                for item in &select.projection {
                    match item {
                        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                            self.expr(expr)
                        }
                        _ => {}
                    }
                }
                if let Some(selection) = &select.selection {
                    self.expr(selection);
                }
                if let Some(having) = &select.having {
                    self.expr(having);
                }
            }
            SetExpr::Query(query) => self.query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left);
                self.set_expr(right);
            }
            _ => {}
        }
    }

    fn table_with_joins(&mut self, table_with_joins: &TableWithJoins) {
        self.table_factor(&table_with_joins.relation);
        for join in &table_with_joins.joins {
            self.table_factor(&join.relation);
            match &join.join_operator {
                JoinOperator::Inner(JoinConstraint::On(on))
                | JoinOperator::LeftOuter(JoinConstraint::On(on))
                | JoinOperator::RightOuter(JoinConstraint::On(on))
                | JoinOperator::FullOuter(JoinConstraint::On(on)) => self.expr(on),
                _ => {}
            }
        }
    }

    /// Subqueries nested in expressions
    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Subquery(query) => self.query(query),
            Expr::Exists { subquery, .. } => self.query(subquery),
            Expr::InSubquery { expr, subquery, .. } => {
                self.expr(expr);
                self.query(subquery);
            }
            Expr::BinaryOp { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Nested(expr)
            | Expr::IsNull(expr)
            | Expr::IsNotNull(expr)
            | Expr::Cast { expr, .. } => self.expr(expr),
            Expr::Between { expr, low, high, .. } => {
                self.expr(expr);
                self.expr(low);
                self.expr(high);
            }
            Expr::InList { expr, list, .. } => {
                self.expr(expr);
                for item in list {
                    self.expr(item);
                }
            }
            _ => {}
        }
    }

    fn table_factor(&mut self, table_factor: &TableFactor) {
        match table_factor {
            TableFactor::Table { name, .. } => self.reference(name),
            TableFactor::Derived { subquery, .. } => self.query(subquery),
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins),
            _ => {}
        }
    }

    fn reference(&mut self, name: &ObjectName) {
        let name = name
            .0
            .iter()
            .map(|ident| ident.value.as_str())
            .collect::<Vec<_>>()
            .join(".");

        if self.ctes.contains(&name) {
            return;
        }
        if self.seen.insert(name.clone()) {
            self.names.push(name);
        }
    }
}

fn scan_references(sql: &str) -> Vec<String> {
    let (Ok(references), Ok(ctes)) = (Regex::new(FROM_JOIN_PATTERN), Regex::new(CTE_PATTERN)) else {
        return Vec::new();
    };

    let cte_names: HashSet<&str> = ctes
        .captures_iter(sql)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for capture in references.captures_iter(sql) {
        let name: String = capture[1].chars().filter(|c| !matches!(c, '"' | '`')).collect();
        if name.is_empty() || cte_names.contains(name.as_str()) {
            continue;
        }
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}
