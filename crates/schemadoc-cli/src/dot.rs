//! Graphviz DOT rendering

use std::fmt::Write;

use schemadoc_core::{Relation, Table};
use schemadoc_graph::TableClosure;

/// Render tables as record nodes and relations as edges
///
/// Edge labels list the paired columns as `child=parent`, comma separated.
/// With `comments`, table and column comments are shown next to their names.
pub fn render(name: &str, tables: &[&Table], relations: &[&Relation], comments: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "digraph \"{}\" {{", escape_id(name));
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=record, fontsize=10];\n");

    for table in tables {
        let mut fields = String::new();
        for column in &table.columns {
            let _ = write!(
                fields,
                "{} : {}",
                escape_record(&column.name),
                escape_record(&column.column_type)
            );
            match &column.comment {
                Some(comment) if comments && !comment.is_empty() => {
                    let _ = write!(fields, " ({})\\l", escape_record(comment));
                }
                _ => fields.push_str("\\l"),
            }
        }

        let mut header = escape_record(&table.name);
        match &table.comment {
            Some(comment) if comments && !comment.is_empty() => {
                let _ = write!(header, "\\n{}", escape_record(comment));
            }
            _ => {}
        }

        let style = if table.external { ", style=dashed" } else { "" };
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"{{{}|{}}}\"{}];",
            escape_id(&table.name),
            header,
            fields,
            style
        );
    }

    for relation in relations {
        let pairs: Vec<String> = relation
            .column_pairs()
            .map(|(c, p)| format!("{}={}", c, p))
            .collect();
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\"];",
            escape_id(&relation.table),
            escape_id(&relation.parent_table),
            escape_id(&pairs.join(", "))
        );
    }

    out.push_str("}\n");
    out
}

/// Render a closure, external tables read by its views included
pub fn render_closure(name: &str, closure: &TableClosure<'_>, comments: bool) -> String {
    let tables: Vec<&Table> = closure
        .tables
        .iter()
        .chain(closure.external_tables.iter())
        .copied()
        .collect();
    render(name, &tables, &closure.relations, comments)
}

fn escape_id(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_record(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadoc_core::{Column, Schema, TableType};
    use schemadoc_graph::RelationGraph;

    #[test]
    fn renders_nodes_and_edges() {
        let users = Table::new("users").with_column(Column::new("id", "int"));
        let posts = Table::new("posts")
            .with_column(Column::new("id", "int"))
            .with_column(Column::new("user_id", "int"));
        let relation = Relation {
            table: "posts".to_string(),
            columns: vec!["user_id".to_string()],
            parent_table: "users".to_string(),
            parent_columns: vec!["id".to_string()],
            def: String::new(),
        };

        let dot = render("app", &[&users, &posts], &[&relation], false);
        assert_eq!(
            dot,
            "digraph \"app\" {\n\
             \x20 rankdir=LR;\n\
             \x20 node [shape=record, fontsize=10];\n\
             \x20 \"users\" [label=\"{users|id : int\\l}\"];\n\
             \x20 \"posts\" [label=\"{posts|id : int\\luser_id : int\\l}\"];\n\
             \x20 \"posts\" -> \"users\" [label=\"user_id=id\"];\n\
             }\n"
        );
    }

    #[test]
    fn escapes_record_syntax() {
        let table = Table::external("odd<name>").with_column(Column::new("a|b", "varchar{1}"));
        let dot = render("s", &[&table], &[], false);
        assert!(dot.contains("odd\\<name\\>|a\\|b : varchar\\{1\\}\\l"));
        assert!(dot.contains("style=dashed"));
    }

    #[test]
    fn closure_without_root_declares_every_edge_endpoint() {
        let mut schema = Schema::new("hr");
        schema.tables = vec![
            Table::new("depts")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("head_id", "int")),
            Table::new("employees")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("dept_id", "int")),
        ];
        let mut view = Table::new("dept_staff").with_type(TableType::View);
        view.referenced_tables = vec!["depts".to_string(), "ldap.accounts".to_string()];
        schema.tables.push(view);
        schema.external_tables = vec![Table::external("ldap.accounts")];
        schema
            .install_relation(Relation {
                table: "employees".to_string(),
                columns: vec!["dept_id".to_string()],
                parent_table: "depts".to_string(),
                parent_columns: vec!["id".to_string()],
                def: String::new(),
            })
            .unwrap();

        let graph = RelationGraph::from_schema(&schema);

        let closure = graph.closure("depts", 1, false).unwrap();
        let dot = render_closure("depts", &closure, false);
        assert!(dot.contains("\"employees\" [label="));
        assert!(!dot.contains("->"));

        let closure = graph.closure("dept_staff", 0, true).unwrap();
        let dot = render_closure("dept_staff", &closure, false);
        assert!(dot.contains("\"ldap.accounts\" [label=\"{ldap.accounts|}\", style=dashed];"));
    }

    #[test]
    fn comments_are_optional() {
        let table = Table::new("users")
            .with_comment("people")
            .with_column(Column::new("id", "int").with_comment("surrogate key"));

        let plain = render("s", &[&table], &[], false);
        assert!(plain.contains("{users|id : int\\l}"));

        let commented = render("s", &[&table], &[], true);
        assert!(commented.contains("{users\\npeople|id : int (surrogate key)\\l}"));
    }
}
