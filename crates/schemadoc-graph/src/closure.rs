//! Relation graph and bounded table closure
//!
//! Edges are followed in both directions, so a closure is the neighborhood
//! of a table regardless of which side of a foreign key it sits on.

use std::collections::{HashMap, HashSet};

use schemadoc_core::{Relation, Result, Schema, Table};
use serde::Serialize;

/// Adjacency view over a resolved schema
#[derive(Debug, Clone)]
pub struct RelationGraph<'a> {
    schema: &'a Schema,

    /// Table -> tables it references, in relation order
    parents: HashMap<&'a str, Vec<&'a str>>,

    /// Table -> tables referencing it, in relation order
    children: HashMap<&'a str, Vec<&'a str>>,

    /// Table -> tables on the other end of any relation, in relation order
    neighbors: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> RelationGraph<'a> {
    /// Build the graph from a resolved schema
    pub fn from_schema(schema: &'a Schema) -> Self {
        let mut parents: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut children: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut neighbors: HashMap<&'a str, Vec<&'a str>> = HashMap::new();

        for relation in &schema.relations {
            let child = relation.table.as_str();
            let parent = relation.parent_table.as_str();

            push_unique(parents.entry(child).or_default(), parent);
            push_unique(children.entry(parent).or_default(), child);
            push_unique(neighbors.entry(child).or_default(), parent);
            push_unique(neighbors.entry(parent).or_default(), child);
        }

        Self {
            schema,
            parents,
            children,
            neighbors,
        }
    }

    /// Tables `table` references through its foreign keys
    pub fn parents(&self, table: &str) -> Vec<&'a str> {
        self.parents.get(table).cloned().unwrap_or_default()
    }

    /// Tables whose foreign keys reference `table`
    pub fn children(&self, table: &str) -> Vec<&'a str> {
        self.children.get(table).cloned().unwrap_or_default()
    }

    /// Tables and relations within `distance` hops of `table`
    ///
    /// Breadth-first; a table keeps the hop count it was first reached at, so
    /// cycles terminate. Tables come in discovery order, starting table first
    /// when `include_root` is set. Relations come in schema order and are
    /// limited to those with both endpoints in `tables`. External tables read
    /// by views in `tables` are collected separately.
    pub fn closure(&self, table: &str, distance: usize, include_root: bool) -> Result<TableClosure<'a>> {
        let root = self.schema.find_table_by_name(table)?;

        let mut visited: HashSet<&'a str> = HashSet::from([root.name.as_str()]);
        let mut order: Vec<&'a str> = vec![root.name.as_str()];
        let mut frontier: Vec<&'a str> = vec![root.name.as_str()];

        for _ in 0..distance {
            let mut next = Vec::new();
            for current in frontier {
                for &neighbor in self.neighbors.get(current).into_iter().flatten() {
                    if visited.insert(neighbor) {
                        order.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let mut tables = Vec::with_capacity(order.len());
        for name in order.iter().skip(usize::from(!include_root)) {
            tables.push(self.schema.find_table_by_name(name)?);
        }

        if !include_root {
            visited.remove(root.name.as_str());
        }

        let relations = self
            .schema
            .relations
            .iter()
            .filter(|r| visited.contains(r.table.as_str()) && visited.contains(r.parent_table.as_str()))
            .collect();

        let mut external_tables: Vec<&'a Table> = Vec::new();
        for name in tables.iter().flat_map(|t| t.referenced_tables.iter()) {
            let external = self.schema.external_tables.iter().find(|t| &t.name == name);
            if let Some(external) = external {
                if !external_tables.iter().any(|t| t.name == external.name) {
                    external_tables.push(external);
                }
            }
        }

        tracing::debug!(table, distance, tables = tables.len(), "computed table closure");

        Ok(TableClosure {
            tables,
            relations,
            external_tables,
        })
    }
}

fn push_unique<'a>(list: &mut Vec<&'a str>, name: &'a str) {
    if !list.contains(&name) {
        list.push(name);
    }
}

/// Induced sub-graph around a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableClosure<'a> {
    pub tables: Vec<&'a Table>,
    pub relations: Vec<&'a Relation>,
    /// Stubs for tables outside the schema that views in `tables` read
    pub external_tables: Vec<&'a Table>,
}

impl<'a> TableClosure<'a> {
    pub fn table_names(&self) -> Vec<&'a str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t.name == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadoc_core::{Column, SchemaError, TableType};

    fn relation(table: &str, column: &str, parent: &str, parent_column: &str) -> Relation {
        Relation {
            table: table.to_string(),
            columns: vec![column.to_string()],
            parent_table: parent.to_string(),
            parent_columns: vec![parent_column.to_string()],
            def: String::new(),
        }
    }

    /// employees.manager_id -> employees.id, employees.dept_id -> depts.id, depts.head_id -> employees.id
    fn cyclic() -> Schema {
        let mut schema = Schema::new("hr");
        schema.tables = vec![
            Table::new("employees")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("manager_id", "int"))
                .with_column(Column::new("dept_id", "int")),
            Table::new("depts")
                .with_column(Column::new("id", "int"))
                .with_column(Column::new("head_id", "int")),
            Table::new("sites").with_column(Column::new("id", "int")),
        ];
        schema.install_relation(relation("employees", "manager_id", "employees", "id")).unwrap();
        schema.install_relation(relation("employees", "dept_id", "depts", "id")).unwrap();
        schema.install_relation(relation("depts", "head_id", "employees", "id")).unwrap();
        schema
    }

    #[test]
    fn distance_zero_keeps_only_self_relations() {
        let schema = cyclic();
        let graph = RelationGraph::from_schema(&schema);

        let closure = graph.closure("employees", 0, true).unwrap();
        assert_eq!(closure.table_names(), vec!["employees"]);
        assert_eq!(closure.relations, vec![&schema.relations[0]]);
    }

    #[test]
    fn cycles_terminate() {
        let schema = cyclic();
        let graph = RelationGraph::from_schema(&schema);

        let closure = graph.closure("depts", 10, true).unwrap();
        assert_eq!(closure.table_names(), vec!["depts", "employees"]);
        assert_eq!(closure.relations.len(), 3);
        assert!(!closure.contains("sites"));
    }

    #[test]
    fn exclude_root() {
        let schema = cyclic();
        let graph = RelationGraph::from_schema(&schema);

        let closure = graph.closure("depts", 1, false).unwrap();
        assert_eq!(closure.table_names(), vec!["employees"]);
        assert_eq!(closure.relations, vec![&schema.relations[0]]);
        for relation in &closure.relations {
            assert!(closure.contains(&relation.table) && closure.contains(&relation.parent_table));
        }
    }

    #[test]
    fn views_bring_their_external_tables() {
        let mut schema = cyclic();
        let mut view = Table::new("staff")
            .with_type(TableType::View)
            .with_column(Column::new("id", "int"));
        view.referenced_tables = vec!["employees".to_string(), "ldap.accounts".to_string()];
        schema.tables.push(view);
        schema.external_tables = vec![Table::external("ldap.accounts"), Table::external("crm.leads")];

        let graph = RelationGraph::from_schema(&schema);
        let closure = graph.closure("staff", 1, true).unwrap();
        assert_eq!(closure.table_names(), vec!["staff"]);
        assert_eq!(closure.external_tables, vec![&schema.external_tables[0]]);

        assert!(graph.closure("depts", 1, true).unwrap().external_tables.is_empty());
    }

    #[test]
    fn parents_and_children() {
        let schema = cyclic();
        let graph = RelationGraph::from_schema(&schema);

        assert_eq!(graph.parents("employees"), vec!["employees", "depts"]);
        assert_eq!(graph.children("employees"), vec!["employees", "depts"]);
        assert!(graph.parents("sites").is_empty());
    }

    #[test]
    fn unknown_start_table() {
        let schema = cyclic();
        let graph = RelationGraph::from_schema(&schema);

        assert_eq!(
            graph.closure("nope", 1, true).unwrap_err(),
            SchemaError::table_not_found("nope")
        );
    }
}
