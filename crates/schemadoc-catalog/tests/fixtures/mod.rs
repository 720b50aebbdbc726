//! Test fixtures for schema source integration tests
//!
//! Extractor output for a small blog database: users, posts, comments and
//! a view over posts.

use schemadoc_core::{Column, Constraint, ConstraintType, Table, TableType};
use schemadoc_graph::RawCatalog;

fn fk(name: &str, table: &str, def: &str) -> Constraint {
    Constraint::new(name, ConstraintType::ForeignKey, table, &[]).with_def(def)
}

pub fn users_table() -> Table {
    Table::new("public.users")
        .with_comment("registered users")
        .with_column(Column::new("id", "bigint"))
        .with_column(Column::new("email", "text").with_comment("login address"))
}

pub fn posts_table() -> Table {
    Table::new("public.posts")
        .with_column(Column::new("id", "bigint"))
        .with_column(Column::new("user_id", "bigint"))
        .with_column(Column::new("title", "text").with_nullable(true))
        .with_constraint(fk(
            "posts_user_id_fkey",
            "public.posts",
            "FOREIGN KEY (user_id) REFERENCES users(id)",
        ))
}

pub fn comments_table() -> Table {
    Table::new("public.comments")
        .with_column(Column::new("id", "bigint"))
        .with_column(Column::new("post_id", "bigint"))
        .with_column(Column::new("user_id", "bigint"))
        .with_constraint(fk(
            "comments_post_id_fkey",
            "public.comments",
            "FOREIGN KEY (post_id) REFERENCES posts(id)",
        ))
        .with_constraint(fk(
            "comments_user_id_fkey",
            "public.comments",
            "FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE",
        ))
}

pub fn recent_posts_view() -> Table {
    Table::new("public.recent_posts")
        .with_type(TableType::View)
        .with_def("CREATE VIEW recent_posts AS SELECT p.id, p.title FROM posts p JOIN archive.authors a ON a.id = p.user_id")
        .with_column(Column::new("id", "bigint"))
        .with_column(Column::new("title", "text"))
}

pub fn blog_catalog() -> RawCatalog {
    RawCatalog::from_tables(
        "blog",
        vec![users_table(), posts_table(), comments_table(), recent_posts_view()],
    )
    .with_search_paths(&["public"])
}
