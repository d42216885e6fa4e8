//! # Demo Data
//!
//! The `users` table served by `tablow serve`: schema, seed rows and the
//! table views mounted over it.

use crate::store::{Store, StoreError};
use serde::Serialize;
use sqlx::FromRow;
use tablow_core::{FieldKind, FilterField, SqlParam, SqlStatement, TableModel, TableView};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name   TEXT    NOT NULL,
    age    INTEGER NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1
);
";

const SEED: &[(&str, i64, bool)] = &[("Alice", 30, true), ("Bob", 25, false), ("Charlie", 35, true)];

/// Demo model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub active: bool,
}

impl TableModel for User {
    const TABLE: &'static str = "users";
    const FIELDS: &'static [&'static str] = &["id", "name", "age", "active"];

    fn field_kind(field: &str) -> FieldKind {
        match field {
            "id" | "age" => FieldKind::Integer,
            "active" => FieldKind::Bool,
            _ => FieldKind::Text,
        }
    }
}

/// Read-only listing with a name dropdown and an "active" checkbox.
#[must_use]
pub fn users_view() -> TableView {
    TableView::new("Dynamic Table")
        .column("ID", "id")
        .column("Name", "name")
        .column("Age", "age")
        .column("Active", "active")
        .filter(FilterField::dropdown("name", ["Alice", "Bob"]))
        .filter(FilterField::checkbox("active").with_label("Active only"))
        .sortable(["id", "name", "age"])
}

/// The same listing with inline editing.
#[must_use]
pub fn editable_users_view() -> TableView {
    TableView {
        name: "Edit Users".to_string(),
        ..users_view()
    }
    .editable(true)
}

/// Create the `users` table if needed.
pub async fn install_schema(store: &Store) -> Result<(), StoreError> {
    store.run_script(SCHEMA).await
}

/// Insert the seed rows. Returns how many were inserted.
pub async fn seed(store: &Store) -> Result<u64, StoreError> {
    let mut inserted = 0;
    for (name, age, active) in SEED {
        let statement = SqlStatement::new(
            "INSERT INTO users (name, age, active) VALUES (?, ?, ?)",
            vec![
                SqlParam::Text((*name).to_string()),
                SqlParam::Integer(*age),
                SqlParam::Bool(*active),
            ],
        );
        inserted += store.execute(&statement).await?;
    }
    tracing::info!(rows = inserted, "demo users seeded");
    Ok(inserted)
}

/// Schema plus seed rows, skipping the seed if the table already has data.
pub async fn install(store: &Store) -> Result<(), StoreError> {
    install_schema(store).await?;
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(store.pool())
        .await?;
    if count == 0 {
        seed(store).await?;
    } else {
        tracing::info!(rows = count, "users table already populated, skipping seed");
    }
    Ok(())
}
