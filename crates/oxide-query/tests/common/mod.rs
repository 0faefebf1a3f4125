#![allow(dead_code)]

use oxide_query::{OrderedRecord, SqlValue};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

pub fn args(pairs: &[(&str, SqlValue)]) -> OrderedRecord {
    pairs
        .iter()
        .map(|(name, value)| (*name, value.clone()))
        .collect()
}

/// Drops all whitespace so layouts can be compared token for token.
pub fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses every whitespace run to one space.
pub fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An in-memory database with a small `users` table.
///
/// A single connection keeps every query on the same memory database.
pub async fn users_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::query(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, \
         email TEXT)",
    )
    .execute(&pool)
    .await
    .expect("Failed to create users table");

    let rows = [
        (1, "alice", Some(30), Some("alice@example.com")),
        (2, "adam", Some(12), None),
        (3, "bob", Some(40), Some("bob@example.com")),
        (4, "anna", Some(18), Some("anna@example.org")),
        (5, "carl", None, None),
    ];
    for (id, name, age, email) in rows {
        sqlx::query("INSERT INTO users (id, name, age, email) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(name)
            .bind(age)
            .bind(email)
            .execute(&pool)
            .await
            .expect("Failed to seed users");
    }
    pool
}

/// Binds every value in order.
pub fn bind_all(
    sql: &str,
    values: Vec<SqlValue>,
) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    values
        .into_iter()
        .fold(sqlx::query(sql), |query, value| match value {
            SqlValue::Null => query.bind(Option::<i64>::None),
            SqlValue::Bool(b) => query.bind(b),
            SqlValue::Int(i) => query.bind(i),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Blob(b) => query.bind(b),
        })
}
