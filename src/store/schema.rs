// Results database schema — table creation and migrations.
//
// Same approach as any small SQLite app: a `schema_version` table records
// which migrations ran, and `create_tables` is safe to call on every open.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Latest result of each task, stored as JSON so the row layout
        -- doesn't change when a result type gains fields
        CREATE TABLE IF NOT EXISTS task_results (
            task TEXT PRIMARY KEY,             -- e.g. Task1
            kind TEXT NOT NULL,                -- frequency / similarity / amount
            row_count INTEGER NOT NULL,
            result_json TEXT NOT NULL,
            saved_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database.
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
