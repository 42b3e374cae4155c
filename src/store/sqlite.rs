// SqliteStore — rusqlite backend implementing the ResultStore trait.
//
// The Connection sits behind a tokio Mutex. Trait methods lock it, do the
// synchronous rusqlite work, and return without holding the guard across
// an await.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::info;

use super::schema;
use super::{ResultStore, StoredResult};
use crate::pipeline::{TaskKind, TaskResult};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: String,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run migrations.
    pub fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory for database: {db_path}")
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {db_path}"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        schema::create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path.to_string(),
        })
    }

    /// Wrap an already-opened connection, creating tables if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        schema::create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    pub async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        schema::table_count(&conn)
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn save(&self, result: &TaskResult) -> Result<()> {
        let json = serde_json::to_string(result)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO task_results (task, kind, row_count, result_json, saved_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))
             ON CONFLICT(task) DO UPDATE SET
                kind = ?2,
                row_count = ?3,
                result_json = ?4,
                saved_at = datetime('now')",
            params![
                result.task,
                result.kind().as_str(),
                result.output.row_count() as i64,
                json
            ],
        )?;
        info!(task = %result.task, db = %self.path, "Results saved");
        Ok(())
    }

    async fn load(&self, task: &str) -> Result<Option<TaskResult>> {
        let conn = self.conn.lock().await;
        let json: Option<String> = conn
            .query_row(
                "SELECT result_json FROM task_results WHERE task = ?1",
                params![task],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => {
                let result = serde_json::from_str(&json)
                    .with_context(|| format!("Stored result for {task} is not valid JSON"))?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<StoredResult>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT task, kind, row_count, saved_at FROM task_results ORDER BY task",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(task, kind, rows, saved_at)| {
                let kind: TaskKind = serde_json::from_value(serde_json::Value::String(kind))
                    .with_context(|| format!("Unknown result kind stored for {task}"))?;
                Ok(StoredResult {
                    task,
                    kind,
                    rows: rows.max(0) as usize,
                    saved_at,
                })
            })
            .collect()
    }

    fn location(&self) -> String {
        self.path.clone()
    }
}
