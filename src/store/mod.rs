// Result storage — where finished task tables go.
//
// Implementors: CsvStore (one file per task, the format the dashboard
// reads) and SqliteStore (all results in one database, JSON per task).
// Methods are async so a blocking backend behind a mutex and a native
// async backend would both fit the same interface.

pub mod csv_dir;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use csv_dir::CsvStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, StoreBackend};
use crate::pipeline::{TaskKind, TaskResult};

/// Listing entry for a persisted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub task: String,
    pub kind: TaskKind,
    pub rows: usize,
    pub saved_at: String,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a result, replacing any earlier result for the same task.
    async fn save(&self, result: &TaskResult) -> Result<()>;

    /// Load the latest result for `task`, if one was saved.
    async fn load(&self, task: &str) -> Result<Option<TaskResult>>;

    /// Every persisted result, ordered by task name.
    async fn list(&self) -> Result<Vec<StoredResult>>;

    /// Human-readable location, for log lines and status output.
    fn location(&self) -> String;
}

/// Open the store the configuration asks for.
pub fn open_store(config: &Config) -> Result<Box<dyn ResultStore>> {
    match config.store_backend {
        StoreBackend::Csv => Ok(Box::new(CsvStore::new(&config.results_dir))),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.db_path)?)),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => anyhow::bail!(
            "SQLite storage requested but cinder was built without the `sqlite` feature"
        ),
    }
}
