// CsvStore — one `<task>_results.csv` per task in a results directory.
//
// The header row is the task's fixed column schema, which is also how
// `load` works out what kind of result a file holds.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use csv::{Reader, Writer};
use tracing::info;

use super::{ResultStore, StoredResult};
use crate::pipeline::{TaskKind, TaskOutput, TaskResult};

const FILE_SUFFIX: &str = "_results.csv";

pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a task's results are written to.
    pub fn path_for(&self, task: &str) -> PathBuf {
        self.dir.join(format!("{task}{FILE_SUFFIX}"))
    }

    fn write(&self, result: &TaskResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create results directory {}", self.dir.display())
        })?;

        let path = self.path_for(&result.task);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(result.columns())?;
        for row in result.rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        Ok(path)
    }

    fn read(path: &Path) -> Result<(TaskKind, Vec<Vec<String>>)> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = Reader::from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();
        let kind = TaskKind::from_columns(&headers).with_context(|| {
            format!(
                "Unrecognised result columns in {}: {}",
                path.display(),
                headers.join(", ")
            )
        })?;

        let rows = reader
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()
            .with_context(|| format!("Malformed row in {}", path.display()))?;

        Ok((kind, rows))
    }
}

#[async_trait]
impl ResultStore for CsvStore {
    async fn save(&self, result: &TaskResult) -> Result<()> {
        let path = self.write(result)?;
        info!(task = %result.task, path = %path.display(), "Results saved");
        Ok(())
    }

    async fn load(&self, task: &str) -> Result<Option<TaskResult>> {
        let path = self.path_for(task);
        if !path.exists() {
            return Ok(None);
        }
        let (kind, rows) = Self::read(&path)?;
        let output = TaskOutput::from_rows(kind, &rows)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(TaskResult::new(task, output)))
    }

    async fn list(&self) -> Result<Vec<StoredResult>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut stored = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
        {
            let path = entry?.path();
            let Some(task) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
                .map(str::to_string)
            else {
                continue;
            };

            let (kind, rows) = Self::read(&path)?;
            let saved_at = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|_| "unknown".to_string());

            stored.push(StoredResult {
                task,
                kind,
                rows: rows.len(),
                saved_at,
            });
        }

        stored.sort_by(|a, b| a.task.cmp(&b.task));
        Ok(stored)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WordCount;

    fn frequency_result() -> TaskResult {
        TaskResult::new(
            "Task1",
            TaskOutput::Frequency(vec![
                WordCount { word: "wonderful".to_string(), count: 5 },
                WordCount { word: "strength".to_string(), count: 2 },
            ]),
        )
    }

    #[tokio::test]
    async fn test_save_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("results"));
        store.save(&frequency_result()).await.unwrap();

        let written = std::fs::read_to_string(store.path_for("Task1")).unwrap();
        assert_eq!(written, "word,count\nwonderful,5\nstrength,2\n");
    }

    #[tokio::test]
    async fn test_load_reads_back_saved_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        store.save(&frequency_result()).await.unwrap();

        let loaded = store.load("Task1").await.unwrap().unwrap();
        assert_eq!(loaded, frequency_result());
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        assert!(store.load("Task9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        store.save(&frequency_result()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].task, "Task1");
        assert_eq!(listed[0].kind, TaskKind::Frequency);
        assert_eq!(listed[0].rows, 2);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("never-created"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
