use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Default reference word list on most Unix systems.
pub const DEFAULT_DICTIONARY_PATH: &str = "/usr/share/dict/words";

/// Where task results get persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One `<task>_results.csv` file per task (default)
    Csv,
    /// A single SQLite database holding every task result as JSON
    Sqlite,
}

impl StoreBackend {
    /// Parse a backend name, falling back to CSV for anything unknown.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sqlite" => StoreBackend::Sqlite,
            _ => StoreBackend::Csv,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual fields after loading.
pub struct Config {
    /// Corpus file, or a directory whose first entry is the corpus
    pub corpus_path: Option<PathBuf>,
    /// Newline-separated reference word list used by the normalizer
    pub dictionary_path: PathBuf,
    /// Directory for CSV results
    pub results_dir: PathBuf,
    /// SQLite results database
    pub db_path: String,
    pub store_backend: StoreBackend,
    /// Seed for embedding initialisation, so similarity runs are reproducible
    pub embedding_seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything but the corpus path has a default.
    pub fn load() -> Result<Self> {
        let store_backend = env::var("CINDER_STORE")
            .map(|s| StoreBackend::from_name(&s))
            .unwrap_or(StoreBackend::Csv);

        let embedding_seed = match env::var("CINDER_EMBEDDING_SEED") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("CINDER_EMBEDDING_SEED must be an unsigned integer: {e}")
            })?,
            Err(_) => 1,
        };

        Ok(Self {
            corpus_path: env::var("CINDER_CORPUS_PATH").ok().map(PathBuf::from),
            dictionary_path: env::var("CINDER_DICTIONARY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DICTIONARY_PATH)),
            results_dir: env::var("CINDER_RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./results")),
            db_path: env::var("CINDER_DB_PATH").unwrap_or_else(|_| "./cinder.db".to_string()),
            store_backend,
            embedding_seed,
        })
    }

    /// Check that a corpus is configured and exists on disk.
    /// Call this before any operation that runs analyses.
    pub fn require_corpus(&self) -> Result<&Path> {
        let Some(path) = self.corpus_path.as_deref() else {
            anyhow::bail!(
                "CINDER_CORPUS_PATH not set. Add it to your .env file or pass --corpus.\n\
                 It should point at a CSV file with at least a `text` column."
            );
        };
        if !path.exists() {
            anyhow::bail!("Corpus not found at {}", path.display());
        }
        Ok(path)
    }

    /// Check that the reference dictionary exists.
    pub fn require_dictionary(&self) -> Result<&Path> {
        if !self.dictionary_path.exists() {
            anyhow::bail!(
                "Reference dictionary not found at {}\n\
                 Set CINDER_DICTIONARY_PATH to a newline-separated English word list.",
                self.dictionary_path.display()
            );
        }
        Ok(&self.dictionary_path)
    }
}
