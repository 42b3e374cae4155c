// Structural errors the analysis core raises to its caller.
//
// Recoverable conditions (an unparseable dollar amount, a corpus with no
// qualifying words) never show up here: analyzers absorb them and return
// zero or empty results. Everything else in the crate uses anyhow, and
// callers can `downcast_ref::<AnalysisError>()` to tell these apart.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The corpus lacks a column that a task or its selector reads.
    #[error("corpus is missing required column `{0}`")]
    MissingColumn(String),

    /// Nearest neighbours need at least two distinct qualifying words.
    #[error("need at least 2 distinct qualifying words to rank neighbours, found {found}")]
    InsufficientVocabulary { found: usize },

    /// The corpus file has an extension we can't read.
    #[error("unsupported corpus format: {0} (only .csv files are supported)")]
    UnsupportedFormat(String),

    /// The reference word list had no usable entries.
    #[error("reference dictionary at {} contains no words", .0.display())]
    EmptyDictionary(PathBuf),
}
