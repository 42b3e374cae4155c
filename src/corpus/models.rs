// Corpus models — the immutable input every task reads from.
//
// Only `text` feeds the analyzers. The categorical attributes exist for
// subset selection and are optional per row.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Column every corpus must carry.
pub const TEXT_COLUMN: &str = "text";

/// One free-text record plus its optional categorical attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    /// Carried through for callers building their own selectors; no
    /// built-in task reads it. `Corpus::columns` records whether the
    /// source had the column at all.
    pub topic: Option<String>,
    /// Same as `topic`: loaded, never read by the built-in tasks.
    pub sign: Option<String>,
}

impl Document {
    /// A document with text only, no attributes.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// An in-memory corpus: the documents plus the column names the source had.
///
/// Column presence is tracked separately from per-row values so a CSV
/// without an `age` column can be told apart from one where every age
/// happens to be blank.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub columns: Vec<String>,
    pub documents: Vec<Document>,
}

impl Corpus {
    pub fn new(columns: Vec<String>, documents: Vec<Document>) -> Self {
        Self { columns, documents }
    }

    /// Build a corpus that claims every known column. Handy for tests and
    /// for callers assembling documents in code.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let columns = [TEXT_COLUMN, "gender", "age", "topic", "sign"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Self { columns, documents }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail with `MissingColumn` if `name` isn't part of this corpus.
    pub fn require_column(&self, name: &str) -> Result<(), AnalysisError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(AnalysisError::MissingColumn(name.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
