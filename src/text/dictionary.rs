// Reference dictionary — the controlled vocabulary tokens are checked against.
//
// Loaded once per process and shared read-only (behind an Arc) by every
// task, so concurrent reads need no locking.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::AnalysisError;

/// A lowercase set of known words.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Read a word list with one entry per line.
    ///
    /// Entries are trimmed and lowercased; blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary at {}", path.display()))?;

        let dictionary = Self::from_words(raw.lines());
        if dictionary.is_empty() {
            return Err(AnalysisError::EmptyDictionary(path.to_path_buf()).into());
        }

        info!(
            path = %path.display(),
            words = dictionary.len(),
            "Loaded reference dictionary"
        );
        Ok(dictionary)
    }

    /// Build a dictionary from any iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Exact match against the lowercase set. Callers pass lowercase input.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_words_lowercases_and_trims() {
        let dict = Dictionary::from_words(["Apple", "  banana ", "", "CHERRY"]);
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("apple"));
        assert!(dict.contains("banana"));
        assert!(dict.contains("cherry"));
        assert!(!dict.contains("Apple"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words");
        std::fs::write(&path, "Aardvark\nzebra\n\n").unwrap();

        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("aardvark"));
    }

    #[test]
    fn test_load_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words");
        std::fs::write(&path, "\n  \n").unwrap();

        let err = Dictionary::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::EmptyDictionary(_))
        ));
    }
}
