// Text normalization — raw text in, dictionary-validated tokens out.
//
// Punctuation is dropped (not replaced by a space), so "don't" becomes
// "dont" and "well-known" becomes "wellknown". Pieces that aren't in the
// reference dictionary are silently discarded.

use std::sync::Arc;

use super::dictionary::Dictionary;

/// Normalizes text against a shared reference dictionary.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    dictionary: Arc<Dictionary>,
}

impl TextNormalizer {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Tokenize `text` into lowercase dictionary words, in original order.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        strip_punctuation(text)
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|word| self.dictionary.contains(word))
            .collect()
    }
}

/// Remove every character that is neither a word character nor whitespace.
///
/// Word characters are alphanumerics plus the underscore.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}
