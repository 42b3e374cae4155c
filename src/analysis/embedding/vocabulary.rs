// Ordered vocabulary — unique tokens in first-occurrence order.
//
// Index i here is row i of the embedding matrix, and neighbour ties are
// broken by lowest index, so the ordering has to be reproducible.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Deduplicate `tokens`, keeping the position of each first occurrence.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut vocab = Self::default();
        for token in tokens {
            vocab.insert(token);
        }
        vocab
    }

    /// Add `word` if unseen and return its index either way.
    pub fn insert(&mut self, word: String) -> usize {
        if let Some(&i) = self.index.get(&word) {
            return i;
        }
        let i = self.words.len();
        self.index.insert(word.clone(), i);
        self.words.push(word);
        i
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
