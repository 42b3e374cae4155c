// Keyword frequency — the most common consonant-bounded words in a corpus.
//
// Every document feeds one shared tally. The tally is a plain value folded
// over the documents and dropped when `analyze` returns, so repeated runs
// over the same input can't leak counts into each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::output::document_progress;
use crate::text::TextNormalizer;

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// A word and how many times it appeared across the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Frequency-based keyword extractor.
pub struct FrequencyAnalyzer {
    /// How many words to return
    pub top_n: usize,
    /// Shortest word (in characters) that qualifies
    pub min_len: usize,
}

impl Default for FrequencyAnalyzer {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_len: 5,
        }
    }
}

impl FrequencyAnalyzer {
    /// Count qualifying words across `documents` and return the top N,
    /// most frequent first.
    ///
    /// Equal counts keep the order in which the words were first seen.
    /// An empty or fully filtered corpus gives an empty result.
    pub fn analyze<S: AsRef<str>>(
        &self,
        normalizer: &TextNormalizer,
        documents: &[S],
    ) -> Vec<WordCount> {
        info!(documents = documents.len(), "Counting keyword frequencies");
        let pb = document_progress(documents.len(), "Keywords");

        let tally = documents.iter().fold(Tally::default(), |mut tally, doc| {
            for word in normalizer.normalize(doc.as_ref()) {
                if self.qualifies(&word) {
                    tally.add(word);
                }
            }
            pb.inc(1);
            tally
        });
        pb.finish_and_clear();

        let distinct = tally.len();
        let ranked = tally.into_ranked(self.top_n);

        info!(
            distinct_words = distinct,
            returned = ranked.len(),
            top_word = ranked.first().map(|w| w.word.as_str()).unwrap_or(""),
            "Ranked keyword frequencies"
        );
        ranked
    }

    /// At least `min_len` characters, and neither the first nor the last
    /// character is a vowel.
    pub fn qualifies(&self, word: &str) -> bool {
        if word.chars().count() < self.min_len {
            return false;
        }
        match (word.chars().next(), word.chars().last()) {
            (Some(first), Some(last)) => !VOWELS.contains(&first) && !VOWELS.contains(&last),
            _ => false,
        }
    }
}

/// Word counts in first-seen order.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    counts: Vec<WordCount>,
}

impl Tally {
    fn add(&mut self, word: String) {
        match self.index.get(&word) {
            Some(&i) => self.counts[i].count += 1,
            None => {
                self.index.insert(word.clone(), self.counts.len());
                self.counts.push(WordCount { word, count: 1 });
            }
        }
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn into_ranked(self, top_n: usize) -> Vec<WordCount> {
        let mut counts = self.counts;
        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(top_n);
        counts
    }
}
