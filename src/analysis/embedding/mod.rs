// Word similarity — embed every qualifying word and rank the closest pairs.
//
// Each run builds its own vocabulary and model and throws both away at the
// end, so concurrent runs never share embedding state.

pub mod model;
pub mod neighbors;
pub mod vocabulary;

use serde::{Deserialize, Serialize};
use tracing::info;

use self::model::{EmbeddingParams, SubwordModel};
use self::neighbors::nearest_neighbors;
use self::vocabulary::Vocabulary;
use crate::error::AnalysisError;
use crate::output::document_progress;
use crate::text::TextNormalizer;

/// A word, its nearest neighbour, and the cosine distance between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub word1: String,
    pub word2: String,
    pub distance: f64,
}

/// Finds the most similar word pairs in a corpus.
pub struct SimilarityEngine {
    /// How many pairs to return
    pub top_n: usize,
    /// Shortest qualifying word, in characters
    pub min_len: usize,
    /// Longest qualifying word, in characters
    pub max_len: usize,
    pub params: EmbeddingParams,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self {
            top_n: 50,
            min_len: 6,
            // Longest word in a major English dictionary
            max_len: 45,
            params: EmbeddingParams::default(),
        }
    }
}

impl SimilarityEngine {
    /// Build a vocabulary from `documents`, embed it, and return the
    /// closest (word, neighbour) pairs, most similar first.
    ///
    /// Fails with `InsufficientVocabulary` when fewer than two distinct
    /// words qualify.
    pub fn analyze<S: AsRef<str>>(
        &self,
        normalizer: &TextNormalizer,
        documents: &[S],
    ) -> Result<Vec<SimilarityPair>, AnalysisError> {
        let vocab = self.build_vocabulary(normalizer, documents);
        info!(
            documents = documents.len(),
            vocabulary = vocab.len(),
            "Built similarity vocabulary"
        );

        if vocab.len() < 2 {
            return Err(AnalysisError::InsufficientVocabulary { found: vocab.len() });
        }

        // One single-word sentence per vocabulary entry
        let sentences: Vec<Vec<String>> = vocab.words().iter().map(|w| vec![w.clone()]).collect();
        let model = SubwordModel::train(&sentences, self.params.clone())?;
        let words = model.vocabulary().words();

        let mut neighbors = nearest_neighbors(&model.vectors());
        // Stable: equal distances stay in vocabulary order
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(self.top_n);

        let pairs: Vec<SimilarityPair> = neighbors
            .into_iter()
            .map(|n| SimilarityPair {
                word1: words[n.index].clone(),
                word2: words[n.neighbor].clone(),
                distance: n.distance,
            })
            .collect();

        info!(
            pairs = pairs.len(),
            closest = pairs.first().map(|p| p.distance).unwrap_or(f64::NAN),
            "Ranked nearest-neighbour pairs"
        );
        Ok(pairs)
    }

    /// Every distinct qualifying word, in first-occurrence order.
    pub fn build_vocabulary<S: AsRef<str>>(
        &self,
        normalizer: &TextNormalizer,
        documents: &[S],
    ) -> Vocabulary {
        let pb = document_progress(documents.len(), "Vocabulary");
        let mut vocab = Vocabulary::default();
        for doc in documents {
            for word in normalizer.normalize(doc.as_ref()) {
                if self.qualifies(&word) {
                    vocab.insert(word);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        vocab
    }

    pub fn qualifies(&self, word: &str) -> bool {
        let len = word.chars().count();
        (self.min_len..=self.max_len).contains(&len)
    }
}
