// Subword embedding model in the fastText style.
//
// A word's vector is the mean of its own row and one row per hashed
// character n-gram of "<word>". Words that share spelling share n-gram
// rows, so they land near each other even when they never co-occur.
//
// Training is skip-gram with negative sampling. When every sentence is a
// single word there are no (center, context) pairs and the vectors keep
// their seeded initialisation, which is fine: the n-gram sharing alone
// carries the similarity signal.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::vocabulary::Vocabulary;
use crate::error::AnalysisError;

/// Hyperparameters for the subword model.
#[derive(Debug, Clone)]
pub struct EmbeddingParams {
    /// Vector dimension
    pub dim: usize,
    /// Shortest character n-gram
    pub min_n: usize,
    /// Longest character n-gram
    pub max_n: usize,
    /// Number of hash buckets n-grams are folded into
    pub buckets: u32,
    /// Max skip-gram context window (sampled uniformly from 1..=window)
    pub window: usize,
    /// Negative samples per positive pair
    pub negative: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            dim: 50,
            min_n: 3,
            max_n: 6,
            buckets: 2_000_000,
            window: 5,
            negative: 5,
            epochs: 5,
            learning_rate: 0.025,
            seed: 1,
        }
    }
}

/// A trained subword model. Rows are indexed by vocabulary position.
pub struct SubwordModel {
    params: EmbeddingParams,
    vocab: Vocabulary,
    counts: Vec<u64>,
    /// Bucket ids of each word's n-grams
    subwords: Vec<Vec<u32>>,
    word_rows: Vec<Vec<f32>>,
    /// Only buckets some vocabulary word hashes into are materialised
    ngram_rows: HashMap<u32, Vec<f32>>,
    output_rows: Vec<Vec<f32>>,
    /// Cumulative count^0.75 weights for negative sampling
    noise: Vec<f64>,
}

impl SubwordModel {
    /// Build the vocabulary from `sentences`, initialise and train.
    ///
    /// The vocabulary keeps first-occurrence order, so row i of the model
    /// is the i-th distinct word of the input. Every word is kept, however
    /// rare; only empty input fails.
    pub fn train(sentences: &[Vec<String>], params: EmbeddingParams) -> Result<Self, AnalysisError> {
        let mut vocab = Vocabulary::default();
        let mut counts: Vec<u64> = Vec::new();
        for word in sentences.iter().flatten() {
            let i = vocab.insert(word.clone());
            if i == counts.len() {
                counts.push(0);
            }
            counts[i] += 1;
        }

        if vocab.is_empty() {
            return Err(AnalysisError::InsufficientVocabulary { found: 0 });
        }

        let mut model = Self::initialise(vocab, counts, params);
        model.run_epochs(sentences);
        Ok(model)
    }

    fn initialise(vocab: Vocabulary, counts: Vec<u64>, params: EmbeddingParams) -> Self {
        let dim = params.dim;
        let bound = 1.0 / dim as f32;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let word_rows: Vec<Vec<f32>> = (0..vocab.len())
            .map(|_| random_row(&mut rng, dim, bound))
            .collect();

        let subwords: Vec<Vec<u32>> = vocab
            .words()
            .iter()
            .map(|w| subword_buckets(w, params.min_n, params.max_n, params.buckets))
            .collect();

        // Each bucket gets its own RNG stream so its initial row doesn't
        // depend on which other buckets the vocabulary happens to touch.
        let mut ngram_rows = HashMap::new();
        for &bucket in subwords.iter().flatten() {
            ngram_rows.entry(bucket).or_insert_with(|| {
                let mut bucket_rng = StdRng::seed_from_u64(
                    params.seed ^ (u64::from(bucket) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                );
                random_row(&mut bucket_rng, dim, bound)
            });
        }

        let mut cumulative = 0.0;
        let noise = counts
            .iter()
            .map(|&c| {
                cumulative += (c as f64).powf(0.75);
                cumulative
            })
            .collect();

        debug!(
            words = vocab.len(),
            ngram_buckets = ngram_rows.len(),
            dim,
            "Initialised subword model"
        );

        Self {
            output_rows: vec![vec![0.0; dim]; vocab.len()],
            params,
            vocab,
            counts,
            subwords,
            word_rows,
            ngram_rows,
            noise,
        }
    }

    fn run_epochs(&mut self, sentences: &[Vec<String>]) {
        let encoded: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| s.iter().filter_map(|w| self.vocab.index_of(w)).collect())
            .collect();

        let words_per_epoch: usize = encoded.iter().map(Vec::len).sum();
        let total = (words_per_epoch * self.params.epochs).max(1) as f32;
        let lr0 = self.params.learning_rate;
        let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(1));
        let mut processed = 0usize;
        let mut pairs = 0usize;

        for _ in 0..self.params.epochs {
            for sentence in &encoded {
                let lr = (lr0 * (1.0 - processed as f32 / total)).max(lr0 * 1e-4);
                processed += sentence.len();
                if sentence.len() < 2 {
                    continue;
                }

                for (pos, &center) in sentence.iter().enumerate() {
                    let span = rng.random_range(1..=self.params.window.max(1));
                    let start = pos.saturating_sub(span);
                    let end = (pos + span + 1).min(sentence.len());
                    for (ctx, &target) in sentence.iter().enumerate().take(end).skip(start) {
                        if ctx != pos {
                            self.update(center, target, lr, &mut rng);
                            pairs += 1;
                        }
                    }
                }
            }
        }

        info!(
            words = self.vocab.len(),
            epochs = self.params.epochs,
            training_pairs = pairs,
            "Trained subword embeddings"
        );
    }

    /// One skip-gram step: pull `center` toward `target` and away from
    /// sampled noise words.
    fn update(&mut self, center: usize, target: usize, lr: f32, rng: &mut StdRng) {
        let dim = self.params.dim;
        let hidden = self.raw_vector(center);
        let mut grad = vec![0.0f32; dim];

        let mut samples = Vec::with_capacity(self.params.negative + 1);
        samples.push((target, 1.0f32));
        for _ in 0..self.params.negative {
            let noise = self.sample_noise(rng);
            if noise != target {
                samples.push((noise, 0.0));
            }
        }

        for (word, label) in samples {
            let out = &mut self.output_rows[word];
            let dot: f32 = out.iter().zip(&hidden).map(|(o, h)| o * h).sum();
            let g = lr * (label - sigmoid(dot));
            for k in 0..dim {
                grad[k] += g * out[k];
                out[k] += g * hidden[k];
            }
        }

        add_into(&mut self.word_rows[center], &grad);
        for bucket in &self.subwords[center] {
            if let Some(row) = self.ngram_rows.get_mut(bucket) {
                add_into(row, &grad);
            }
        }
    }

    fn sample_noise(&self, rng: &mut StdRng) -> usize {
        let total = self.noise.last().copied().unwrap_or(0.0);
        let r = rng.random::<f64>() * total;
        self.noise
            .partition_point(|&c| c <= r)
            .min(self.noise.len().saturating_sub(1))
    }

    /// Mean of the word row and its n-gram rows.
    fn raw_vector(&self, index: usize) -> Vec<f32> {
        let mut sum = self.word_rows[index].clone();
        let mut parts = 1usize;
        for bucket in &self.subwords[index] {
            if let Some(row) = self.ngram_rows.get(bucket) {
                add_into(&mut sum, row);
                parts += 1;
            }
        }
        let n = parts as f32;
        sum.iter_mut().for_each(|v| *v /= n);
        sum
    }

    /// The embedding for `word`, if it's in the vocabulary.
    pub fn vector(&self, word: &str) -> Option<Vec<f32>> {
        self.vocab.index_of(word).map(|i| self.raw_vector(i))
    }

    /// Every word's embedding, in vocabulary order.
    pub fn vectors(&self) -> Vec<Vec<f32>> {
        (0..self.vocab.len()).map(|i| self.raw_vector(i)).collect()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn count(&self, word: &str) -> Option<u64> {
        self.vocab.index_of(word).map(|i| self.counts[i])
    }

    pub fn dim(&self) -> usize {
        self.params.dim
    }
}

/// Character n-grams of `<word>` with lengths in `min_n..=max_n`.
pub fn char_ngrams(word: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let chars: Vec<char> = format!("<{word}>").chars().collect();
    let mut ngrams = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > chars.len() {
            continue;
        }
        for window in chars.windows(n) {
            ngrams.push(window.iter().collect());
        }
    }
    ngrams
}

/// Hash bucket of every n-gram of `word`.
pub fn subword_buckets(word: &str, min_n: usize, max_n: usize, buckets: u32) -> Vec<u32> {
    char_ngrams(word, min_n, max_n)
        .iter()
        .map(|g| fnv1a(g.as_bytes()) % buckets.max(1))
        .collect()
}

/// 32-bit FNV-1a.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5u32, |h, &b| {
        (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
    })
}

fn random_row(rng: &mut StdRng, dim: usize, bound: f32) -> Vec<f32> {
    (0..dim).map(|_| rng.random_range(-bound..bound)).collect()
}

fn add_into(target: &mut [f32], delta: &[f32]) {
    for (t, d) in target.iter_mut().zip(delta) {
        *t += d;
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
