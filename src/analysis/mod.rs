// Analyzers — the three independent analyses run over a corpus.

pub mod amount;
pub mod embedding;
pub mod frequency;

pub use amount::{AmountParser, AmountTotal};
pub use embedding::{SimilarityEngine, SimilarityPair};
pub use frequency::{FrequencyAnalyzer, WordCount};
