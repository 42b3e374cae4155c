// Cinder: batch text analytics over blog corpora.
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: corpus -> text normalization -> analysis -> persisted results.

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod text;

pub use error::AnalysisError;
