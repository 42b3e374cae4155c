// Task results — the small fixed-schema tables handed to a result store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::task::TaskKind;
use crate::analysis::{AmountTotal, SimilarityPair, WordCount};

/// The output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TaskOutput {
    Frequency(Vec<WordCount>),
    Similarity(Vec<SimilarityPair>),
    Amount(AmountTotal),
}

impl TaskOutput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutput::Frequency(_) => TaskKind::Frequency,
            TaskOutput::Similarity(_) => TaskKind::Similarity,
            TaskOutput::Amount(_) => TaskKind::Amount,
        }
    }

    /// Number of table rows this output renders to.
    pub fn row_count(&self) -> usize {
        match self {
            TaskOutput::Frequency(words) => words.len(),
            TaskOutput::Similarity(pairs) => pairs.len(),
            TaskOutput::Amount(_) => 1,
        }
    }

    /// Render as string rows matching `kind().columns()`.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            TaskOutput::Frequency(words) => words
                .iter()
                .map(|w| vec![w.word.clone(), w.count.to_string()])
                .collect(),
            TaskOutput::Similarity(pairs) => pairs
                .iter()
                .map(|p| vec![p.word1.clone(), p.word2.clone(), p.distance.to_string()])
                .collect(),
            TaskOutput::Amount(total) => vec![vec![total.billions().to_string()]],
        }
    }

    /// Parse string rows back into an output of the given kind.
    ///
    /// The amount table only carries the total in billions, so match
    /// counts come back as zero.
    pub fn from_rows(kind: TaskKind, rows: &[Vec<String>]) -> Result<Self> {
        match kind {
            TaskKind::Frequency => rows
                .iter()
                .map(|row| {
                    Ok(WordCount {
                        word: cell(row, 0)?,
                        count: cell(row, 1)?.parse().context("Invalid count")?,
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(TaskOutput::Frequency),
            TaskKind::Similarity => rows
                .iter()
                .map(|row| {
                    Ok(SimilarityPair {
                        word1: cell(row, 0)?,
                        word2: cell(row, 1)?,
                        distance: cell(row, 2)?.parse().context("Invalid distance")?,
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(TaskOutput::Similarity),
            TaskKind::Amount => {
                let row = rows.first().context("Amount result has no rows")?;
                let billions: f64 = cell(row, 0)?.parse().context("Invalid amount")?;
                Ok(TaskOutput::Amount(AmountTotal {
                    total: billions * crate::analysis::amount::BILLION,
                    ..AmountTotal::default()
                }))
            }
        }
    }
}

fn cell(row: &[String], i: usize) -> Result<String> {
    row.get(i)
        .cloned()
        .with_context(|| format!("Row has {} cells, expected at least {}", row.len(), i + 1))
}

/// A named result, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: String,
    pub output: TaskOutput,
}

impl TaskResult {
    pub fn new(task: impl Into<String>, output: TaskOutput) -> Self {
        Self {
            task: task.into(),
            output,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.output.kind()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.kind().columns()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.output.rows()
    }
}
