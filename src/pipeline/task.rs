// Task descriptors — which documents a task reads and which analysis it runs.
//
// Tasks are plain data in a fixed list. A descriptor pairs a selector
// (row filter) with a kind (analysis + output schema); the runner does the
// rest. There is no per-task subclassing.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::result::{TaskOutput, TaskResult};
use crate::analysis::{AmountParser, FrequencyAnalyzer, SimilarityEngine};
use crate::corpus::{Corpus, Document, TEXT_COLUMN};
use crate::error::AnalysisError;
use crate::text::TextNormalizer;

/// Column name of the single-value amount result.
pub const AMOUNT_COLUMN: &str = "Total Dollar Amount Billion $";

/// Which analysis a task runs. Doubles as the result schema tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Frequency,
    Similarity,
    Amount,
}

impl TaskKind {
    /// The fixed column schema of this kind's result table.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TaskKind::Frequency => &["word", "count"],
            TaskKind::Similarity => &["word1", "word2", "distance"],
            TaskKind::Amount => &[AMOUNT_COLUMN],
        }
    }

    /// Recognise a result schema from its header row.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Option<Self> {
        [TaskKind::Frequency, TaskKind::Similarity, TaskKind::Amount]
            .into_iter()
            .find(|kind| {
                let expected = kind.columns();
                expected.len() == columns.len()
                    && expected.iter().zip(columns).all(|(e, c)| *e == c.as_ref())
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Frequency => "frequency",
            TaskKind::Similarity => "similarity",
            TaskKind::Amount => "amount",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row filter applied to the corpus before a task's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selector {
    /// Every document
    All,
    /// Documents with this gender and an age in `min_age..=max_age`
    GenderAge {
        gender: String,
        min_age: u32,
        max_age: u32,
    },
}

impl Selector {
    /// Corpus columns this selector reads.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Selector::All => &[],
            Selector::GenderAge { .. } => &["gender", "age"],
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Selector::All => true,
            Selector::GenderAge {
                gender,
                min_age,
                max_age,
            } => {
                doc.gender.as_deref() == Some(gender.as_str())
                    && doc.age.is_some_and(|age| (*min_age..=*max_age).contains(&age))
            }
        }
    }

    /// Texts of the matching documents, in corpus order.
    pub fn select<'c>(&self, corpus: &'c Corpus) -> Vec<&'c str> {
        corpus
            .documents
            .iter()
            .filter(|doc| self.matches(doc))
            .map(|doc| doc.text.as_str())
            .collect()
    }
}

/// Everything a task needs to run, shared read-only between tasks.
pub struct Analyzers {
    pub normalizer: TextNormalizer,
    pub frequency: FrequencyAnalyzer,
    pub similarity: SimilarityEngine,
    pub amounts: AmountParser,
}

impl Analyzers {
    /// Analyzers with their default settings around `normalizer`.
    pub fn new(normalizer: TextNormalizer) -> anyhow::Result<Self> {
        Ok(Self {
            normalizer,
            frequency: FrequencyAnalyzer::default(),
            similarity: SimilarityEngine::default(),
            amounts: AmountParser::new()?,
        })
    }
}

/// One entry in the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Persistence name, e.g. "Task1"
    pub name: String,
    pub selector: Selector,
    pub kind: TaskKind,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>, selector: Selector, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            selector,
            kind,
        }
    }

    /// Columns that must exist before this task can run.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut cols = vec![TEXT_COLUMN];
        cols.extend_from_slice(self.selector.required_columns());
        cols
    }

    /// Fail with `MissingColumn` if the corpus can't serve this task.
    pub fn validate(&self, corpus: &Corpus) -> Result<(), AnalysisError> {
        self.required_columns()
            .into_iter()
            .try_for_each(|col| corpus.require_column(col))
    }

    /// Select this task's documents and run its analysis.
    pub fn execute(
        &self,
        corpus: &Corpus,
        analyzers: &Analyzers,
    ) -> Result<TaskResult, AnalysisError> {
        self.validate(corpus)?;
        let texts = self.selector.select(corpus);
        info!(task = %self.name, selected = texts.len(), "Selected documents");

        let output = match self.kind {
            TaskKind::Frequency => {
                TaskOutput::Frequency(analyzers.frequency.analyze(&analyzers.normalizer, &texts))
            }
            TaskKind::Similarity => TaskOutput::Similarity(
                analyzers.similarity.analyze(&analyzers.normalizer, &texts)?,
            ),
            TaskKind::Amount => TaskOutput::Amount(analyzers.amounts.extract_total(&texts)),
        };

        Ok(TaskResult::new(self.name.clone(), output))
    }
}

/// The standard task list:
///
/// 1. Top words written by women aged 20 to 30
/// 2. Closest word pairs across the whole corpus
/// 3. Total dollars mentioned across the whole corpus
pub fn default_tasks() -> Vec<TaskDescriptor> {
    vec![
        TaskDescriptor::new(
            "Task1",
            Selector::GenderAge {
                gender: "female".to_string(),
                min_age: 20,
                max_age: 30,
            },
            TaskKind::Frequency,
        ),
        TaskDescriptor::new("Task2", Selector::All, TaskKind::Similarity),
        TaskDescriptor::new("Task3", Selector::All, TaskKind::Amount),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(gender: Option<&str>, age: Option<u32>) -> Document {
        Document {
            text: "x".to_string(),
            gender: gender.map(str::to_string),
            age,
            ..Document::default()
        }
    }

    #[test]
    fn test_gender_age_selector_bounds_inclusive() {
        let sel = Selector::GenderAge {
            gender: "female".to_string(),
            min_age: 20,
            max_age: 30,
        };
        assert!(sel.matches(&doc(Some("female"), Some(20))));
        assert!(sel.matches(&doc(Some("female"), Some(30))));
        assert!(!sel.matches(&doc(Some("female"), Some(19))));
        assert!(!sel.matches(&doc(Some("female"), Some(31))));
        assert!(!sel.matches(&doc(Some("male"), Some(25))));
        assert!(!sel.matches(&doc(Some("female"), None)));
        assert!(!sel.matches(&doc(None, Some(25))));
    }

    #[test]
    fn test_kind_from_columns() {
        assert_eq!(TaskKind::from_columns(&["word", "count"]), Some(TaskKind::Frequency));
        assert_eq!(
            TaskKind::from_columns(&["word1", "word2", "distance"]),
            Some(TaskKind::Similarity)
        );
        assert_eq!(TaskKind::from_columns(&[AMOUNT_COLUMN]), Some(TaskKind::Amount));
        assert_eq!(TaskKind::from_columns(&["word"]), None);
    }

    #[test]
    fn test_default_tasks() {
        let tasks = default_tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Task1", "Task2", "Task3"]);
        assert_eq!(tasks[0].required_columns(), vec!["text", "gender", "age"]);
        assert_eq!(tasks[2].required_columns(), vec!["text"]);
    }

    #[test]
    fn test_validate_reports_missing_column() {
        let corpus = Corpus::new(vec!["text".to_string()], vec![]);
        let task = &default_tasks()[0];
        match task.validate(&corpus) {
            Err(AnalysisError::MissingColumn(col)) => assert_eq!(col, "gender"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
