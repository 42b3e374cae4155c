// Pipeline runner — corpus in, persisted task results out.
//
// Flow per run:
//   1. Check every task's required columns up front, so a bad corpus fails
//      before any analysis starts.
//   2. Run each task (one after another, or fanned out on blocking threads).
//   3. Persist each successful result. A failed task is reported alongside
//      the others; it never stops or overwrites its siblings.

pub mod result;
pub mod task;

pub use result::{TaskOutput, TaskResult};
pub use task::{default_tasks, Analyzers, Selector, TaskDescriptor, TaskKind};

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::corpus::Corpus;
use crate::store::ResultStore;

/// How tasks are scheduled within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One task at a time, in list order
    #[default]
    Sequential,
    /// Every task on its own blocking thread
    Parallel,
}

/// What happened to one task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: String,
    pub kind: TaskKind,
    /// The persisted result, or why there isn't one
    pub result: Result<TaskResult>,
    pub elapsed: Duration,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a whole run.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TaskOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn outcome(&self, task: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task == task)
    }
}

/// Run `tasks` over `corpus` and hand each result to `store`.
///
/// Returns an error only for problems that stop the whole run (a missing
/// column). Per-task failures land in the report.
pub async fn run(
    corpus: Arc<Corpus>,
    analyzers: Arc<Analyzers>,
    tasks: &[TaskDescriptor],
    store: &dyn ResultStore,
    mode: RunMode,
) -> Result<RunReport> {
    let started_at = Utc::now();

    for task in tasks {
        task.validate(&corpus)
            .with_context(|| format!("{} cannot run on this corpus", task.name))?;
    }

    info!(
        tasks = tasks.len(),
        documents = corpus.len(),
        mode = ?mode,
        "Starting analysis run"
    );

    let computed: Vec<(Result<TaskResult>, Duration)> = match mode {
        RunMode::Sequential => {
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                results.push(execute_timed(task, &corpus, &analyzers));
            }
            results
        }
        RunMode::Parallel => {
            let handles = tasks.iter().cloned().map(|task| {
                let corpus = Arc::clone(&corpus);
                let analyzers = Arc::clone(&analyzers);
                tokio::task::spawn_blocking(move || execute_timed(&task, &corpus, &analyzers))
            });
            futures::future::join_all(handles)
                .await
                .into_iter()
                .map(|joined| match joined {
                    Ok(done) => done,
                    Err(e) => (
                        Err(anyhow::anyhow!("Task thread panicked: {e}")),
                        Duration::ZERO,
                    ),
                })
                .collect()
        }
    };

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (task, (result, elapsed)) in tasks.iter().zip(computed) {
        let result = match result {
            Ok(task_result) => persist(store, task_result).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(r) => info!(
                task = %task.name,
                rows = r.output.row_count(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Task finished"
            ),
            Err(e) => warn!(task = %task.name, error = %e, "Task failed, skipping persistence"),
        }

        outcomes.push(TaskOutcome {
            task: task.name.clone(),
            kind: task.kind,
            result,
            elapsed,
        });
    }

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        outcomes,
    };
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Analysis run complete"
    );
    Ok(report)
}

fn execute_timed(
    task: &TaskDescriptor,
    corpus: &Corpus,
    analyzers: &Analyzers,
) -> (Result<TaskResult>, Duration) {
    let start = Instant::now();
    info!(task = %task.name, kind = %task.kind, "Starting task");
    let result = task.execute(corpus, analyzers).map_err(anyhow::Error::from);
    (result, start.elapsed())
}

async fn persist(store: &dyn ResultStore, result: TaskResult) -> Result<TaskResult> {
    store
        .save(&result)
        .await
        .with_context(|| format!("Failed to persist results for {}", result.task))?;
    Ok(result)
}
