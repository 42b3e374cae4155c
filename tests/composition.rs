// Composition tests — corpus file in, persisted results out.
//
// These run the whole pipeline: CSV loading -> task selection -> analysis
// -> result store. Filesystem fixtures live in temp directories.

use std::io::Write;
use std::sync::Arc;

use cinder::analysis::SimilarityPair;
use cinder::corpus::{self, Corpus, Document};
use cinder::pipeline::{
    self, Analyzers, RunMode, Selector, TaskDescriptor, TaskKind, TaskOutput, TaskResult,
};
use cinder::store::{CsvStore, ResultStore, SqliteStore};
use cinder::text::{Dictionary, TextNormalizer};
use cinder::AnalysisError;

fn analyzers(words: &[&str]) -> Arc<Analyzers> {
    let normalizer = TextNormalizer::new(Arc::new(Dictionary::from_words(words)));
    Arc::new(Analyzers::new(normalizer).unwrap())
}

fn write_corpus(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("blogtext.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

const BLOG_CSV: &str = "\
id,gender,age,topic,sign,date,text
1,female,25,Student,Leo,14/05/2004,\"A wonderful night, truly wonderful. Running and jumping!\"
2,female,28,Arts,Aries,15/05/2004,\"Wonderful wonderful wonderful. The runner spent $1,000 and $2 million.\"
3,male,25,Science,Virgo,16/05/2004,\"Walking walker thought about swimming for $3bn.\"
4,female,35,Banking,Libra,17/05/2004,\"Strong strong strong strong strong strong words.\"
";

const WORDS: &[&str] = &[
    "a", "night", "truly", "wonderful", "running", "and", "jumping", "the", "runner", "spent",
    "walking", "walker", "thought", "about", "swimming", "for", "strong", "words",
];

// ============================================================
// Full run: CSV corpus -> all three tasks -> CSV results
// ============================================================

#[tokio::test]
async fn full_run_persists_all_three_tasks_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_corpus(dir.path(), BLOG_CSV);
    let corpus = Arc::new(corpus::load(&corpus_path).unwrap());
    assert_eq!(corpus.len(), 4);

    let store = CsvStore::new(dir.path().join("results"));
    let report = pipeline::run(
        corpus,
        analyzers(WORDS),
        &pipeline::default_tasks(),
        &store,
        RunMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed(), 0);

    // Task1 only sees women aged 20-30, so "strong" (age 35) never counts
    match store.load("Task1").await.unwrap().unwrap().output {
        TaskOutput::Frequency(words) => {
            assert_eq!(words[0].word, "wonderful");
            assert_eq!(words[0].count, 5);
            assert!(words.iter().all(|w| w.word != "strong"));
        }
        other => panic!("expected frequency output, got {other:?}"),
    }

    match store.load("Task2").await.unwrap().unwrap().output {
        TaskOutput::Similarity(pairs) => {
            assert!(!pairs.is_empty());
            assert!(pairs.iter().all(|p| p.word1 != p.word2));
        }
        other => panic!("expected similarity output, got {other:?}"),
    }

    match store.load("Task3").await.unwrap().unwrap().output {
        TaskOutput::Amount(total) => {
            assert!((total.billions() - 3.002001).abs() < 1e-9);
        }
        other => panic!("expected amount output, got {other:?}"),
    }

    assert!(store.path_for("Task1").exists());
    let listed = store.list().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|s| s.task.as_str()).collect();
    assert_eq!(names, vec!["Task1", "Task2", "Task3"]);
}

// ============================================================
// Single-document amount scenario
// ============================================================

#[tokio::test]
async fn amount_task_over_single_document() {
    let corpus = Arc::new(Corpus::from_documents(vec![Document {
        text: "$1,000 and $2 million".to_string(),
        gender: Some("female".to_string()),
        age: Some(25),
        ..Document::default()
    }]));
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path());
    let tasks = vec![TaskDescriptor::new("Task3", Selector::All, TaskKind::Amount)];

    let report = pipeline::run(corpus, analyzers(&[]), &tasks, &store, RunMode::Sequential)
        .await
        .unwrap();

    let result = report.outcome("Task3").unwrap().result.as_ref().unwrap();
    match &result.output {
        TaskOutput::Amount(total) => {
            assert_eq!(total.total, 2_001_000.0);
            assert!((total.billions() - 2_001_000.0 / 1e9).abs() < 1e-15);
        }
        other => panic!("expected amount output, got {other:?}"),
    }
}

// ============================================================
// Failure isolation
// ============================================================

#[tokio::test]
async fn missing_column_stops_the_run_before_any_task() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_corpus(dir.path(), "text\n\"$5 and wonderful\"\n");
    let corpus = Arc::new(corpus::load(&corpus_path).unwrap());
    let store = CsvStore::new(dir.path().join("results"));

    let err = pipeline::run(
        corpus,
        analyzers(WORDS),
        &pipeline::default_tasks(),
        &store,
        RunMode::Sequential,
    )
    .await
    .unwrap_err();

    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::MissingColumn(col)) => assert_eq!(col, "gender"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
    assert!(store.list().await.unwrap().is_empty());
}

/// Seed `store` with an earlier Task2 result, then run Task2 and Task3 on a
/// corpus with no dictionary words. Task2 fails; its earlier result must
/// survive and Task3 must still be saved.
async fn assert_failed_task_keeps_prior_result(store: &dyn ResultStore) {
    let prior = TaskResult::new(
        "Task2",
        TaskOutput::Similarity(vec![SimilarityPair {
            word1: "runner".to_string(),
            word2: "running".to_string(),
            distance: 0.25,
        }]),
    );
    store.save(&prior).await.unwrap();

    let corpus = Arc::new(Corpus::from_documents(vec![Document::from_text(
        "zzzzz qwrtp cost $40k",
    )]));
    let tasks = vec![
        TaskDescriptor::new("Task2", Selector::All, TaskKind::Similarity),
        TaskDescriptor::new("Task3", Selector::All, TaskKind::Amount),
    ];

    let report = pipeline::run(corpus, analyzers(WORDS), &tasks, store, RunMode::Sequential)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let failed = report.outcome("Task2").unwrap();
    let err = failed.result.as_ref().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InsufficientVocabulary { found: 0 })
    ));

    assert_eq!(store.load("Task2").await.unwrap(), Some(prior));
    match store.load("Task3").await.unwrap().unwrap().output {
        TaskOutput::Amount(total) => assert!((total.total - 40_000.0).abs() < 1e-6),
        other => panic!("expected amount output, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_task_keeps_prior_csv_result() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path());
    assert_failed_task_keeps_prior_result(&store).await;
}

#[tokio::test]
async fn failed_task_keeps_prior_sqlite_result() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cinder.db");
    let store = SqliteStore::open(db_path.to_str().unwrap()).unwrap();
    assert_failed_task_keeps_prior_result(&store).await;
}

#[tokio::test]
async fn empty_frequency_result_is_still_persisted() {
    let corpus = Arc::new(Corpus::from_documents(vec![Document {
        text: "zzzzz qwrtp".to_string(),
        gender: Some("female".to_string()),
        age: Some(22),
        ..Document::default()
    }]));
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path());
    let tasks = vec![pipeline::default_tasks().remove(0)];

    let report = pipeline::run(corpus, analyzers(WORDS), &tasks, &store, RunMode::Sequential)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    let stored = store.load("Task1").await.unwrap().unwrap();
    assert_eq!(stored.output, TaskOutput::Frequency(vec![]));
}

// ============================================================
// Parallel mode and the SQLite store
// ============================================================

#[tokio::test]
async fn parallel_run_matches_sequential_run() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_corpus(dir.path(), BLOG_CSV);
    let corpus = Arc::new(corpus::load(&corpus_path).unwrap());
    let tasks = pipeline::default_tasks();
    let analyzers = analyzers(WORDS);

    let sequential = CsvStore::new(dir.path().join("sequential"));
    let parallel = CsvStore::new(dir.path().join("parallel"));

    pipeline::run(
        Arc::clone(&corpus),
        Arc::clone(&analyzers),
        &tasks,
        &sequential,
        RunMode::Sequential,
    )
    .await
    .unwrap();
    let report = pipeline::run(corpus, analyzers, &tasks, &parallel, RunMode::Parallel)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 3);
    let order: Vec<&str> = report.outcomes.iter().map(|o| o.task.as_str()).collect();
    assert_eq!(order, vec!["Task1", "Task2", "Task3"]);

    for task in ["Task1", "Task2", "Task3"] {
        assert_eq!(
            sequential.load(task).await.unwrap(),
            parallel.load(task).await.unwrap(),
            "{task} differs between modes"
        );
    }
}

#[tokio::test]
async fn sqlite_store_round_trips_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_corpus(dir.path(), BLOG_CSV);
    let corpus = Arc::new(corpus::load(&corpus_path).unwrap());
    let db_path = dir.path().join("cinder.db");
    let store = SqliteStore::open(db_path.to_str().unwrap()).unwrap();

    let report = pipeline::run(
        corpus,
        analyzers(WORDS),
        &pipeline::default_tasks(),
        &store,
        RunMode::Sequential,
    )
    .await
    .unwrap();

    for outcome in &report.outcomes {
        let saved = outcome.result.as_ref().unwrap();
        let loaded = store.load(&outcome.task).await.unwrap().unwrap();
        assert_eq!(loaded.kind(), saved.kind());
        assert_eq!(loaded.output.row_count(), saved.output.row_count());
    }
    assert_eq!(
        store.load("Task1").await.unwrap().as_ref(),
        report.outcome("Task1").unwrap().result.as_ref().ok()
    );
    assert_eq!(store.list().await.unwrap().len(), 3);
}
