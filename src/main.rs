use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use cinder::config::{Config, StoreBackend};
use cinder::pipeline::{self, Analyzers, RunMode, TaskDescriptor};
use cinder::store;
use cinder::text::{Dictionary, TextNormalizer};

/// Cinder: batch text analytics over blog corpora.
///
/// Finds the most common keywords in a slice of the corpus, the most
/// similar word pairs by subword embedding, and the total dollar amount
/// mentioned across every post.
#[derive(Parser)]
#[command(name = "cinder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyses over the corpus and persist the results
    Run {
        /// Run only these tasks (default: all three)
        #[arg(long = "task", value_enum)]
        tasks: Vec<TaskArg>,

        /// Run tasks concurrently instead of one after another
        #[arg(long)]
        parallel: bool,

        /// Corpus CSV file or directory (overrides CINDER_CORPUS_PATH)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Reference word list (overrides CINDER_DICTIONARY_PATH)
        #[arg(long)]
        dictionary: Option<PathBuf>,

        /// Where to persist results (overrides CINDER_STORE)
        #[arg(long, value_enum)]
        store: Option<StoreArg>,

        /// Seed for embedding initialisation (overrides CINDER_EMBEDDING_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show a persisted task result
    Show {
        /// Task name, e.g. Task1
        task: String,

        #[arg(long, value_enum)]
        store: Option<StoreArg>,
    },

    /// List persisted results
    Status {
        #[arg(long, value_enum)]
        store: Option<StoreArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TaskArg {
    /// Most common words, women aged 20-30
    Task1,
    /// Most similar word pairs
    Task2,
    /// Total dollar amount
    Task3,
}

impl TaskArg {
    fn name(self) -> &'static str {
        match self {
            TaskArg::Task1 => "Task1",
            TaskArg::Task2 => "Task2",
            TaskArg::Task3 => "Task3",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreArg {
    Csv,
    Sqlite,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Csv => StoreBackend::Csv,
            StoreArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cinder=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Run {
            tasks,
            parallel,
            corpus,
            dictionary,
            store,
            seed,
        } => {
            if let Some(path) = corpus {
                config.corpus_path = Some(path);
            }
            if let Some(path) = dictionary {
                config.dictionary_path = path;
            }
            if let Some(store) = store {
                config.store_backend = store.into();
            }
            if let Some(seed) = seed {
                config.embedding_seed = seed;
            }

            let corpus_path = config.require_corpus()?.to_path_buf();
            let dictionary_path = config.require_dictionary()?.to_path_buf();

            let selected = select_tasks(&tasks);
            let result_store = store::open_store(&config)?;

            info!("Loading reference dictionary...");
            let dictionary = Arc::new(Dictionary::load(&dictionary_path)?);

            info!("Loading corpus...");
            let corpus = Arc::new(cinder::corpus::load(&corpus_path)?);
            println!(
                "Loaded {} documents, {} dictionary words",
                corpus.len(),
                dictionary.len()
            );

            let mut analyzers = Analyzers::new(TextNormalizer::new(dictionary))?;
            analyzers.similarity.params.seed = config.embedding_seed;

            let mode = if parallel {
                RunMode::Parallel
            } else {
                RunMode::Sequential
            };

            let report = pipeline::run(
                corpus,
                Arc::new(analyzers),
                &selected,
                result_store.as_ref(),
                mode,
            )
            .await?;

            for outcome in &report.outcomes {
                if let Ok(result) = &outcome.result {
                    cinder::output::terminal::display_result(result);
                }
            }
            cinder::output::terminal::display_run_report(&report, &result_store.location());

            if report.failed() > 0 {
                println!(
                    "\n{}",
                    "Some tasks failed. Their previous results (if any) were left untouched."
                        .yellow()
                );
            }
        }

        Commands::Show { task, store } => {
            if let Some(store) = store {
                config.store_backend = store.into();
            }
            let result_store = store::open_store(&config)?;

            match result_store.load(&task).await? {
                Some(result) => cinder::output::terminal::display_result(&result),
                None => {
                    println!("No saved result for {task} in {}.", result_store.location());
                    println!("Run `cinder run` first.");
                }
            }
        }

        Commands::Status { store } => {
            if let Some(store) = store {
                config.store_backend = store.into();
            }
            let result_store = store::open_store(&config)?;
            let stored = result_store.list().await?;
            cinder::output::terminal::display_stored(&stored, &result_store.location());
        }
    }

    Ok(())
}

/// The default task list, narrowed to `requested` if any were named.
fn select_tasks(requested: &[TaskArg]) -> Vec<TaskDescriptor> {
    let all = pipeline::default_tasks();
    if requested.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|t| requested.iter().any(|r| r.name() == t.name))
        .collect()
}
