// Corpus loading — turns a tabular file on disk into an in-memory Corpus.
//
// Acquiring the dataset is someone else's job; we accept either a CSV file
// or a directory holding one (the layout a dataset download leaves behind).

pub mod models;

pub use models::{Corpus, Document, TEXT_COLUMN};

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::info;

use crate::error::AnalysisError;

/// Load a corpus from a CSV file, or from the first entry of a directory.
///
/// Fails with `MissingColumn` if the file has no `text` column and with
/// `UnsupportedFormat` for anything that isn't a `.csv` file.
pub fn load(path: &Path) -> Result<Corpus> {
    let file_path = resolve_corpus_file(path)?;

    let is_csv = file_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AnalysisError::UnsupportedFormat(file_path.display().to_string()).into());
    }

    let file = File::open(&file_path)
        .with_context(|| format!("Failed to open corpus file: {}", file_path.display()))?;
    let corpus = read_csv(file)
        .with_context(|| format!("Failed to read corpus from {}", file_path.display()))?;

    info!(
        path = %file_path.display(),
        documents = corpus.len(),
        columns = corpus.columns.len(),
        "Loaded corpus"
    );

    Ok(corpus)
}

/// Parse CSV content into a corpus, looking columns up by header name.
pub fn read_csv<R: Read>(reader: R) -> Result<Corpus> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let find = |name: &str| columns.iter().position(|c| c == name);

    let text_idx = find(TEXT_COLUMN)
        .ok_or_else(|| AnalysisError::MissingColumn(TEXT_COLUMN.to_string()))?;
    let gender_idx = find("gender");
    let age_idx = find("age");
    let topic_idx = find("topic");
    let sign_idx = find("sign");

    let mut documents = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        documents.push(Document {
            text: record.get(text_idx).unwrap_or_default().to_string(),
            gender: field(gender_idx),
            // An age we can't read is treated as absent, never as a failure
            age: field(age_idx).and_then(|a| a.parse().ok()),
            topic: field(topic_idx),
            sign: field(sign_idx),
        });
    }

    Ok(Corpus::new(columns, documents))
}

fn resolve_corpus_file(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("Failed to list corpus directory {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    entries
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No dataset file found in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_by_header_name() {
        let data = "id,gender,age,topic,sign,date,text\n\
                    1,female,25,Student,Leo,01/01/2004,\"Hello there, world\"\n\
                    2,male,abc,,Aries,02/01/2004,second post\n";
        let corpus = read_csv(data.as_bytes()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert!(corpus.has_column("gender"));
        assert_eq!(corpus.documents[0].text, "Hello there, world");
        assert_eq!(corpus.documents[0].gender.as_deref(), Some("female"));
        assert_eq!(corpus.documents[0].age, Some(25));
        assert_eq!(corpus.documents[0].topic.as_deref(), Some("Student"));
        assert_eq!(corpus.documents[1].age, None, "bad age should be absent");
        assert_eq!(corpus.documents[1].topic, None, "blank topic should be absent");
    }

    #[test]
    fn test_passthrough_columns_tracked_by_presence() {
        let with = read_csv("text,topic,sign\nhi,Arts,Leo\n".as_bytes()).unwrap();
        assert!(with.has_column("topic") && with.has_column("sign"));
        assert_eq!(with.documents[0].sign.as_deref(), Some("Leo"));

        let without = read_csv("text\nhi\n".as_bytes()).unwrap();
        assert!(!without.has_column("topic") && !without.has_column("sign"));
        assert_eq!(without.documents[0].topic, None);
    }

    #[test]
    fn test_read_csv_without_text_column() {
        let data = "id,gender\n1,female\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        match err.downcast_ref::<AnalysisError>() {
            Some(AnalysisError::MissingColumn(col)) => assert_eq!(col, "text"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blogs.xlsx");
        std::fs::write(&path, b"not really a spreadsheet").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_from_directory_uses_first_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blogtext.csv"), "text\nfirst\nsecond\n").unwrap();

        let corpus = load(dir.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(!corpus.has_column("gender"));
    }

    #[test]
    fn test_load_from_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).is_err());
    }
}
