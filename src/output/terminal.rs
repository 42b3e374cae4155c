// Colored terminal output for task results and run summaries.
//
// main.rs delegates all display here, so the rest of the crate never
// prints.

use colored::Colorize;

use crate::analysis::{AmountTotal, SimilarityPair, WordCount};
use crate::pipeline::{RunReport, TaskOutput, TaskResult};
use crate::store::StoredResult;

/// Display any task result in the layout that suits its kind.
pub fn display_result(result: &TaskResult) {
    match &result.output {
        TaskOutput::Frequency(words) => display_frequency(&result.task, words),
        TaskOutput::Similarity(pairs) => display_similarity(&result.task, pairs),
        TaskOutput::Amount(total) => display_amount(&result.task, total),
    }
}

/// Top words as a bar chart scaled to the most frequent word.
pub fn display_frequency(task: &str, words: &[WordCount]) {
    println!("\n{}", format!("=== {task}: Most Common Words ===").bold());
    if words.is_empty() {
        println!("  No qualifying words found.");
        return;
    }
    println!();

    let bar_width: usize = 30;
    let max = words.iter().map(|w| w.count).max().unwrap_or(1).max(1);

    for (i, w) in words.iter().enumerate() {
        let filled = ((w.count as f64 / max as f64) * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        println!(
            "  {:>2}. {:<20} {} {}",
            i + 1,
            w.word.bold(),
            bar.bright_green(),
            w.count
        );
    }
    println!();
}

/// Closest word pairs as a table, most similar first.
pub fn display_similarity(task: &str, pairs: &[SimilarityPair]) {
    println!("\n{}", format!("=== {task}: Most Similar Word Pairs ===").bold());
    if pairs.is_empty() {
        println!("  No pairs found.");
        return;
    }
    println!();

    println!(
        "  {:>4}  {:<24} {:<24} {:>8}",
        "Rank".dimmed(),
        "Word".dimmed(),
        "Nearest".dimmed(),
        "Distance".dimmed(),
    );
    println!("  {}", "-".repeat(64).dimmed());

    for (i, p) in pairs.iter().enumerate() {
        println!(
            "  {:>4}. {:<24} {:<24} {}",
            i + 1,
            p.word1,
            p.word2,
            colorize_distance(p.distance),
        );
    }
    println!();
}

/// The dollar total, in billions.
pub fn display_amount(task: &str, total: &AmountTotal) {
    println!("\n{}", format!("=== {task}: Total Dollar Amount ===").bold());
    println!(
        "  {} billion",
        format!("${:.6}", total.billions()).bright_green().bold()
    );
    if total.matches > 0 {
        println!(
            "  {}",
            format!(
                "{} amounts matched, {} unparseable",
                total.matches, total.unparsed
            )
            .dimmed()
        );
    }
    println!();
}

/// One line per task: saved, or why not.
pub fn display_run_report(report: &RunReport, location: &str) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "\n{}",
        format!(
            "=== Run complete ({} ok, {} failed, {:.1}s) ===",
            report.succeeded(),
            report.failed(),
            elapsed.num_milliseconds() as f64 / 1000.0
        )
        .bold()
    );

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => println!(
                "  {} {:<8} {:<10} {} rows",
                "ok".green(),
                outcome.task,
                outcome.kind.as_str(),
                result.output.row_count()
            ),
            Err(e) => println!(
                "  {} {:<8} {:<10} {}",
                "!!".red().bold(),
                outcome.task,
                outcome.kind.as_str(),
                format!("{e:#}").red()
            ),
        }
    }
    println!("\n  Results stored in: {location}");
}

/// Persisted results overview.
pub fn display_stored(stored: &[StoredResult], location: &str) {
    println!("Results: {location}");
    if stored.is_empty() {
        println!("  No results saved yet. Run `cinder run` first.");
        return;
    }
    for s in stored {
        println!(
            "  {:<8} {:<10} {:>4} rows  (saved {})",
            s.task,
            s.kind.as_str(),
            s.rows,
            s.saved_at
        );
    }
}

fn colorize_distance(distance: f64) -> colored::ColoredString {
    let text = format!("{distance:>8.4}");
    if distance < 0.1 {
        text.bright_green()
    } else if distance < 0.3 {
        text.yellow()
    } else {
        text.normal()
    }
}
