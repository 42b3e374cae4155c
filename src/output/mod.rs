// Output formatting — terminal display and progress reporting.

pub mod terminal;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over `len` documents (or words), labelled `label`.
///
/// indicatif hides the bar on its own when stderr isn't a terminal, so
/// library callers and tests don't get bar noise.
pub fn document_progress(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template(&format!("  {label:<10} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
