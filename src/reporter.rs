//! Progress sinks for the analysis engine.
//!
//! The engine never reports through global state; callers hand it an
//! `Arc<dyn Reporter>`. Methods are called from worker threads.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::analysis::FileAnalysis;

/// Receives engine progress events.
pub trait Reporter: Send + Sync {
    /// Discovery finished with `total` files to analyse.
    fn started(&self, _total: usize) {}

    /// One file is done. `analysis` is None when the file could not be read.
    fn file_done(&self, _path: &str, _analysis: Option<&FileAnalysis>) {}

    /// All files are joined and aggregation is complete.
    fn finished(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Emits tracing events.
#[derive(Debug, Default)]
pub struct LogReporter {
    done: AtomicUsize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl Reporter for LogReporter {
    fn started(&self, total: usize) {
        info!(files = total, "analysis started");
    }

    fn file_done(&self, path: &str, analysis: Option<&FileAnalysis>) {
        self.done.fetch_add(1, Ordering::Relaxed);
        match analysis {
            Some(fa) => debug!(
                path,
                functions = fa.functions.len(),
                issues = fa.issues.len(),
                "file analysed"
            ),
            None => debug!(path, "file unreadable"),
        }
    }

    fn finished(&self) {
        info!(files = self.completed(), "analysis finished");
    }
}

/// Terminal progress bar, drawn on stderr when it is a TTY.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled && std::io::stderr().is_terminal() {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("█▓▒░  "))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl Reporter for ProgressReporter {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("analysing");
    }

    fn file_done(&self, path: &str, _analysis: Option<&FileAnalysis>) {
        self.bar.set_message(path.to_string());
        self.bar.inc(1);
    }

    fn finished(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter_counts() {
        let reporter = LogReporter::new();
        reporter.started(2);
        reporter.file_done("a.rs", None);
        reporter.file_done("b.rs", None);
        reporter.finished();
        assert_eq!(reporter.completed(), 2);
    }

    #[test]
    fn test_progress_disabled_is_hidden() {
        let reporter = ProgressReporter::new(false);
        assert!(reporter.is_hidden());
        reporter.started(1);
        reporter.file_done("a.rs", None);
        reporter.finished();
    }
}
