//! Terminal progress for upload runs
//!
//! Renders pipeline events with `indicatif`: one bar for bulk batches and one
//! for contact enrichment. Batch outcomes are printed above the bars.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::pipeline::{ProgressSink, UploadEvent};

/// Progress bars driven by [`UploadEvent`]s
pub struct BarSink {
    multi: MultiProgress,
    batches_bar: Option<ProgressBar>,
    rows_bar: Option<ProgressBar>,
    total_rows: u64,
    batches_ok: usize,
    batches_failed: usize,
}

impl BarSink {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            batches_bar: None,
            rows_bar: None,
            total_rows: 0,
            batches_ok: 0,
            batches_failed: 0,
        }
    }

    fn bar(&self, len: u64, unit: &str) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(len));
        bar.set_style(
            ProgressStyle::with_template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>5}}/{{len:5}} {} {{msg}}",
                unit
            ))
            .unwrap()
            .progress_chars("█▓▒░  "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }

    fn rows_bar(&mut self) -> &ProgressBar {
        if self.rows_bar.is_none() {
            if let Some(bar) = self.batches_bar.take() {
                bar.finish_and_clear();
            }
            self.rows_bar = Some(self.bar(self.total_rows, "rows"));
        }
        self.rows_bar.get_or_insert_with(ProgressBar::hidden)
    }

    pub fn batches_ok(&self) -> usize {
        self.batches_ok
    }

    pub fn batches_failed(&self) -> usize {
        self.batches_failed
    }
}

impl Default for BarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarSink {
    fn on_event(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Started {
                total_rows,
                batches,
                ..
            } => {
                self.total_rows = *total_rows as u64;
                if *batches > 0 {
                    self.batches_bar = Some(self.bar(*batches as u64, "batches"));
                }
            }
            UploadEvent::ListResolved { list_key, created } => {
                let verb = if *created { "Created" } else { "Using" };
                self.println(format!("{} list {}", verb, list_key));
            }
            UploadEvent::TokenRefreshed { phase } => {
                self.println(format!("  ↻ Access token refreshed ({})", phase.name()));
            }
            UploadEvent::BatchCompleted {
                index,
                total,
                summary,
                after_refresh,
                ..
            } => {
                self.batches_ok += 1;
                let suffix = if *after_refresh { " after refresh" } else { "" };
                self.println(format!("  ✓ Batch {}/{} OK{}: {}", index, total, suffix, summary));
                if let Some(bar) = &self.batches_bar {
                    bar.inc(1);
                }
            }
            UploadEvent::BatchFailed {
                index,
                total,
                error,
                ..
            } => {
                self.batches_failed += 1;
                self.println(format!("  ⚠ Batch {}/{} failed: {}", index, total, error));
                if let Some(bar) = &self.batches_bar {
                    bar.inc(1);
                }
            }
            UploadEvent::RowEnriched { .. } | UploadEvent::RowSkipped { .. } => {
                self.rows_bar().inc(1);
            }
            UploadEvent::RowFailed { row, email, error } => {
                self.println(format!("  ✗ Row {} ({}): {}", row + 1, email, error));
                self.rows_bar().inc(1);
            }
            UploadEvent::Finished { enriched, errors } => {
                if let Some(bar) = self.batches_bar.take() {
                    bar.finish_and_clear();
                }
                let message = format!("✓ {} enriched, {} errors", enriched, errors);
                match self.rows_bar.take() {
                    Some(bar) => bar.finish_with_message(message),
                    None => eprintln!("{}", message),
                }
            }
        }
    }
}

/// Simple spinner for single blocking calls
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with a message
    pub fn new(msg: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_sink_tallies_batches() {
        let mut sink = BarSink::new();
        sink.on_event(&UploadEvent::Started {
            run_id: "r".to_string(),
            total_rows: 2,
            valid_rows: 2,
            batches: 2,
        });
        sink.on_event(&UploadEvent::BatchCompleted {
            index: 1,
            total: 2,
            size: 10,
            summary: "ok".to_string(),
            after_refresh: false,
        });
        sink.on_event(&UploadEvent::BatchFailed {
            index: 2,
            total: 2,
            size: 3,
            error: "HTTP 500".to_string(),
        });
        sink.on_event(&UploadEvent::RowEnriched {
            row: 0,
            email: "a@b".to_string(),
        });
        sink.on_event(&UploadEvent::Finished {
            enriched: 1,
            errors: 0,
        });
        assert_eq!(sink.batches_ok(), 1);
        assert_eq!(sink.batches_failed(), 1);
    }
}
