//! Progress events emitted during a run

use tracing::{info, warn};

/// Run phase, used to label token refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CreateList,
    Bulk,
    Enrich,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::CreateList => "create_list",
            Phase::Bulk => "bulk",
            Phase::Enrich => "enrich",
        }
    }
}

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        run_id: String,
        total_rows: usize,
        valid_rows: usize,
        batches: usize,
    },
    ListResolved {
        list_key: String,
        created: bool,
    },
    TokenRefreshed {
        phase: Phase,
    },
    /// `index` is 1-based
    BatchCompleted {
        index: usize,
        total: usize,
        size: usize,
        summary: String,
        after_refresh: bool,
    },
    BatchFailed {
        index: usize,
        total: usize,
        size: usize,
        error: String,
    },
    /// `row` is the 0-based input row
    RowEnriched {
        row: usize,
        email: String,
    },
    RowFailed {
        row: usize,
        email: String,
        error: String,
    },
    RowSkipped {
        row: usize,
    },
    Finished {
        enriched: usize,
        errors: usize,
    },
}

/// Receives events as a run progresses
pub trait ProgressSink {
    fn on_event(&mut self, event: &UploadEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_event(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::BatchCompleted {
                index,
                total,
                summary,
                after_refresh,
                ..
            } => info!(batch = index, total, after_refresh, summary = %summary, "Batch added"),
            UploadEvent::BatchFailed {
                index, total, error, ..
            } => warn!(batch = index, total, error = %error, "Batch failed"),
            UploadEvent::RowFailed { row, email, error } => {
                warn!(row, email = %email, error = %error, "Contact update failed")
            }
            UploadEvent::ListResolved { list_key, created } => {
                info!(list_key = %list_key, created, "List ready")
            }
            UploadEvent::Finished { enriched, errors } => {
                info!(enriched, errors, "Enrichment finished")
            }
            _ => {}
        }
    }
}

/// Keeps every event, for inspection after a run
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<UploadEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, UploadEvent::BatchFailed { .. }))
            .count()
    }

    pub fn refreshes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, UploadEvent::TokenRefreshed { .. }))
            .count()
    }
}

impl ProgressSink for CollectingSink {
    fn on_event(&mut self, event: &UploadEvent) {
        self.events.push(event.clone());
    }
}
