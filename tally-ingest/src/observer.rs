//! Diagnostic hooks for the parsing pipeline.
//!
//! Observers only watch: parsing behaves identically with or without one.

/// Why a page produced no transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSkipReason {
    TooFewRows,
    NotAStatementPage,
}

/// Why a row was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSkipReason {
    /// Description present but no date and not a continuation line.
    NoDate,
    /// Continuation text with no open transaction to attach it to.
    OrphanContinuation,
    /// Neither a date, a description, nor a section label.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    PageSkipped { page: usize, reason: PageSkipReason },
    TypeChanged { page: usize, kind: String },
    RowSkipped { page: usize, row: usize, reason: RowSkipReason },
    TransactionClosed { page: usize, date: String },
    PageParsed { page: usize, transactions: usize },
}

pub trait ParseObserver {
    fn on_event(&self, event: &ParseEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn on_event(&self, event: &ParseEvent) {
        match event {
            ParseEvent::PageSkipped { page, reason } => {
                log::info!("page {page}: skipped ({reason:?})");
            }
            ParseEvent::RowSkipped { page, row, reason } => {
                log::debug!("page {page} row {row}: skipped ({reason:?})");
            }
            ParseEvent::TypeChanged { page, kind } => {
                log::debug!("page {page}: section '{kind}'");
            }
            ParseEvent::TransactionClosed { page, date } => {
                log::trace!("page {page}: transaction {date}");
            }
            ParseEvent::PageParsed { page, transactions } => {
                log::info!("page {page}: {transactions} transactions");
            }
        }
    }
}

/// Observer that records every event, for tests and debugging.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: std::sync::Mutex<Vec<ParseEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ParseEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ParseObserver for RecordingObserver {
    fn on_event(&self, event: &ParseEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
