//! Error type for the ingestion pipeline.
//!
//! Only failures that abort a whole call live here. Layout anomalies
//! (short pages, foreign pages, unparseable rows) are skipped, not raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("failed to read page {page}: {message}")]
    PageRead { page: usize, message: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
