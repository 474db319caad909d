//! tally-ingest: rebuild statement tables from positioned PDF text and
//! classify their rows into transactions.

pub mod aggregate;
pub mod dates;
pub mod document;
pub mod error;
pub mod layout;
pub mod observer;
pub mod parsers;
pub mod pdf;
pub mod types;

pub use aggregate::{StatementSetAggregator, sort_by_date};
pub use document::{DecodedDocument, DocumentDecoder, parse_document};
pub use error::{IngestError, Result};
pub use layout::reconstruct_rows;
pub use observer::{LogObserver, ParseEvent, ParseObserver};
pub use parsers::parse_statement_page;
pub use pdf::PdfDecoder;
pub use types::{Fragment, Row, StatementInput, Transaction};

/// Parse PDF statements with the default decoder.
pub async fn parse_statements(input: impl Into<StatementInput>) -> Result<Vec<Transaction>> {
    StatementSetAggregator::new(PdfDecoder)
        .with_observer(std::sync::Arc::new(LogObserver))
        .parse(input.into())
        .await
}
