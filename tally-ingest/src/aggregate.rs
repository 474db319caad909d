//! Combine many statements into one chronologically sorted list.

use std::sync::Arc;

use crate::document::{DocumentDecoder, parse_document};
use crate::error::{IngestError, Result};
use crate::observer::ParseObserver;
use crate::types::{StatementInput, Transaction};

/// Decodes and parses statement payloads one at a time.
pub struct StatementSetAggregator<D> {
    decoder: Arc<D>,
    observer: Option<Arc<dyn ParseObserver + Send + Sync>>,
}

impl<D: DocumentDecoder + 'static> StatementSetAggregator<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder: Arc::new(decoder),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ParseObserver + Send + Sync>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Parse every payload in input order and return all transactions sorted
    /// by date. Transactions sharing a date keep their original order.
    ///
    /// The first failing document aborts the call; no partial result is
    /// returned.
    pub async fn parse(&self, input: StatementInput) -> Result<Vec<Transaction>> {
        let payloads = input.into_payloads();
        validate_payloads(&payloads)?;

        let mut all = Vec::new();
        for (i, bytes) in payloads.into_iter().enumerate() {
            let decoder = Arc::clone(&self.decoder);
            let observer = self.observer.clone();

            let txns = tokio::task::spawn_blocking(move || {
                let doc = decoder.decode(&bytes)?;
                parse_document(&doc, observer.as_deref().map(|o| o as &dyn ParseObserver))
            })
            .await
            .map_err(|e| IngestError::Decode(format!("document {}: {e}", i + 1)))??;

            log::info!("document {}: {} transactions", i + 1, txns.len());
            all.extend(txns);
        }

        sort_by_date(&mut all);
        Ok(all)
    }
}

fn validate_payloads(payloads: &[Vec<u8>]) -> Result<()> {
    if let Some(i) = payloads.iter().position(|p| p.is_empty()) {
        return Err(IngestError::InvalidArgument(format!(
            "payload {} is empty, expected document bytes",
            i + 1
        )));
    }
    Ok(())
}

/// Stable ascending sort on the parsed transaction date.
pub fn sort_by_date(txns: &mut [Transaction]) {
    txns.sort_by_key(Transaction::parsed_date);
}
