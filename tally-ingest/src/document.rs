//! Document-level parsing over a decoded, paged document.

use crate::error::Result;
use crate::layout::reconstruct_rows;
use crate::observer::ParseObserver;
use crate::parsers::apple_card::parse_statement_page;
use crate::types::{Fragment, Transaction};

/// A decoded document that can render its pages to positioned text.
pub trait DecodedDocument {
    fn page_count(&self) -> usize;

    /// Positioned text of the page at zero-based `index`, in any order.
    fn page_fragments(&self, index: usize) -> Result<Vec<Fragment>>;
}

/// Turns raw document bytes into a [`DecodedDocument`].
pub trait DocumentDecoder: Send + Sync {
    type Document: DecodedDocument;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Document>;
}

/// Pages before this index (the cover page) never carry transactions.
pub const FIRST_CONTENT_PAGE: usize = 1;

/// Parse every page after the cover page and concatenate the results.
///
/// A page that cannot be read aborts the whole document.
pub fn parse_document<D: DecodedDocument + ?Sized>(
    doc: &D,
    observer: Option<&dyn ParseObserver>,
) -> Result<Vec<Transaction>> {
    let mut out = Vec::new();

    for index in FIRST_CONTENT_PAGE..doc.page_count() {
        let fragments = doc.page_fragments(index)?;
        let rows = reconstruct_rows(&fragments);
        out.extend(parse_statement_page(rows, index + 1, observer));
    }

    log::debug!(
        "parsed {} pages, {} transactions",
        doc.page_count().saturating_sub(FIRST_CONTENT_PAGE),
        out.len()
    );
    Ok(out)
}
