//! Rebuild visual rows from positioned text fragments.
//!
//! Rendered pages carry no table structure, only text at coordinates. Each
//! fragment's x is snapped to a coarse column bucket and its y to an integer
//! row key; fragments sharing a row key form one row.

use std::collections::BTreeMap;

use crate::types::{Fragment, Row};

/// Horizontal units per column bucket.
pub const COLUMN_SCALE: f64 = 5.0;

pub fn column_bucket(x: f64) -> i64 {
    (x / COLUMN_SCALE).round() as i64
}

pub fn row_key(y: f64) -> i64 {
    y.round() as i64
}

/// Group fragments into rows ordered top-to-bottom.
///
/// Whitespace-only fragments are dropped. When two fragments land in the same
/// bucket of the same row, the later one wins.
pub fn reconstruct_rows(fragments: &[Fragment]) -> Vec<Row> {
    let mut rows: BTreeMap<i64, Row> = BTreeMap::new();

    for frag in fragments {
        if frag.text.trim().is_empty() {
            continue;
        }
        rows.entry(row_key(frag.y))
            .or_default()
            .insert(column_bucket(frag.x), frag.text.clone());
    }

    // y grows upward in user space, so descending keys is reading order.
    rows.into_values().rev().collect()
}
