//! Statement date recognition.
//!
//! Rows print dates as `MM/DD/YYYY`; exported or normalized data uses
//! `YYYY-MM-DD`. Anything else (section labels, running text) is not a date.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

fn us_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid regex"))
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

/// Parse a statement date cell, returning `None` for anything that is not a
/// real calendar date.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if us_date_re().is_match(s) {
        NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
    } else if iso_date_re().is_match(s) {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    } else {
        None
    }
}

pub fn is_statement_date(s: &str) -> bool {
    parse_statement_date(s).is_some()
}
