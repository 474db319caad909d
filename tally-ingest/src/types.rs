use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_statement_date;

/// A piece of text at a position on a rendered page, in PDF user space
/// (origin bottom-left, so larger `y` is higher on the page).
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Fragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// One visual line of a page: column bucket -> text.
pub type Row = BTreeMap<i64, String>;

/// Normalized output of the statement parser.
///
/// Field names serialize to the column headers downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Daily Cash (%)")]
    pub daily_cash_percent: Option<String>,
    #[serde(rename = "Daily Cash ($)")]
    pub daily_cash_amount: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
}

impl Transaction {
    /// Column order used by every serialized form.
    pub const COLUMNS: [&'static str; 6] = [
        "Date",
        "Type",
        "Description",
        "Daily Cash (%)",
        "Daily Cash ($)",
        "Amount",
    ];

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_statement_date(&self.date)
    }

    /// Extend the description with a continuation line.
    pub fn push_description_line(&mut self, line: &str) {
        self.description.push('\n');
        self.description.push_str(line);
    }
}

/// Raw document payloads handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementInput {
    Single(Vec<u8>),
    Many(Vec<Vec<u8>>),
}

impl StatementInput {
    pub fn into_payloads(self) -> Vec<Vec<u8>> {
        match self {
            StatementInput::Single(bytes) => vec![bytes],
            StatementInput::Many(all) => all,
        }
    }
}

impl From<Vec<u8>> for StatementInput {
    fn from(bytes: Vec<u8>) -> Self {
        StatementInput::Single(bytes)
    }
}

impl From<&[u8]> for StatementInput {
    fn from(bytes: &[u8]) -> Self {
        StatementInput::Single(bytes.to_vec())
    }
}

impl From<Vec<Vec<u8>>> for StatementInput {
    fn from(all: Vec<Vec<u8>>) -> Self {
        StatementInput::Many(all)
    }
}
