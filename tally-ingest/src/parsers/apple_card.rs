//! Apple Card monthly statement page parser (positioned text)
//!
//! Expected page layout after row reconstruction (column buckets in brackets):
//!   [..] Statement                                      <- header row 1
//!   [..] Apple Card Customer                            <- header row 2
//!   [..] (statement period / account line)              <- header row 3
//!   [7]  Payments                                       <- section label
//!   [7]  03/01/2024  [21] ACH Deposit ...  [110] -$500.00
//!   [7]  Transactions
//!   [7]  03/02/2024  [21] COFFEE SHOP ...  [85] 2%  [89] $0.09  [110] $4.50
//!                    [21] 123 MAIN ST ...           <- wrapped description
//!   ...                                             <- 2 footer rows

use crate::dates::is_statement_date;
use crate::observer::{PageSkipReason, ParseEvent, ParseObserver, RowSkipReason};
use crate::types::{Row, Transaction};

/// Column buckets for this statement layout. These are fixed offsets of the
/// vendor's rendering; the fallbacks exist because right-aligned numeric
/// cells start further left as they gain characters (sign, digits, decimal
/// point), which moves their first glyph into a neighbouring bucket.
pub mod columns {
    /// Transaction date, and also where section labels sit.
    pub const DATE: i64 = 7;
    /// Date position on rows printed with a slight indent.
    pub const DATE_FALLBACK: i64 = 9;
    pub const DESCRIPTION: i64 = 21;
    pub const DAILY_CASH_PERCENT: i64 = 85;
    /// Two-digit percentages start one bucket earlier.
    pub const DAILY_CASH_PERCENT_FALLBACK: i64 = 83;
    pub const DAILY_CASH_AMOUNT: i64 = 89;
    /// Amount, narrowest rendering first. Longer amounts start further left.
    pub const AMOUNT: [i64; 5] = [111, 110, 109, 108, 107];
}

/// Leading rows that carry the statement header.
pub const HEADER_ROWS: usize = 3;
/// Trailing rows that carry the page footer.
pub const FOOTER_ROWS: usize = 2;

const TITLE_MARKER: &str = "statement";
const HOLDER_MARKER: &str = "apple card customer";

fn cell(row: &Row, bucket: i64) -> Option<&str> {
    row.get(&bucket).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Text of the leftmost column of a row.
fn primary_text(row: &Row) -> Option<&str> {
    row.values().next().map(|s| s.trim())
}

fn header_has(row: Option<&Row>, marker: &str) -> bool {
    row.and_then(primary_text)
        .map(|s| s.to_lowercase().contains(marker))
        .unwrap_or(false)
}

/// True when the header rows identify an Apple Card statement page.
pub fn is_statement_header(header: &[Row]) -> bool {
    header_has(header.first(), TITLE_MARKER) && header_has(header.get(1), HOLDER_MARKER)
}

/// What a single body row means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind<'a> {
    /// Section label such as "Payments"; applies to the rows that follow.
    TypeMarker(&'a str),
    NewTransaction { date: &'a str, description: &'a str },
    /// Wrapped description text for the transaction above.
    Continuation(&'a str),
    Noise(RowSkipReason),
}

pub fn classify_row(row: &Row) -> RowKind<'_> {
    if row.len() == 1 {
        if let Some(label) = cell(row, columns::DATE) {
            if !is_statement_date(label) {
                return RowKind::TypeMarker(label);
            }
        }
    }

    // The indented position is only consulted when the date column is empty.
    let date = cell(row, columns::DATE)
        .or_else(|| cell(row, columns::DATE_FALLBACK))
        .filter(|s| is_statement_date(s));
    let description = cell(row, columns::DESCRIPTION);

    match (date, description) {
        (Some(date), Some(description)) => RowKind::NewTransaction { date, description },
        (None, Some(description)) if row.len() == 1 => RowKind::Continuation(description),
        (None, Some(_)) => RowKind::Noise(RowSkipReason::NoDate),
        (_, None) => RowKind::Noise(RowSkipReason::Unrecognized),
    }
}

fn first_cell(row: &Row, buckets: &[i64]) -> Option<String> {
    buckets
        .iter()
        .find_map(|&b| cell(row, b))
        .map(str::to_string)
}

fn open_transaction(row: &Row, date: &str, description: &str, kind: Option<String>) -> Transaction {
    Transaction {
        date: date.to_string(),
        kind,
        description: description.to_string(),
        daily_cash_percent: first_cell(
            row,
            &[columns::DAILY_CASH_PERCENT, columns::DAILY_CASH_PERCENT_FALLBACK],
        ),
        daily_cash_amount: first_cell(row, &[columns::DAILY_CASH_AMOUNT]),
        amount: first_cell(row, &columns::AMOUNT),
    }
}

enum State {
    NoPendingTransaction,
    PendingTransaction(Transaction),
}

/// Row-classification state machine for one page. The current section type
/// is machine context: it survives across transactions until the next label.
struct PageMachine<'o> {
    page: usize,
    state: State,
    current_type: Option<String>,
    out: Vec<Transaction>,
    observer: Option<&'o dyn ParseObserver>,
}

impl<'o> PageMachine<'o> {
    fn new(page: usize, observer: Option<&'o dyn ParseObserver>) -> Self {
        Self {
            page,
            state: State::NoPendingTransaction,
            current_type: None,
            out: Vec::new(),
            observer,
        }
    }

    fn emit(&self, event: ParseEvent) {
        if let Some(obs) = self.observer {
            obs.on_event(&event);
        }
    }

    fn close_pending(&mut self) {
        let prev = std::mem::replace(&mut self.state, State::NoPendingTransaction);
        if let State::PendingTransaction(txn) = prev {
            self.emit(ParseEvent::TransactionClosed {
                page: self.page,
                date: txn.date.clone(),
            });
            self.out.push(txn);
        }
    }

    fn step(&mut self, index: usize, row: &Row) {
        match classify_row(row) {
            RowKind::TypeMarker(label) => {
                self.close_pending();
                self.current_type = Some(label.to_string());
                self.emit(ParseEvent::TypeChanged {
                    page: self.page,
                    kind: label.to_string(),
                });
            }
            RowKind::NewTransaction { date, description } => {
                self.close_pending();
                let txn = open_transaction(row, date, description, self.current_type.clone());
                self.state = State::PendingTransaction(txn);
            }
            RowKind::Continuation(text) => {
                if let State::PendingTransaction(txn) = &mut self.state {
                    txn.push_description_line(text);
                } else {
                    self.emit(ParseEvent::RowSkipped {
                        page: self.page,
                        row: index,
                        reason: RowSkipReason::OrphanContinuation,
                    });
                }
            }
            RowKind::Noise(reason) => self.emit(ParseEvent::RowSkipped {
                page: self.page,
                row: index,
                reason,
            }),
        }
    }

    fn finish(mut self) -> Vec<Transaction> {
        self.close_pending();
        self.out
    }
}

/// Parse one page's reconstructed rows into transactions.
///
/// Pages that are too short or lack the statement header yield an empty list;
/// that is not an error. `page` is only used for diagnostics.
pub fn parse_statement_page(
    mut rows: Vec<Row>,
    page: usize,
    observer: Option<&dyn ParseObserver>,
) -> Vec<Transaction> {
    let notify = |event: ParseEvent| {
        if let Some(obs) = observer {
            obs.on_event(&event);
        }
    };

    if rows.len() < HEADER_ROWS {
        notify(ParseEvent::PageSkipped {
            page,
            reason: PageSkipReason::TooFewRows,
        });
        return Vec::new();
    }

    rows.truncate(rows.len() - FOOTER_ROWS);
    let header_len = HEADER_ROWS.min(rows.len());
    let header: Vec<Row> = rows.drain(..header_len).collect();
    if !is_statement_header(&header) {
        notify(ParseEvent::PageSkipped {
            page,
            reason: PageSkipReason::NotAStatementPage,
        });
        return Vec::new();
    }

    let mut machine = PageMachine::new(page, observer);
    for (i, row) in rows.iter().enumerate() {
        machine.step(HEADER_ROWS + i, row);
    }
    let out = machine.finish();

    notify(ParseEvent::PageParsed {
        page,
        transactions: out.len(),
    });
    out
}
