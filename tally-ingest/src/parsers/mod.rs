//! Vendor-specific statement page parsers.

pub mod apple_card;

pub use apple_card::parse_statement_page;
