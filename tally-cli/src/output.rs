//! Render transactions as CSV or JSON.

use anyhow::Result;
use std::io::Write;
use tally_ingest::Transaction;

use crate::config::{OutputFormat, OutputSection};

pub fn render(txns: &[Transaction], opts: &OutputSection) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match opts.format {
        OutputFormat::Csv => write_csv(&mut buf, txns, opts)?,
        OutputFormat::Json => write_json(&mut buf, txns)?,
    }
    Ok(buf)
}

/// Missing values become empty fields; multi-line descriptions are quoted.
pub fn write_csv<W: Write>(w: W, txns: &[Transaction], opts: &OutputSection) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(opts.delimiter_byte()?)
        .has_headers(false)
        .from_writer(w);

    if opts.header {
        wtr.write_record(Transaction::COLUMNS)?;
    }
    for t in txns {
        wtr.serialize(t)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut w: W, txns: &[Transaction]) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, txns)?;
    writeln!(w)?;
    Ok(())
}
