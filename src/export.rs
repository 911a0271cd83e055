//! Normalized CSV export of the ingested record sequence.
//!
//! The header line is the first record's key sequence joined by commas;
//! every data cell is written through the csv crate with
//! `QuoteStyle::Always`, which doubles embedded quotes, so the output
//! round-trips even when the naive ingestion path could not.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use log::info;

use crate::{cli::ExportArgs, ingest::{self, Record}};

pub fn write_records<W: Write>(records: &[Record], mut sink: W) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().collect();
    writeln!(sink, "{}", headers.join(","))?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .from_writer(sink);
    for record in records {
        writer.write_record(headers.iter().map(|name| record.get(name).render()))?;
    }
    writer.flush()?;
    Ok(())
}

fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn execute(args: &ExportArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) if !is_dash(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    write_records(&records, sink)?;

    info!(
        "Exported {} record(s) from {:?}",
        records.len(),
        args.input
    );
    Ok(())
}
