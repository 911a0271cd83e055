use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, ingest, profile, table};

/// Wide datasets are cut to their leading columns for readability.
pub const PREVIEW_COLUMN_LIMIT: usize = 6;

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }
    let profile = profile::profile_records(&records);

    let headers: Vec<String> = profile
        .columns
        .iter()
        .take(PREVIEW_COLUMN_LIMIT)
        .map(|column| column.name.clone())
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .take(args.rows)
        .map(|record| {
            headers
                .iter()
                .map(|name| record.get(name).render())
                .collect()
        })
        .collect();

    table::print_table(&headers, &rows);
    println!("Showing {} of {} record(s)", rows.len(), profile.row_count);
    info!("Previewed {:?}", args.input);
    Ok(())
}
