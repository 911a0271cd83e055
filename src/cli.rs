use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile datasets and surface their headline metrics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types and semantic roles for a dataset
    Profile(ProfileArgs),
    /// Group the primary metric by the primary category
    Aggregate(AggregateArgs),
    /// Compute KPI summary cards over the top-ranked numeric columns
    Kpi(KpiArgs),
    /// Preview the first few records in a formatted table
    Preview(PreviewArgs),
    /// Re-serialize the ingested records as normalized CSV
    Export(ExportArgs),
    /// Send a free-text question about the dataset to the analyst service
    Ask(AskArgs),
    /// Request a structured trend forecast from the analyst service
    Forecast(ForecastArgs),
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Number of rows sampled when estimating column cardinality
    #[arg(long = "sample-rows", default_value_t = crate::profile::CARDINALITY_SAMPLE_ROWS)]
    pub sample_rows: usize,
    /// Emit the profile as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum AggregateView {
    /// All groups, descending by total
    All,
    /// Top 10 groups for bar-style consumption
    Bar,
    /// Top 6 groups with share percentages for pie-style consumption
    Pie,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Which truncation of the grouped totals to display
    #[arg(long, value_enum, default_value = "all")]
    pub view: AggregateView,
}

#[derive(Debug, Args)]
pub struct KpiArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Number of records to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Destination CSV file (stdout if omitted or '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Free-text question to put to the analyst service
    #[arg(short = 'q', long = "query")]
    pub query: String,
    /// Shell command that receives the payload on stdin and answers on stdout
    #[arg(long = "analyst-cmd")]
    pub analyst_cmd: Option<String>,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Input file: delimited text with a header row, or a .json array of flat objects
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Shell command that receives the payload on stdin and answers on stdout
    #[arg(long = "analyst-cmd")]
    pub analyst_cmd: Option<String>,
    /// Previously captured forecast response to render instead of calling out
    #[arg(long)]
    pub response: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "pipe" | "|" => Ok(b'|'),
        "semicolon" | ";" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
