//! Boundary to the external generative analyst service.
//!
//! The core's side of the contract is small: assemble a bounded payload
//! (column names, a record sample capped at [`ANALYST_SAMPLE_ROWS`], an
//! optional free-text query) and accept back either free-form text or a
//! structured forecast. The service's reasoning is not our concern, and
//! its absence must never be: every failure at this boundary degrades to
//! a logged "unavailable" message, not an error exit.

use std::{
    fs,
    io::Write,
    process::{Command, Stdio},
};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{
    cli::{AskArgs, ForecastArgs},
    ingest::{self, Record, Value},
    table,
};

/// Upper bound on the record sample shipped to the analyst service.
pub const ANALYST_SAMPLE_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystPayload {
    pub columns: Vec<String>,
    pub sample: Vec<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

pub fn build_payload(records: &[Record], query: Option<&str>) -> AnalystPayload {
    let columns = records
        .first()
        .map(|record| record.keys().map(str::to_string).collect())
        .unwrap_or_default();
    let sample = records
        .iter()
        .take(ANALYST_SAMPLE_ROWS)
        .map(record_to_json)
        .collect();
    AnalystPayload {
        columns,
        sample,
        query: query.map(str::to_string),
    }
}

fn record_to_json(record: &Record) -> JsonValue {
    let mut map = Map::new();
    for (name, value) in record.iter() {
        let json = match value {
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(JsonValue::Null, JsonValue::Number),
            Value::Text(t) => JsonValue::String(t.clone()),
            Value::Null => JsonValue::Null,
        };
        map.insert(name.to_string(), json);
    }
    JsonValue::Object(map)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub entity_name: String,
    pub predicted_trend: String,
    pub reasoning: String,
}

/// The structured forecast document, camelCase on the wire to match the
/// analyst service contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub top_entities: Vec<ForecastEntry>,
    pub market_outlook: String,
    pub recommendation: String,
}

pub fn parse_forecast(raw: &str) -> Result<Forecast> {
    serde_json::from_str(raw).context("Parsing forecast response")
}

/// Pipe the payload to a shell command standing in for the analyst
/// transport; its stdout is the response.
fn run_analyst_command(command: &str, payload: &AnalystPayload) -> Result<String> {
    let serialized = serde_json::to_string(payload)?;
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("Spawning analyst command '{command}'"))?;
    child
        .stdin
        .take()
        .context("Opening analyst command stdin")?
        .write_all(serialized.as_bytes())
        .context("Writing analyst payload")?;
    let output = child
        .wait_with_output()
        .context("Waiting for analyst command")?;
    if !output.status.success() {
        bail!("Analyst command exited with {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn execute_ask(args: &AskArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }
    let payload = build_payload(&records, Some(&args.query));

    match &args.analyst_cmd {
        Some(command) => match run_analyst_command(command, &payload) {
            Ok(answer) => {
                println!("{}", answer.trim_end());
                info!("Analyst answered a {}-record query", payload.sample.len());
            }
            Err(err) => {
                warn!("Analyst request failed: {err:#}");
                println!("Analysis unavailable. Retry once the analyst service is reachable.");
            }
        },
        // No transport configured: emit the request document itself.
        None => println!("{}", serde_json::to_string_pretty(&payload)?),
    }
    Ok(())
}

pub fn execute_forecast(args: &ForecastArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }
    let payload = build_payload(&records, None);

    let raw_response = if let Some(path) = &args.response {
        fs::read_to_string(path).with_context(|| format!("Reading forecast response {path:?}"))
    } else if let Some(command) = &args.analyst_cmd {
        run_analyst_command(command, &payload)
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    };

    let forecast = raw_response.and_then(|raw| parse_forecast(&raw));
    match forecast {
        Ok(forecast) => render_forecast(&forecast),
        Err(err) => {
            warn!("Forecast request failed: {err:#}");
            println!("Forecast unavailable. Retry once the analyst service is reachable.");
        }
    }
    Ok(())
}

fn render_forecast(forecast: &Forecast) {
    let headers = vec![
        "entity".to_string(),
        "trend".to_string(),
        "reasoning".to_string(),
    ];
    let rows: Vec<Vec<String>> = forecast
        .top_entities
        .iter()
        .map(|entry| {
            vec![
                entry.entity_name.clone(),
                entry.predicted_trend.clone(),
                entry.reasoning.clone(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    println!();
    println!("Outlook: {}", forecast.market_outlook);
    println!("Recommendation: {}", forecast.recommendation);
    info!(
        "Rendered forecast covering {} entity(ies)",
        forecast.top_entities.len()
    );
}
