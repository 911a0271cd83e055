//! Value coercion: turns delimited text or JSON arrays into flat records.
//!
//! The delimited path splits lines positionally against the header line.
//! Delimiters embedded inside quoted fields are NOT handled — this is a
//! documented limitation, adequate for the simple exports the tool targets,
//! and the reason ingestion here does not go through a full CSV reader.
//! Empty or header-only input yields an empty record sequence, never an
//! error; unusable text is reported by callers as "no usable data".

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::warn;
use serde_json::Value as JsonValue;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// A single coerced field. Every ingested value lands in one of these
/// three shapes regardless of source format.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

static NULL_VALUE: Value = Value::Null;

impl Value {
    /// Numeric reading used by reductions: text that fully parses as a
    /// finite float counts as that number, everything else as nothing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(t) => parse_finite(t),
            Value::Null => None,
        }
    }

    /// Reduction coercion: missing and non-numeric values contribute zero.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Canonical text rendering; also serves as the distinct-count key and
    /// the aggregation group key.
    pub fn render(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(t) => t.clone(),
            Value::Null => String::new(),
        }
    }
}

/// Whole numbers render without a fractional part so that `100.0` and the
/// source token `100` count as the same distinct value.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One flat row: field name to coerced value, in first-seen field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self { fields }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Field lookup; a field absent from this record reads as `Null`,
    /// which is how later records tolerate schema drift.
    pub fn get(&self, name: &str) -> &Value {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map_or(&NULL_VALUE, |(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Coerce one raw delimited-text token: trim, strip wrapping quotes, then
/// empty → null, fully-numeric → number, anything else → text.
pub fn coerce_field(raw: &str) -> Value {
    let token = strip_quotes(raw.trim());
    if token.is_empty() {
        Value::Null
    } else if let Some(number) = parse_finite(token) {
        Value::Number(number)
    } else {
        Value::Text(token.to_string())
    }
}

fn strip_quotes(token: &str) -> &str {
    let token = token.strip_prefix('"').unwrap_or(token);
    token.strip_suffix('"').unwrap_or(token)
}

/// Parse delimited text with a header line. Ragged rows are tolerated:
/// missing positions read as null, extra positions are dropped.
pub fn parse_delimited(source: &str, delimiter: u8) -> Vec<Record> {
    let separator = delimiter as char;
    let mut lines = source.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line
        .split(separator)
        .map(|token| strip_quotes(token.trim()).to_string())
        .collect();

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(separator).collect();
            let mut record = Record::new();
            for (idx, header) in headers.iter().enumerate() {
                let value = values.get(idx).map_or(Value::Null, |raw| coerce_field(raw));
                record.push(header.clone(), value);
            }
            record
        })
        .collect()
}

/// Parse a JSON array of flat objects. Non-object elements are skipped;
/// malformed JSON is downgraded to an empty sequence with a warning, per
/// the "unusable data is not a fault" contract.
pub fn parse_json(source: &str) -> Vec<Record> {
    let parsed: JsonValue = match serde_json::from_str(source) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Discarding malformed JSON input: {err}");
            return Vec::new();
        }
    };
    let JsonValue::Array(items) = parsed else {
        warn!("Discarding JSON input that is not an array of objects");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => {
                let mut record = Record::new();
                for (name, value) in map {
                    record.push(name, coerce_json_value(value));
                }
                Some(record)
            }
            _ => None,
        })
        .collect()
}

fn coerce_json_value(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        JsonValue::String(s) => {
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(s)
            }
        }
        // Booleans and nested structures carry their JSON rendering.
        other => Value::Text(other.to_string()),
    }
}

pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read and coerce an input file. `.json` takes the JSON path; every other
/// extension falls through to delimited parsing.
pub fn read_records(path: &Path, delimiter: Option<u8>) -> Result<Vec<Record>> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Reading input file {path:?}"))?;
    let records = if is_json_path(path) {
        parse_json(&source)
    } else {
        parse_delimited(&source, resolve_delimiter(path, delimiter))
    };
    Ok(records)
}
