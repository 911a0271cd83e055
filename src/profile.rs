//! Column profiling and semantic-role selection.
//!
//! This module owns [`DatasetProfile`], the inferred schema plus ranked
//! roles for one dataset snapshot. The schema is fixed from the FIRST
//! record's keys — a deliberate, documented limitation: later records may
//! add fields (ignored) or drop fields (read as null), and the profile
//! will not notice. Profiling is a pure function of the record slice and
//! is recomputed wholesale whenever the dataset is replaced; profiles are
//! never mutated in place.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::{
    cli::ProfileArgs,
    ingest::{self, Record, Value},
    score, table,
};

/// Cardinality is estimated over this many leading records, not the full
/// dataset — a cost cap, not a correctness requirement.
pub const CARDINALITY_SAMPLE_ROWS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Number,
    Date,
    Text,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredType::Number => "number",
            InferredType::Date => "date",
            InferredType::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    pub cardinality: usize,
    pub is_metric: bool,
}

/// The inferred schema plus ranked semantic roles for a dataset snapshot.
/// `numeric_columns` is the "safe metric" list: identifier-shaped columns
/// are excluded from it entirely, not just demoted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    pub columns: Vec<ColumnProfile>,
    pub date_column: Option<String>,
    pub category_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub primary_metric: Option<String>,
    pub primary_category: Option<String>,
    pub row_count: usize,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date heuristic for text values: long enough to be a date, carries a
/// date separator (guards bare integers), and chrono accepts it under one
/// of the supported formats.
pub fn looks_like_date(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.len() < 6 || !(trimmed.contains('-') || trimmed.contains('/')) {
        return false;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).is_ok())
        || DateTime::parse_from_rfc3339(trimmed).is_ok()
}

fn infer_type(value: &Value) -> InferredType {
    match value {
        Value::Number(_) => InferredType::Number,
        Value::Text(text) if looks_like_date(text) => InferredType::Date,
        _ => InferredType::Text,
    }
}

/// Profile with the default cardinality sample cap.
pub fn profile_records(records: &[Record]) -> DatasetProfile {
    profile_records_with_sample(records, CARDINALITY_SAMPLE_ROWS)
}

/// Profile a record slice. Total over its domain: an empty slice yields
/// the degenerate profile (empty lists, absent roles, zero rows).
pub fn profile_records_with_sample(records: &[Record], sample_rows: usize) -> DatasetProfile {
    let Some(first) = records.first() else {
        return DatasetProfile::default();
    };
    let row_count = records.len();
    let sample = &records[..row_count.min(sample_rows)];

    let columns: Vec<ColumnProfile> = first
        .iter()
        .map(|(name, value)| {
            let inferred_type = infer_type(value);
            let cardinality = sample
                .iter()
                .map(|record| record.get(name).render())
                .unique()
                .count();
            ColumnProfile {
                name: name.to_string(),
                inferred_type,
                cardinality,
                is_metric: inferred_type == InferredType::Number,
            }
        })
        .collect();

    let date_column = columns
        .iter()
        .find(|column| column.inferred_type == InferredType::Date)
        .map(|column| column.name.clone());

    let metrics = score::rank_metrics(&columns, row_count);
    let categories = score::rank_categories(&columns);
    debug!("Metric ranking: {metrics:?}");
    debug!("Category ranking: {categories:?}");

    let numeric_columns: Vec<String> = metrics
        .iter()
        .filter(|entry| entry.score > score::METRIC_SCORE_FLOOR)
        .map(|entry| entry.name.clone())
        .collect();
    // The floor keeps an identifier out of the primary slot even when it
    // is the only numeric column; categories carry no such floor.
    let primary_metric = metrics
        .first()
        .filter(|top| top.score > score::METRIC_SCORE_FLOOR)
        .map(|top| top.name.clone());
    let category_columns: Vec<String> = categories
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    let primary_category = category_columns.first().cloned();

    DatasetProfile {
        columns,
        date_column,
        category_columns,
        numeric_columns,
        primary_metric,
        primary_category,
        row_count,
    }
}

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    let profile = profile_records_with_sample(&records, args.sample_rows);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }

    let column_headers = vec![
        "column".to_string(),
        "type".to_string(),
        "cardinality".to_string(),
        "metric".to_string(),
    ];
    let column_rows: Vec<Vec<String>> = profile
        .columns
        .iter()
        .map(|column| {
            vec![
                column.name.clone(),
                column.inferred_type.as_str().to_string(),
                column.cardinality.to_string(),
                (if column.is_metric { "yes" } else { "no" }).to_string(),
            ]
        })
        .collect();
    table::print_table(&column_headers, &column_rows);
    println!();

    let none = || "(none)".to_string();
    let role_headers = vec!["role".to_string(), "selection".to_string()];
    let role_rows = vec![
        vec!["records".to_string(), profile.row_count.to_string()],
        vec![
            "date column".to_string(),
            profile.date_column.clone().unwrap_or_else(none),
        ],
        vec![
            "primary metric".to_string(),
            profile.primary_metric.clone().unwrap_or_else(none),
        ],
        vec![
            "primary category".to_string(),
            profile.primary_category.clone().unwrap_or_else(none),
        ],
        vec![
            "metric columns".to_string(),
            if profile.numeric_columns.is_empty() {
                none()
            } else {
                profile.numeric_columns.iter().join(", ")
            },
        ],
        vec![
            "category columns".to_string(),
            if profile.category_columns.is_empty() {
                none()
            } else {
                profile.category_columns.iter().join(", ")
            },
        ],
    ];
    table::print_table(&role_headers, &role_rows);

    info!(
        "Profiled {} column(s) across {} record(s) from {:?}",
        profile.columns.len(),
        profile.row_count,
        args.input
    );
    Ok(())
}
