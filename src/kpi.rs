//! KPI reduction: one headline number per top-ranked metric column.

use anyhow::Result;
use log::info;

use crate::{
    cli::KpiArgs,
    ingest::{self, Record},
    profile::{self, DatasetProfile},
    table,
};

/// At most this many cards, taken from the head of the safe-metric list.
pub const KPI_CARD_LIMIT: usize = 4;

/// Name fragments that switch the reduction from sum to average — unit
/// prices and ratios are meaningless summed across rows.
const AVERAGE_NAME_HINTS: &[&str] = &["price", "rate", "avg", "percent", "rating", "score"];
/// Name fragments that get currency formatting.
const CURRENCY_NAME_HINTS: &[&str] = &["price", "revenue", "cost", "sales"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Average,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub column: String,
    pub label: String,
    pub reduction: Reduction,
    pub value: f64,
    pub formatted: String,
}

/// Reduce the first [`KPI_CARD_LIMIT`] safe metric columns over the full
/// dataset. Missing and non-numeric values coerce to zero; averages divide
/// by the total row count, null rows included.
pub fn reduce_kpis(records: &[Record], profile: &DatasetProfile) -> Vec<KpiCard> {
    if records.is_empty() {
        return Vec::new();
    }
    profile
        .numeric_columns
        .iter()
        .take(KPI_CARD_LIMIT)
        .map(|column| {
            let lower = column.to_lowercase();
            let reduction = if AVERAGE_NAME_HINTS.iter().any(|hint| lower.contains(hint)) {
                Reduction::Average
            } else {
                Reduction::Sum
            };
            let total: f64 = records
                .iter()
                .map(|record| record.get(column).number_or_zero())
                .sum();
            let value = match reduction {
                Reduction::Average => total / records.len() as f64,
                Reduction::Sum => total,
            };
            let formatted = if CURRENCY_NAME_HINTS.iter().any(|hint| lower.contains(hint)) {
                format_currency(value)
            } else {
                format_grouped(value)
            };
            let label = match reduction {
                Reduction::Average => format!("Avg {column}"),
                Reduction::Sum => format!("Total {column}"),
            };
            KpiCard {
                column: column.clone(),
                label,
                reduction,
                value,
                formatted,
            }
        })
        .collect()
}

/// Currency rendering: dollar sign, grouped thousands, exactly two
/// decimals; negatives carry the sign ahead of the symbol.
pub fn format_currency(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (integral, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}.{fraction}", group_thousands(integral))
}

/// Decimal rendering: grouped thousands, at most two decimals with
/// trailing zeros trimmed.
pub fn format_grouped(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (integral, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let sign = if value < 0.0 { "-" } else { "" };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{sign}{}", group_thousands(integral))
    } else {
        format!("{sign}{}.{fraction}", group_thousands(integral))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn execute(args: &KpiArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }
    let profile = profile::profile_records(&records);
    let cards = reduce_kpis(&records, &profile);
    if cards.is_empty() {
        println!("No metric columns found to summarize.");
        return Ok(());
    }

    let headers = vec!["kpi".to_string(), "value".to_string()];
    let rows: Vec<Vec<String>> = cards
        .iter()
        .map(|card| vec![card.label.clone(), card.formatted.clone()])
        .collect();
    table::print_table(&headers, &rows);
    info!(
        "Computed {} KPI card(s) over {} record(s)",
        cards.len(),
        profile.row_count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Value;
    use crate::profile::profile_records;

    fn single_column(name: &str, values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|v| Record::from_pairs([(name, Value::Number(*v))]))
            .collect()
    }

    fn cards_for(records: &[Record]) -> Vec<KpiCard> {
        let profile = profile_records(records);
        reduce_kpis(records, &profile)
    }

    #[test]
    fn price_column_averages_as_currency() {
        let cards = cards_for(&single_column("Price", &[10.0, 20.0, 30.0]));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].label, "Avg Price");
        assert_eq!(cards[0].reduction, Reduction::Average);
        assert_eq!(cards[0].value, 20.0);
        assert_eq!(cards[0].formatted, "$20.00");
    }

    #[test]
    fn volume_column_sums_as_plain_decimal() {
        let cards = cards_for(&single_column("Volume", &[1000.0, 2500.0]));
        assert_eq!(cards[0].label, "Total Volume");
        assert_eq!(cards[0].reduction, Reduction::Sum);
        assert_eq!(cards[0].formatted, "3,500");
    }

    #[test]
    fn average_divides_by_total_row_count() {
        // The null row still counts in the denominator.
        let mut records = single_column("rating", &[4.0, 2.0]);
        records.push(Record::from_pairs([("rating", Value::Null)]));
        let cards = cards_for(&records);
        assert_eq!(cards[0].value, 2.0);
        assert_eq!(cards[0].formatted, "2");
    }

    #[test]
    fn at_most_four_cards_in_rank_order() {
        let records: Vec<Record> = (0..3)
            .map(|i| {
                Record::from_pairs([
                    ("revenue", Value::Number(f64::from(i))),
                    ("cost", Value::Number(1.0)),
                    ("volume", Value::Number(2.0)),
                    ("rating", Value::Number(3.0)),
                    ("balance", Value::Number(4.0)),
                ])
            })
            .collect();
        let cards = cards_for(&records);
        assert_eq!(cards.len(), KPI_CARD_LIMIT);
        let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Total revenue", "Total cost", "Total volume", "Avg rating"]
        );
    }

    #[test]
    fn no_metric_columns_means_no_cards() {
        let records = vec![Record::from_pairs([(
            "Region",
            Value::Text("East".to_string()),
        )])];
        assert!(cards_for(&records).is_empty());
        assert!(reduce_kpis(&[], &profile_records(&[])).is_empty());
    }

    #[test]
    fn currency_formatting_groups_and_signs() {
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.5), "$0.50");
        assert_eq!(format_currency(-42.0), "-$42.00");
    }

    #[test]
    fn grouped_formatting_trims_trailing_zeros() {
        assert_eq!(format_grouped(1234567.891), "1,234,567.89");
        assert_eq!(format_grouped(1234.5), "1,234.5");
        assert_eq!(format_grouped(20.0), "20");
        assert_eq!(format_grouped(-1000.0), "-1,000");
    }
}
