//! Grouped reduction of the primary metric by the primary category.

use std::{cmp::Ordering, collections::HashMap};

use anyhow::Result;
use log::info;

use crate::{
    cli::{AggregateArgs, AggregateView},
    ingest::{self, Record},
    kpi::format_grouped,
    profile::{self, DatasetProfile},
    table,
};

/// Truncation sizes for the two chart-shaped consumers. Both cut the same
/// sorted sequence; there is only one aggregation pass.
pub const BAR_GROUP_LIMIT: usize = 10;
pub const PIE_GROUP_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Per-group metric totals, sorted descending by total with first-seen
/// group order breaking ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBreakdown {
    totals: Vec<GroupTotal>,
}

impl CategoryBreakdown {
    pub fn totals(&self) -> &[GroupTotal] {
        &self.totals
    }

    pub fn bar_groups(&self) -> &[GroupTotal] {
        &self.totals[..self.totals.len().min(BAR_GROUP_LIMIT)]
    }

    pub fn pie_groups(&self) -> &[GroupTotal] {
        &self.totals[..self.totals.len().min(PIE_GROUP_LIMIT)]
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum over every group, before truncation.
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().map(|group| group.total).sum()
    }
}

/// Group records by the rendered primary-category value and sum the
/// numeric coercion of the primary metric per group. Records with a null
/// category are skipped, so the grand total equals the metric sum over
/// records that actually carry a category. A no-op (empty breakdown) when
/// either role is absent.
pub fn aggregate_records(records: &[Record], profile: &DatasetProfile) -> CategoryBreakdown {
    let (Some(category), Some(metric)) = (&profile.primary_category, &profile.primary_metric)
    else {
        return CategoryBreakdown::default();
    };

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for record in records {
        let value = record.get(category);
        if value.is_null() {
            continue;
        }
        let key = value.render();
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        *sums.entry(key).or_insert(0.0) += record.get(metric).number_or_zero();
    }

    let mut totals: Vec<GroupTotal> = order
        .into_iter()
        .map(|key| {
            let total = sums[&key];
            GroupTotal { key, total }
        })
        .collect();
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    CategoryBreakdown { totals }
}

pub fn execute(args: &AggregateArgs) -> Result<()> {
    let records = ingest::read_records(&args.input, args.delimiter)?;
    if records.is_empty() {
        println!("No usable data in {:?}", args.input);
        return Ok(());
    }
    let profile = profile::profile_records(&records);
    let breakdown = aggregate_records(&records, &profile);
    if breakdown.is_empty() {
        println!("Nothing to aggregate: the dataset needs both a metric and a category column.");
        return Ok(());
    }

    let category = profile.primary_category.as_deref().unwrap_or_default();
    let metric = profile.primary_metric.as_deref().unwrap_or_default();
    let groups = match args.view {
        AggregateView::All => breakdown.totals(),
        AggregateView::Bar => breakdown.bar_groups(),
        AggregateView::Pie => breakdown.pie_groups(),
    };

    let mut headers = vec![category.to_string(), format!("total {metric}")];
    if args.view == AggregateView::Pie {
        headers.push("share".to_string());
    }
    let grand_total = breakdown.grand_total();
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|group| {
            let mut row = vec![group.key.clone(), format_grouped(group.total)];
            if args.view == AggregateView::Pie {
                let share = if grand_total == 0.0 {
                    0.0
                } else {
                    group.total / grand_total * 100.0
                };
                row.push(format!("{share:.1}%"));
            }
            row
        })
        .collect();
    table::print_table(&headers, &rows);

    info!(
        "Aggregated '{}' over '{}' into {} group(s) ({} shown)",
        metric,
        category,
        breakdown.totals().len(),
        groups.len()
    );
    Ok(())
}
