//! Dashboard statistics aggregation.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::tool::ToolRecord;

/// How many rows the recent-additions feed shows.
const RECENT_LIMIT: usize = 10;

/// Display names longer than this are shortened with `...`.
const SHORT_NAME_CHARS: usize = 15;

/// Aggregated statistics for the overview page.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_tools: usize,
    pub category_count: usize,
    pub recently_added: Option<RecentlyAdded>,
    pub tools_per_category: Vec<LabelCount>,
    pub tools_per_pricing: Vec<LabelCount>,
    pub recent_additions: Vec<RecentAddition>,
}

/// The newest tool, for the headline metric.
#[derive(Debug, Serialize)]
pub struct RecentlyAdded {
    pub name: String,
    pub display_name: String,
}

/// Number of tools sharing a label.
#[derive(Debug, Serialize, PartialEq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// One row of the recent-additions feed.
#[derive(Debug, Serialize)]
pub struct RecentAddition {
    pub serial_number: u32,
    pub name: String,
    pub category: String,
    pub contributor: String,
    pub added: String,
}

fn shorten(name: &str) -> String {
    if name.chars().count() > SHORT_NAME_CHARS {
        let head: String = name.chars().take(SHORT_NAME_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Counts per label, most frequent first, ties by label.
fn count_by<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.map(str::trim).filter(|l| !l.is_empty()) {
        *counts.entry(label).or_default() += 1;
    }
    let mut counts: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

/// Compute dashboard statistics from a recency-ordered table.
pub fn get_stats(records: &[ToolRecord]) -> DashboardStats {
    let tools_per_category = count_by(records.iter().map(|r| r.category.as_str()));
    let tools_per_pricing = count_by(
        records
            .iter()
            .filter_map(|r| r.pricing_type)
            .map(|p| p.as_str()),
    );

    let recently_added = records
        .first()
        .filter(|r| !r.name.trim().is_empty())
        .map(|r| RecentlyAdded {
            name: r.name.clone(),
            display_name: shorten(&r.name),
        });

    let recent_additions = records
        .iter()
        .take(RECENT_LIMIT)
        .map(|r| RecentAddition {
            serial_number: r.serial_number,
            name: r.name.clone(),
            category: r.category.clone(),
            contributor: r.uploaded_by.clone(),
            added: r
                .timestamp
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    DashboardStats {
        total_tools: records.len(),
        category_count: tools_per_category.len(),
        recently_added,
        tools_per_category,
        tools_per_pricing,
        recent_additions,
    }
}
