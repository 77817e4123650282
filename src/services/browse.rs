//! Gallery browsing: search, filters and card view models.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::tool::ToolRecord;

/// Filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";

/// Filter value meaning "no pricing filter".
pub const ALL_PRICING: &str = "All Pricing";

/// Purpose snippets keep this many words.
const SNIPPET_WORDS: usize = 15;

const NO_PURPOSE: &str = "No detailed purpose provided.";

/// Gallery query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolFilters {
    /// Case-insensitive substring of the name or purpose.
    pub search: Option<String>,
    pub category: Option<String>,
    pub pricing: Option<String>,
}

/// One tool as the gallery shows it.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCard {
    pub serial_number: u32,
    pub name: String,
    pub link: Option<String>,
    pub category: String,
    pub icon: &'static str,
    pub pricing_label: String,
    pub purpose_snippet: String,
    pub purpose: String,
    pub uploaded_by: String,
    pub added: Option<NaiveDateTime>,
}

/// Values the gallery filter pickers offer.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub pricing_types: Vec<String>,
}

/// Gallery response.
#[derive(Debug, Serialize)]
pub struct ToolListing {
    pub total: usize,
    pub matched: usize,
    pub items: Vec<ToolCard>,
    pub filter_options: FilterOptions,
}

/// Emoji shown on a card for its category.
pub fn category_icon(category: &str) -> &'static str {
    match category.trim() {
        "Content Creation" => "✍️",
        "Image Generation" => "🎨",
        "Data Analysis" => "📊",
        "Social Media Management" => "📱",
        "Email Marketing" => "📧",
        "SEO Tools" => "🔍",
        "Video Editing" => "🎬",
        "Voice/Audio" => "🎤",
        "Translation" => "🌐",
        "Chatbots" => "🤖",
        "Design Tools" => "🖼️",
        "Analytics" => "📈",
        "PPT Creation" => "💻",
        "Other" => "🌟",
        _ => "🛠️",
    }
}

/// First words of the purpose, with `...` when truncated.
pub fn purpose_snippet(purpose: &str) -> String {
    let words: Vec<&str> = purpose.split_whitespace().collect();
    if words.is_empty() {
        return NO_PURPOSE.to_string();
    }
    let mut snippet = words
        .iter()
        .take(SNIPPET_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > SNIPPET_WORDS {
        snippet.push_str("...");
    }
    snippet
}

/// Pricing type, with the cost in parentheses when one applies.
pub fn pricing_label(record: &ToolRecord) -> String {
    match record.pricing_type {
        Some(pricing) => {
            let cost = record.subscription_cost.trim();
            if pricing.requires_cost() && !cost.is_empty() {
                format!("{pricing} ({cost})")
            } else {
                pricing.to_string()
            }
        }
        None => record
            .unknown_pricing
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
    }
}

fn active(value: &Option<String>, all: &str) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != all)
        .map(str::to_string)
}

impl ToolFilters {
    /// Whether `record` passes every active filter.
    pub fn matches(&self, record: &ToolRecord) -> bool {
        if let Some(term) = active(&self.search, "") {
            let term = term.to_lowercase();
            if !record.name.to_lowercase().contains(&term)
                && !record.purpose.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if let Some(category) = active(&self.category, ALL_CATEGORIES) {
            if record.category.trim() != category {
                return false;
            }
        }
        if let Some(pricing) = active(&self.pricing, ALL_PRICING) {
            if record.pricing_type.map(|p| p.as_str()) != Some(pricing.as_str()) {
                return false;
            }
        }
        true
    }
}

impl From<&ToolRecord> for ToolCard {
    fn from(record: &ToolRecord) -> Self {
        Self {
            serial_number: record.serial_number,
            name: record.name.clone(),
            link: record.link.clone(),
            category: record.category.clone(),
            icon: category_icon(&record.category),
            pricing_label: pricing_label(record),
            purpose_snippet: purpose_snippet(&record.purpose),
            purpose: record.purpose.clone(),
            uploaded_by: record.uploaded_by.clone(),
            added: record.timestamp,
        }
    }
}

/// Distinct non-empty categories and pricing types present in the table.
pub fn filter_options(records: &[ToolRecord]) -> FilterOptions {
    let categories: BTreeSet<String> = records
        .iter()
        .map(|r| r.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    let pricing_types: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.pricing_type)
        .map(|p| p.to_string())
        .collect();
    FilterOptions {
        categories: categories.into_iter().collect(),
        pricing_types: pricing_types.into_iter().collect(),
    }
}

/// Apply `filters` to a recency-ordered table.
pub fn list(records: &[ToolRecord], filters: &ToolFilters) -> ToolListing {
    let items: Vec<ToolCard> = records
        .iter()
        .filter(|r| filters.matches(r))
        .map(ToolCard::from)
        .collect();
    ToolListing {
        total: records.len(),
        matched: items.len(),
        items,
        filter_options: filter_options(records),
    }
}
