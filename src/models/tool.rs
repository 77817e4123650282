//! Catalogued AI tool records and the vocabulary used to describe them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Categories offered to contributors before any data exists.
pub const PREDEFINED_CATEGORIES: [&str; 13] = [
    "Content Creation",
    "Image Generation",
    "Data Analysis",
    "Social Media Management",
    "Email Marketing",
    "SEO Tools",
    "Video Editing",
    "Voice/Audio",
    "Translation",
    "Chatbots",
    "Design Tools",
    "Analytics",
    "PPT Creation",
];

/// Placeholder shown in the category picker before a choice is made.
pub const CATEGORY_PLACEHOLDER: &str = "Select Category";

/// Placeholder shown in the pricing picker before a choice is made.
pub const PRICING_PLACEHOLDER: &str = "Select Pricing";

/// Placeholder shown in the contributor picker before a choice is made.
pub const UPLOADER_PLACEHOLDER: &str = "Select Your Name";

/// Sentinel that switches a picker to free-text input.
pub const OTHER_OPTION: &str = "Other";

/// How a tool is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingType {
    Free,
    Freemium,
    Paid,
    #[serde(rename = "Usage-based")]
    UsageBased,
    #[serde(rename = "Contact for Pricing")]
    ContactForPricing,
}

impl PricingType {
    /// Every pricing type in the order the form lists them.
    pub const ALL: [PricingType; 5] = [
        PricingType::Free,
        PricingType::Freemium,
        PricingType::Paid,
        PricingType::ContactForPricing,
        PricingType::UsageBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingType::Free => "Free",
            PricingType::Freemium => "Freemium",
            PricingType::Paid => "Paid",
            PricingType::UsageBased => "Usage-based",
            PricingType::ContactForPricing => "Contact for Pricing",
        }
    }

    /// Whether a subscription cost must accompany this pricing type.
    pub fn requires_cost(&self) -> bool {
        matches!(
            self,
            PricingType::Paid | PricingType::Freemium | PricingType::UsageBased
        )
    }
}

impl fmt::Display for PricingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known pricing type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown pricing type '{0}'")]
pub struct UnknownPricingType(pub String);

impl FromStr for PricingType {
    type Err = UnknownPricingType;

    /// Case-insensitive; spaces, hyphens and underscores are interchangeable
    /// so hand-edited files still parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "free" => Ok(PricingType::Free),
            "freemium" => Ok(PricingType::Freemium),
            "paid" => Ok(PricingType::Paid),
            "usagebased" => Ok(PricingType::UsageBased),
            "contactforpricing" => Ok(PricingType::ContactForPricing),
            _ => Err(UnknownPricingType(s.trim().to_string())),
        }
    }
}

/// One catalogued AI tool as stored in the tools file.
///
/// `link`, `pricing_type` and `timestamp` are `None` for rows migrated from
/// older layouts or whose stored value could not be parsed. A `serial_number`
/// of 0 only exists transiently before the load-time repair pass.
///
/// Stored pricing text that names no known type is kept verbatim in
/// `unknown_pricing` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub serial_number: u32,
    pub name: String,
    pub link: Option<String>,
    pub category: String,
    pub pricing_type: Option<PricingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_pricing: Option<String>,
    pub subscription_cost: String,
    pub uploaded_by: String,
    pub timestamp: Option<NaiveDateTime>,
    pub purpose: String,
}

impl ToolRecord {
    /// Pricing text as it is stored: the known type, else the raw value.
    pub fn pricing_text(&self) -> &str {
        match (&self.pricing_type, &self.unknown_pricing) {
            (Some(pricing), _) => pricing.as_str(),
            (None, Some(raw)) => raw.as_str(),
            (None, None) => "",
        }
    }
}

/// A validated tool ready to be appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTool {
    pub name: String,
    pub link: String,
    pub category: String,
    pub pricing_type: PricingType,
    pub subscription_cost: String,
    pub uploaded_by: String,
    pub purpose: String,
}
