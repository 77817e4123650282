//! Validation of tool submissions coming from the add-tool form.
//!
//! Every rule is checked and every failure is reported; nothing short-circuits.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateLength;

use crate::errors::AppError;
use crate::models::tool::{
    NewTool, PricingType, CATEGORY_PLACEHOLDER, OTHER_OPTION, PREDEFINED_CATEGORIES,
    PRICING_PLACEHOLDER, UPLOADER_PLACEHOLDER,
};

/// Minimum trimmed length of a tool name.
pub const MIN_NAME_LEN: u64 = 2;

/// Minimum trimmed length of free-text category and contributor names.
pub const MIN_LABEL_LEN: u64 = 2;

/// Minimum trimmed length of the purpose description.
pub const MIN_PURPOSE_LEN: u64 = 10;

const URL_PATTERN: &str = concat!(
    r"(?i)^https?://",
    r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)",
    r"|localhost",
    r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}",
    r"|\[[A-F0-9]*:[A-F0-9:]+\])",
    r"(?::\d+)?",
    r"(?:/?|[/?]\S+)$",
);

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
}

/// Raw add-tool form input. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSubmission {
    pub name: String,
    pub link: String,
    /// A category, the placeholder, or [`OTHER_OPTION`].
    pub category: String,
    /// Used when `category` is [`OTHER_OPTION`].
    pub new_category_name: String,
    pub pricing_type: String,
    pub subscription_cost: String,
    /// A contributor name, the placeholder, or [`OTHER_OPTION`].
    pub uploaded_by: String,
    /// Used when `uploaded_by` is [`OTHER_OPTION`].
    pub other_uploader_name: String,
    pub purpose: String,
}

/// Whether `url` is an absolute http(s) URL with a plausible host.
pub fn is_valid_url(url: &str) -> bool {
    !url.is_empty() && url_regex().is_match(url)
}

fn has_min_chars(value: &str, min: u64) -> bool {
    value.trim().validate_length(Some(min), None, None)
}

fn is_unselected(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder
}

/// Check a submission, returning every failure in form order.
pub fn validate(submission: &ToolSubmission) -> Vec<String> {
    let mut errors = Vec::new();

    if !has_min_chars(&submission.name, MIN_NAME_LEN) {
        errors.push("Tool Name must be at least 2 characters long.".to_string());
    }

    let link = submission.link.trim();
    if link.is_empty() {
        errors.push("Tool Link is required.".to_string());
    } else if !is_valid_url(link) {
        errors.push("Please enter a valid Tool Link (e.g., http://example.com).".to_string());
    }

    let category = submission.category.trim();
    if is_unselected(category, CATEGORY_PLACEHOLDER) {
        errors.push("Please select a tool Category.".to_string());
    } else if category == OTHER_OPTION {
        if !has_min_chars(&submission.new_category_name, MIN_LABEL_LEN) {
            errors.push(
                "If 'Other' category is selected, New Category Name must be at least 2 characters."
                    .to_string(),
            );
        }
    } else if !PREDEFINED_CATEGORIES.contains(&category) && !has_min_chars(category, MIN_LABEL_LEN)
    {
        errors.push("Category must be at least 2 characters.".to_string());
    }

    let pricing = submission.pricing_type.trim();
    if is_unselected(pricing, PRICING_PLACEHOLDER) {
        errors.push("Please select a Pricing Type.".to_string());
    } else {
        match pricing.parse::<PricingType>() {
            Ok(pricing_type)
                if pricing_type.requires_cost() && submission.subscription_cost.trim().is_empty() =>
            {
                errors.push(format!(
                    "Subscription Cost is required if Pricing Type is '{pricing_type}'."
                ));
            }
            Ok(_) => {}
            Err(_) => errors.push(format!("Unknown Pricing Type '{pricing}'.")),
        }
    }

    let uploader = submission.uploaded_by.trim();
    if is_unselected(uploader, UPLOADER_PLACEHOLDER) {
        errors.push("Please select your name from the 'Uploaded By' list.".to_string());
    } else if uploader == OTHER_OPTION {
        if !has_min_chars(&submission.other_uploader_name, MIN_LABEL_LEN) {
            errors.push(
                "If 'Other' uploader is selected, please enter your name (at least 2 characters)."
                    .to_string(),
            );
        }
    } else if !has_min_chars(uploader, MIN_LABEL_LEN) {
        errors.push("Uploaded By must be at least 2 characters.".to_string());
    }

    if !has_min_chars(&submission.purpose, MIN_PURPOSE_LEN) {
        errors.push(
            "Purpose & Usage description must be at least 10 characters long.".to_string(),
        );
    }

    errors
}

impl ToolSubmission {
    /// Validate and resolve the form sentinels into a storable tool.
    pub fn into_new_tool(self) -> Result<NewTool, AppError> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let pricing_type = self
            .pricing_type
            .trim()
            .parse::<PricingType>()
            .map_err(|e| AppError::Validation(vec![e.to_string()]))?;

        let category = match self.category.trim() {
            OTHER_OPTION => self.new_category_name.trim().to_string(),
            other => other.to_string(),
        };
        let uploaded_by = match self.uploaded_by.trim() {
            OTHER_OPTION => self.other_uploader_name.trim().to_string(),
            other => other.to_string(),
        };
        let subscription_cost = if pricing_type.requires_cost() {
            self.subscription_cost.trim().to_string()
        } else {
            String::new()
        };

        Ok(NewTool {
            name: self.name.trim().to_string(),
            link: self.link.trim().to_string(),
            category,
            pricing_type,
            subscription_cost,
            uploaded_by,
            purpose: self.purpose.trim().to_string(),
        })
    }
}
