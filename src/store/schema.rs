//! Canonical column layout of the tools file, header migration and the
//! normalization pass every load runs through.

use std::cmp::Ordering;
use std::fmt;

use csv::StringRecord;

use crate::models::tool::ToolRecord;

/// Header row of the tools file, in order.
pub const EXPECTED_COLUMNS: [&str; 9] = [
    "SerialNumber",
    "Name",
    "Link",
    "Category",
    "PricingType",
    "SubscriptionCost",
    "UploadedBy",
    "Timestamp",
    "Purpose",
];

/// A column of the canonical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    SerialNumber,
    Name,
    Link,
    Category,
    PricingType,
    SubscriptionCost,
    UploadedBy,
    Timestamp,
    Purpose,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::SerialNumber,
        Column::Name,
        Column::Link,
        Column::Category,
        Column::PricingType,
        Column::SubscriptionCost,
        Column::UploadedBy,
        Column::Timestamp,
        Column::Purpose,
    ];

    pub fn header(self) -> &'static str {
        EXPECTED_COLUMNS[self.index()]
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Resolve a header cell, accepting the underscore names of the older layouts.
    pub fn from_header(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches('\u{feff}') {
            "SerialNumber" | "Serial_Number" => Some(Column::SerialNumber),
            "Name" => Some(Column::Name),
            "Link" => Some(Column::Link),
            "Category" => Some(Column::Category),
            "PricingType" | "Pricing_Type" => Some(Column::PricingType),
            "SubscriptionCost" | "Subscription_Cost" => Some(Column::SubscriptionCost),
            "UploadedBy" | "Uploaded_By" => Some(Column::UploadedBy),
            "Timestamp" | "Date_Time" => Some(Column::Timestamp),
            "Purpose" => Some(Column::Purpose),
            _ => None,
        }
    }
}

/// Where each canonical column lives in a file's header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderLayout {
    positions: [Option<usize>; 9],
}

impl HeaderLayout {
    /// Map a file header onto the canonical columns.
    ///
    /// Returns the layout together with a [`Migration`] when the header is not
    /// byte-for-byte the canonical one.
    pub fn resolve(headers: &StringRecord) -> (Self, Option<Migration>) {
        let mut layout = Self::default();
        let mut migration = Migration::default();

        for (position, raw) in headers.iter().enumerate() {
            let trimmed = raw.trim().trim_start_matches('\u{feff}');
            match Column::from_header(trimmed) {
                Some(column) if layout.positions[column.index()].is_none() => {
                    layout.positions[column.index()] = Some(position);
                    if trimmed != column.header() {
                        migration.renamed_columns.push(trimmed.to_string());
                    }
                }
                _ => {
                    if !trimmed.is_empty() {
                        migration.dropped_columns.push(trimmed.to_string());
                    }
                }
            }
        }

        for column in Column::ALL {
            if layout.positions[column.index()].is_none() {
                migration.added_columns.push(column.header());
            }
        }

        let canonical = headers.len() == EXPECTED_COLUMNS.len()
            && headers
                .iter()
                .zip(EXPECTED_COLUMNS)
                .all(|(raw, expected)| raw == expected);

        if canonical {
            return (layout, None);
        }
        let present: Vec<usize> = Column::ALL
            .iter()
            .filter_map(|column| layout.position(*column))
            .collect();
        migration.reordered = present.windows(2).any(|pair| pair[0] > pair[1]);
        (layout, Some(migration))
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.index()]
    }
}

/// Header differences between a file and the canonical layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Migration {
    pub added_columns: Vec<&'static str>,
    pub renamed_columns: Vec<String>,
    pub dropped_columns: Vec<String>,
    pub reordered: bool,
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.added_columns.is_empty() {
            parts.push(format!("added [{}]", self.added_columns.join(", ")));
        }
        if !self.renamed_columns.is_empty() {
            parts.push(format!("renamed [{}]", self.renamed_columns.join(", ")));
        }
        if !self.dropped_columns.is_empty() {
            parts.push(format!("dropped [{}]", self.dropped_columns.join(", ")));
        }
        if self.reordered {
            parts.push("reordered columns".to_string());
        }
        if parts.is_empty() {
            parts.push("rewrote header".to_string());
        }
        f.write_str(&parts.join("; "))
    }
}

/// Next serial number for a table: one past the maximum, or 1 when the
/// table is empty or holds no positive serial numbers. `None` once
/// `u32::MAX` is taken.
pub fn next_serial_number(records: &[ToolRecord]) -> Option<u32> {
    match records.iter().map(|r| r.serial_number).max() {
        Some(max) if max > 0 => max.checked_add(1),
        _ => Some(1),
    }
}

/// Give every row still carrying the 0 sentinel a fresh serial number,
/// in file order. Returns how many rows were repaired. Rows left over once
/// the serial space runs out keep the sentinel.
pub fn repair_serial_numbers(records: &mut [ToolRecord]) -> usize {
    let mut next = next_serial_number(records);
    let mut repaired = 0;
    for record in records.iter_mut().filter(|r| r.serial_number == 0) {
        let Some(serial) = next else {
            tracing::warn!("Serial numbers exhausted; rows left without one");
            break;
        };
        record.serial_number = serial;
        next = serial.checked_add(1);
        repaired += 1;
    }
    repaired
}

/// Most recent first; rows without a timestamp go last. Ties keep the
/// newest serial number first.
pub fn sort_by_recency(records: &mut [ToolRecord]) {
    records.sort_by(|a, b| {
        let by_time = match (a.timestamp, b.timestamp) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then_with(|| b.serial_number.cmp(&a.serial_number))
    });
}

/// The normalization pass: serial repair followed by recency ordering.
pub fn normalize(records: &mut [ToolRecord]) -> usize {
    let repaired = repair_serial_numbers(records);
    sort_by_recency(records);
    repaired
}
