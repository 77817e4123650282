//! CSV encoding of tool records.
//!
//! Reading is lenient: any header layout the schema module can resolve is
//! accepted, unparsable serial numbers become 0 and unparsable timestamps
//! become `None`. Writing always produces the canonical layout.

use std::io;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::models::tool::{PricingType, ToolRecord};
use crate::store::schema::{Column, HeaderLayout, Migration, EXPECTED_COLUMNS};

/// Serialized timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_INPUT_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Records decoded from a tools file, before normalization.
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<ToolRecord>,
    pub migration: Option<Migration>,
    pub warnings: Vec<String>,
}

/// Parse a stored timestamp. Returns `None` for anything unrecognized.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a stored serial number, mapping anything that is not a positive
/// integer (including `3.5`, `-1` and blanks) to the 0 sentinel.
pub fn parse_serial(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return u32::try_from(value).unwrap_or(0);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value > 0.0 => {
            if value <= f64::from(u32::MAX) {
                value as u32
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Decode a tools file.
pub fn read_records<R: io::Read>(reader: R) -> Result<Decoded, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let (layout, migration) = HeaderLayout::resolve(&headers);

    let mut decoded = Decoded {
        records: Vec::new(),
        migration,
        warnings: Vec::new(),
    };

    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let (record, warning) = decode_row(&layout, &row, i + 1);
        if let Some(warning) = warning {
            decoded.warnings.push(warning);
        }
        decoded.records.push(record);
    }

    Ok(decoded)
}

fn decode_row(
    layout: &HeaderLayout,
    row: &StringRecord,
    row_number: usize,
) -> (ToolRecord, Option<String>) {
    let cell = |column: Column| cell_value(layout, row, column);

    let link = Some(cell(Column::Link).trim())
        .filter(|link| !link.is_empty())
        .map(str::to_string);

    let pricing_raw = cell(Column::PricingType).trim();
    let (pricing_type, unknown_pricing, warning) = if pricing_raw.is_empty() {
        (None, None, None)
    } else {
        match pricing_raw.parse::<PricingType>() {
            Ok(pricing) => (Some(pricing), None, None),
            Err(e) => (
                None,
                Some(pricing_raw.to_string()),
                Some(format!("row {row_number}: {e}")),
            ),
        }
    };

    let record = ToolRecord {
        serial_number: parse_serial(cell(Column::SerialNumber)),
        name: cell(Column::Name).to_string(),
        link,
        category: cell(Column::Category).to_string(),
        pricing_type,
        unknown_pricing,
        subscription_cost: cell(Column::SubscriptionCost).to_string(),
        uploaded_by: cell(Column::UploadedBy).to_string(),
        timestamp: parse_timestamp(cell(Column::Timestamp)),
        purpose: cell(Column::Purpose).to_string(),
    };
    (record, warning)
}

fn cell_value<'a>(layout: &HeaderLayout, row: &'a StringRecord, column: Column) -> &'a str {
    layout
        .position(column)
        .and_then(|position| row.get(position))
        .unwrap_or("")
}

/// Encode records in the canonical layout, header first.
pub fn write_records<W: io::Write>(writer: W, records: &[ToolRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(EXPECTED_COLUMNS)?;
    for record in records {
        let serial = record.serial_number.to_string();
        let timestamp = format_timestamp(record.timestamp);
        writer.write_record([
            serial.as_str(),
            record.name.as_str(),
            record.link.as_deref().unwrap_or(""),
            record.category.as_str(),
            record.pricing_text(),
            record.subscription_cost.as_str(),
            record.uploaded_by.as_str(),
            timestamp.as_str(),
            record.purpose.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
