//! Parsers for bulk-upload input.

use chrono::NaiveDate;
use serde_json::Value;
use shared::protocol::HoroscopeDraft;

use crate::error::ValidationError;

pub const HOROSCOPE_FIELD_SEPARATOR: char = '|';
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `signName|description|date|isActive` lines. Blank lines are skipped and
/// reported line numbers are 1-based positions in `text`.
pub fn parse_horoscope_lines(text: &str) -> Result<Vec<HoroscopeDraft>, ValidationError> {
    let mut drafts = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = index + 1;
        let fields: Vec<&str> = raw.split(HOROSCOPE_FIELD_SEPARATOR).map(str::trim).collect();
        let [sign_name, description, date, active, ..] = fields.as_slice() else {
            return Err(ValidationError::BulkLineFormat { line });
        };
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            ValidationError::BulkLineDate {
                line,
                value: date.to_string(),
            }
        })?;
        drafts.push(HoroscopeDraft {
            sign_name: sign_name.to_string(),
            description: description.to_string(),
            date,
            is_active: active_flag(active),
        });
    }
    if drafts.is_empty() {
        return Err(ValidationError::EmptyBulkInput);
    }
    Ok(drafts)
}

// Anything that is not a non-zero integer counts as active.
fn active_flag(raw: &str) -> i32 {
    match raw.parse::<i32>() {
        Ok(0) | Err(_) => 1,
        Ok(flag) => flag,
    }
}

/// Accepts a JSON array of feedback objects, or a single object.
pub fn parse_feedback_json(text: &str) -> Result<Vec<Value>, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyBulkInput);
    }
    let value: Value =
        serde_json::from_str(text).map_err(|err| ValidationError::InvalidJson(err.to_string()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        object @ Value::Object(_) => vec![object],
        _ => return Err(ValidationError::FeedbackNotObject),
    };
    if entries.is_empty() {
        return Err(ValidationError::EmptyBulkInput);
    }
    if !entries.iter().all(Value::is_object) {
        return Err(ValidationError::FeedbackNotObject);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "tests/bulk_tests.rs"]
mod tests;
