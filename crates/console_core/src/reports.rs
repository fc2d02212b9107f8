//! Report range validation and CSV download helpers.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use shared::protocol::ReportRequest;
use tracing::info;

use crate::error::{ClientResult, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportRange {
    /// Both ends are required, inclusive, and may not lie after `today`.
    pub fn parse(start: &str, end: &str, today: NaiveDate) -> Result<Self, ValidationError> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        Self::new(parse_date(start)?, parse_date(end)?, today)
    }

    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange);
        }
        if end > today {
            return Err(ValidationError::FutureDate(end.to_string()));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn to_request(self) -> ReportRequest {
        ReportRequest {
            start_date: self.start,
            end_date: self.end,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Server-provided file names are used as-is in the download path, so anything
/// that could escape the target directory is refused.
pub fn validate_report_file_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0')
    {
        return Err(ValidationError::InvalidFileName(name.to_string()));
    }
    Ok(trimmed)
}

pub async fn save_report(dir: &Path, file_name: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
    let file_name = validate_report_file_name(file_name)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "report saved");
    Ok(path)
}

#[cfg(test)]
#[path = "tests/reports_tests.rs"]
mod tests;
