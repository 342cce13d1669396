//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date (UTC)
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Format a date as `YYYY-MM-DD`, the form used by the assessment date field
/// and by export file names
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}
