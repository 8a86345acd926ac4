use chrono::{DateTime, NaiveDate};

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parses the date shapes extraction output tends to carry.
///
/// Timestamps keep only their calendar date.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    if let Some(prefix) = trimmed.get(..10)
        && trimmed.len() > 10
        && trimmed.as_bytes().get(10) == Some(&b'T')
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(date);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn days_apart(left: &NaiveDate, right: &NaiveDate) -> i64 {
    (*right - *left).num_days().abs()
}

/// Whole 30-day months between two dates, minimum 1.
///
/// `None` when either side is unparsable or the end is not after the start.
pub fn months_between(start: &str, end: &str) -> Option<f64> {
    let start_date = parse_loose_date(start)?;
    let end_date = parse_loose_date(end)?;
    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return None;
    }
    Some(((days as f64) / 30.0).round().max(1.0))
}
