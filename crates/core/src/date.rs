use chrono::{DateTime, Datelike, Local};

/// Formats the local calendar date of `date` as `YYYY-MM-DD`.
pub fn format_date(date: &DateTime<Local>) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn today() -> String {
    format_date(&Local::now())
}
