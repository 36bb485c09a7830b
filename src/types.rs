use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format the classifier writes timestamps in (`pt-BR` locale convention).
pub const LOCALE_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Formats accepted when parsing an entry's date back into an instant.
const DATE_FORMATS: [&str; 4] = [
    LOCALE_DATE_FORMAT,
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Success,
    Failed,
    Warning,
    NoFiles,
    Incremental,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Success,
        Status::Failed,
        Status::Warning,
        Status::NoFiles,
        Status::Incremental,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Warning => "warning",
            Status::NoFiles => "no-files",
            Status::Incremental => "incremental",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Failed => "Failed",
            Status::Warning => "Warning",
            Status::NoFiles => "No new files",
            Status::Incremental => "Incremental",
        }
    }

    /// CSS class shared by the HTML views.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Status::Success => "green",
            Status::Failed => "red",
            Status::Warning => "yellow",
            Status::NoFiles => "muted",
            Status::Incremental => "blue",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// One classified backup-job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub job_name: String,
    pub date: String,
    pub status: Status,
    pub errors: u32,
    pub warnings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Parse `date` back into an instant. `None` when no known format matches.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }

    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }
}

#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[must_use]
pub fn format_date(ts: NaiveDateTime) -> String {
    ts.format(LOCALE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(date: &str) -> LogEntry {
        LogEntry {
            job_name: "Chem001".to_string(),
            date: date.to_string(),
            status: Status::Success,
            errors: 0,
            warnings: 0,
            details: None,
        }
    }

    #[test]
    fn test_timestamp_accepts_locale_and_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(2, 30, 15)
            .unwrap();

        assert_eq!(make_entry("15/01/2024, 02:30:15").timestamp(), Some(expected));
        assert_eq!(make_entry("15/01/2024 02:30:15").timestamp(), Some(expected));
        assert_eq!(make_entry("2024-01-15 02:30:15").timestamp(), Some(expected));
        assert_eq!(make_entry("not a date").timestamp(), None);
    }

    #[test]
    fn test_format_date_round_trips_through_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(14, 3, 22)
            .unwrap();
        let formatted = format_date(ts);
        assert_eq!(formatted, "16/10/2026, 14:03:22");
        assert_eq!(make_entry(&formatted).timestamp(), Some(ts));
    }

    #[test]
    fn test_status_parse_and_serialize() {
        assert_eq!("no-files".parse::<Status>(), Ok(Status::NoFiles));
        assert_eq!("FAILED".parse::<Status>(), Ok(Status::Failed));
        assert!("done".parse::<Status>().is_err());

        let json = serde_json::to_string(&Status::NoFiles).unwrap();
        assert_eq!(json, "\"no-files\"");
    }

    #[test]
    fn test_absent_details_are_not_serialized() {
        let json = serde_json::to_value(make_entry("2024-01-15 02:30:15")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["jobName"], "Chem001");

        let mut with_empty = make_entry("2024-01-15 02:30:15");
        with_empty.details = Some(String::new());
        let json = serde_json::to_value(with_empty).unwrap();
        assert_eq!(json["details"], "");
    }
}
