use crate::stats::status_cell;
use crate::types::LogEntry;
use clap::ValueEnum;
use comfy_table::{Cell, Color, Table};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    JobName,
    #[default]
    Date,
    Status,
    Errors,
    Warnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Search and ordering applied to the results table.
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub search: Option<String>,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl TableQuery {
    fn matches(&self, entry: &LogEntry) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                entry.job_name.to_lowercase().contains(&term)
                    || entry.status.as_str().contains(&term)
            }
        }
    }

    fn compare(&self, a: &LogEntry, b: &LogEntry) -> Ordering {
        let ord = match self.sort_field {
            SortField::JobName => a.job_name.cmp(&b.job_name),
            SortField::Date => a.timestamp().cmp(&b.timestamp()),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Errors => a.errors.cmp(&b.errors),
            SortField::Warnings => a.warnings.cmp(&b.warnings),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

#[must_use]
pub fn filter_and_sort<'a>(entries: &'a [LogEntry], query: &TableQuery) -> Vec<&'a LogEntry> {
    let mut rows: Vec<&LogEntry> = entries.iter().filter(|e| query.matches(e)).collect();
    rows.sort_by(|a, b| query.compare(a, b));
    rows
}

pub fn print_results_table(rows: &[&LogEntry]) {
    if rows.is_empty() {
        println!("No matching entries.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(vec![
        "Job Name", "Date/Time", "Status", "Errors", "Warnings", "Details",
    ]);

    for entry in rows {
        table.add_row(vec![
            Cell::new(&entry.job_name),
            Cell::new(&entry.date),
            status_cell(entry.status),
            Cell::new(entry.errors).fg(if entry.errors > 0 {
                Color::Red
            } else {
                Color::White
            }),
            Cell::new(entry.warnings).fg(if entry.warnings > 0 {
                Color::Yellow
            } else {
                Color::White
            }),
            Cell::new(entry.details.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
}
