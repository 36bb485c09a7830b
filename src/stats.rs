use crate::types::{LogEntry, Status};
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, Table};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-status counts over a collection of entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub warning: usize,
    pub no_files: usize,
    pub incremental: usize,
}

impl Stats {
    fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Success => self.success += 1,
            Status::Failed => self.failed += 1,
            Status::Warning => self.warning += 1,
            Status::NoFiles => self.no_files += 1,
            Status::Incremental => self.incremental += 1,
        }
    }

    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Success => self.success,
            Status::Failed => self.failed,
            Status::Warning => self.warning,
            Status::NoFiles => self.no_files,
            Status::Incremental => self.incremental,
        }
    }
}

#[must_use]
pub fn compute_stats(entries: &[LogEntry]) -> Stats {
    entries.iter().fold(Stats::default(), |mut stats, e| {
        stats.record(e.status);
        stats
    })
}

/// One group per status in canonical order; entries keep their input order.
#[must_use]
pub fn group_by_status(entries: &[LogEntry]) -> Vec<(Status, Vec<&LogEntry>)> {
    Status::ALL
        .into_iter()
        .map(|status| {
            let jobs = entries.iter().filter(|e| e.status == status).collect();
            (status, jobs)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: Status,
    pub count: usize,
    pub percent: f64,
}

#[must_use]
pub fn status_distribution(entries: &[LogEntry]) -> Vec<StatusShare> {
    let stats = compute_stats(entries);
    Status::ALL
        .into_iter()
        .map(|status| {
            let count = stats.count(status);
            let percent = if stats.total > 0 {
                count as f64 / stats.total as f64 * 100.0
            } else {
                0.0
            };
            StatusShare {
                status,
                count,
                percent,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub day: NaiveDate,
    pub counts: Stats,
}

/// Per-day status counts for the most recent `max_days` days that have
/// entries, oldest first. Entries without a parseable date are left out.
#[must_use]
pub fn timeline(entries: &[LogEntry], max_days: usize) -> Vec<DayCounts> {
    let mut by_day: BTreeMap<NaiveDate, Stats> = BTreeMap::new();
    for entry in entries {
        if let Some(day) = entry.day() {
            by_day.entry(day).or_default().record(entry.status);
        }
    }

    let skip = by_day.len().saturating_sub(max_days);
    by_day
        .into_iter()
        .skip(skip)
        .map(|(day, counts)| DayCounts { day, counts })
        .collect()
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Success => Color::Green,
        Status::Failed => Color::Red,
        Status::Warning => Color::Yellow,
        Status::NoFiles => Color::DarkGrey,
        Status::Incremental => Color::Blue,
    }
}

#[must_use]
pub fn status_cell(status: Status) -> Cell {
    Cell::new(status.label()).fg(status_color(status))
}

pub fn print_stats_cards(stats: &Stats) {
    println!(
        "Total Jobs: {}   Success: {}   Failed: {}   Warnings: {}",
        stats.total.to_string().cyan(),
        stats.success.to_string().green(),
        stats.failed.to_string().red(),
        stats.warning.to_string().yellow()
    );
    println!(
        "No new files: {}   Incremental: {}",
        stats.no_files,
        stats.incremental.to_string().blue()
    );
}

pub fn print_status_lists(entries: &[LogEntry]) {
    for (status, jobs) in group_by_status(entries) {
        let header = format!("{} ({})", status.label(), jobs.len());
        let header = match status {
            Status::Success => header.green(),
            Status::Failed => header.red(),
            Status::Warning => header.yellow(),
            Status::NoFiles => header.dimmed(),
            Status::Incremental => header.blue(),
        };
        println!("{header}");

        if jobs.is_empty() {
            println!("  No jobs with status {}", status.label().to_lowercase());
            continue;
        }

        for job in jobs {
            let badge = match status {
                Status::Success if job.warnings > 0 => format!(" [{} warnings]", job.warnings),
                Status::Warning => format!(" [{} warnings]", job.warnings),
                Status::Failed => format!(" [{} errors]", job.errors),
                _ => String::new(),
            };
            println!("  - {:<20} {}{}", job.job_name, job.date, badge);
        }
    }
}

pub fn print_distribution(entries: &[LogEntry]) {
    let stats = compute_stats(entries);
    if stats.total == 0 {
        println!("No entries.");
        return;
    }

    for share in status_distribution(entries) {
        let width = (share.percent / 2.0).round() as usize;
        let bar = "█".repeat(width);
        let bar = match share.status {
            Status::Success => bar.green(),
            Status::Failed => bar.red(),
            Status::Warning => bar.yellow(),
            Status::NoFiles => bar.dimmed(),
            Status::Incremental => bar.blue(),
        };
        println!(
            "{:<13} {:>4} {:>5.1}% {}",
            share.status.label(),
            share.count,
            share.percent,
            bar
        );
    }
}

pub fn print_timeline(days: &[DayCounts]) {
    if days.is_empty() {
        println!("No dated entries.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    let mut header = vec![Cell::new("Day").add_attribute(Attribute::Bold)];
    header.extend(Status::ALL.into_iter().map(status_cell));
    table.set_header(header);

    for day in days {
        let mut row = vec![Cell::new(day.day.format("%Y-%m-%d"))];
        for status in Status::ALL {
            let count = day.counts.count(status);
            let cell = Cell::new(count);
            row.push(if count > 0 {
                cell.fg(status_color(status))
            } else {
                cell
            });
        }
        table.add_row(row);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_entries;

    fn make_entry(name: &str, date: &str, status: Status) -> LogEntry {
        LogEntry {
            job_name: name.to_string(),
            date: date.to_string(),
            status,
            errors: 0,
            warnings: 0,
            details: None,
        }
    }

    #[test]
    fn test_compute_stats_samples() {
        let stats = compute_stats(&sample_entries());
        assert_eq!(
            stats,
            Stats {
                total: 5,
                success: 2,
                failed: 1,
                warning: 0,
                no_files: 1,
                incremental: 1,
            }
        );
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let mut entries = sample_entries();
        entries.push(make_entry("w", "bad date", Status::Warning));
        entries.push(make_entry("f", "2024-02-01 10:00:00", Status::Failed));

        let stats = compute_stats(&entries);
        assert_eq!(stats.total, entries.len());
        let sum: usize = Status::ALL.into_iter().map(|s| stats.count(s)).sum();
        assert_eq!(sum, stats.total);
    }

    #[test]
    fn test_compute_stats_empty() {
        assert_eq!(compute_stats(&[]), Stats::default());
    }

    #[test]
    fn test_group_by_status() {
        let entries = sample_entries();
        let groups = group_by_status(&entries);

        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].0, Status::Success);
        let names: Vec<&str> = groups[0].1.iter().map(|e| e.job_name.as_str()).collect();
        assert_eq!(names, vec!["Chem001", "Chem005"]);
        assert_eq!(groups[2].0, Status::Warning);
        assert!(groups[2].1.is_empty());
    }

    #[test]
    fn test_status_distribution_percentages() {
        let shares = status_distribution(&sample_entries());
        assert_eq!(shares[0].count, 2);
        assert!((shares[0].percent - 40.0).abs() < 1e-9);
        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);

        let empty = status_distribution(&[]);
        assert!(empty.iter().all(|s| s.count == 0 && s.percent == 0.0));
    }

    #[test]
    fn test_timeline_buckets_by_day() {
        let days = timeline(&sample_entries(), 7);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
        assert_eq!(days[0].counts.incremental, 1);
        assert_eq!(days[0].counts.success, 1);
        assert_eq!(days[1].counts.failed, 1);
        assert_eq!(days[1].counts.no_files, 1);
        assert_eq!(days[2].counts.total, 1);
    }

    #[test]
    fn test_timeline_mixes_date_formats_and_keeps_recent_days() {
        let entries: Vec<LogEntry> = (1..=10)
            .map(|d| {
                make_entry(
                    "job",
                    &format!("{d:02}/03/2024, 12:00:00"),
                    Status::Success,
                )
            })
            .chain(std::iter::once(make_entry(
                "iso",
                "2024-03-10 06:00:00",
                Status::Failed,
            )))
            .chain(std::iter::once(make_entry("undated", "n/a", Status::Failed)))
            .collect();

        let days = timeline(&entries, 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        let last = days.last().unwrap();
        assert_eq!(last.day, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(last.counts.success, 1);
        assert_eq!(last.counts.failed, 1);
    }
}
