use crate::types::{LogEntry, Status};

fn sample(
    job_name: &str,
    date: &str,
    status: Status,
    errors: u32,
    warnings: u32,
    details: &str,
) -> LogEntry {
    LogEntry {
        job_name: job_name.to_string(),
        date: date.to_string(),
        status,
        errors,
        warnings,
        details: Some(details.to_string()),
    }
}

/// Seed entries merged in as the existing collection with `--samples`.
#[must_use]
pub fn sample_entries() -> Vec<LogEntry> {
    vec![
        sample(
            "Chem001",
            "2024-01-15 02:30:15",
            Status::Success,
            0,
            1,
            "Job Chem001: Backup completed successfully. ZIP archive created.",
        ),
        sample(
            "Chem002",
            "2024-01-14 01:45:22",
            Status::Failed,
            3,
            0,
            "Job Chem002: Failure detected during backup.",
        ),
        sample(
            "Chem003",
            "2024-01-14 00:15:10",
            Status::NoFiles,
            0,
            0,
            "Job Chem003: No new files to back up. All files were skipped.",
        ),
        sample(
            "Chem004",
            "2024-01-13 23:30:45",
            Status::Incremental,
            0,
            0,
            "Job Chem004: Incremental backup completed.",
        ),
        sample(
            "Chem005",
            "2024-01-13 20:15:30",
            Status::Success,
            0,
            3,
            "Job Chem005: Backup completed successfully. ZIP archive created.",
        ),
    ]
}
