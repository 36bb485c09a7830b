use crate::config::ConfigError;
use crate::types::{LogEntry, Status, format_date};
use chrono::{Duration, NaiveDateTime};
use rand::{Rng, RngCore};
use std::path::Path;

pub const FINALIZING_MARKER: &str = "Finalizing backup...";
pub const NOTHING_TO_BACKUP_MARKER: &str = "Nothing to backup! All files were skipped.";
pub const ARCHIVE_NOT_CREATED_MARKER: &str = "Archive is not created.";
pub const ZIP_CREATED_MARKER: &str = "[ZIP] File created";
pub const INCREMENTAL_MARKER: &str = "Incremental";

const SYNTHETIC_PREFIX: &str = "Chem";
const PAST_WEEK_SECS: i64 = 7 * 24 * 60 * 60;
const LOG_EXTENSIONS: [&str; 2] = [".txt", ".log"];

/// Marker rule that matched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRule {
    NoFiles,
    ZipCreated,
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Marker(MarkerRule),
    Fallback,
}

/// First matching marker rule, or `None` when the content is unrecognized.
#[must_use]
pub fn detect(content: &str) -> Option<MarkerRule> {
    if content.contains(FINALIZING_MARKER)
        && content.contains(NOTHING_TO_BACKUP_MARKER)
        && content.contains(ARCHIVE_NOT_CREATED_MARKER)
    {
        Some(MarkerRule::NoFiles)
    } else if content.contains(ZIP_CREATED_MARKER) {
        Some(MarkerRule::ZipCreated)
    } else if content.contains(INCREMENTAL_MARKER) {
        Some(MarkerRule::Incremental)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOutcome {
    pub status: Status,
    pub errors: u32,
    pub warnings: u32,
}

impl FallbackOutcome {
    fn details(&self, job_name: &str) -> String {
        match self.status {
            Status::Warning => format!("Job {job_name}: Backup completed with warnings."),
            Status::Failed => format!("Job {job_name}: Failure detected during backup."),
            _ => format!("Job {job_name}: Backup completed successfully."),
        }
    }
}

/// Decides the outcome of a log whose format carries no known marker.
///
/// Implementations must only produce `success`, `warning` or `failed`.
pub trait FallbackPolicy: Send + Sync {
    fn resolve(&self, rng: &mut dyn RngCore) -> FallbackOutcome;
}

/// Uniform draw split into success / warning / failed bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomFallback {
    success_below: f64,
    warning_below: f64,
}

impl RandomFallback {
    pub const DEFAULT_SUCCESS_BELOW: f64 = 0.4;
    pub const DEFAULT_WARNING_BELOW: f64 = 0.7;

    pub fn new(success_below: f64, warning_below: f64) -> Result<Self, ConfigError> {
        let in_range = (0.0..=1.0).contains(&success_below) && (0.0..=1.0).contains(&warning_below);
        if !in_range || success_below > warning_below {
            return Err(ConfigError::InvalidThresholds {
                success_below,
                warning_below,
            });
        }
        Ok(RandomFallback {
            success_below,
            warning_below,
        })
    }
}

impl Default for RandomFallback {
    fn default() -> Self {
        RandomFallback {
            success_below: Self::DEFAULT_SUCCESS_BELOW,
            warning_below: Self::DEFAULT_WARNING_BELOW,
        }
    }
}

impl FallbackPolicy for RandomFallback {
    fn resolve(&self, rng: &mut dyn RngCore) -> FallbackOutcome {
        let roll: f64 = rng.random();
        if roll < self.success_below {
            FallbackOutcome {
                status: Status::Success,
                errors: 0,
                warnings: rng.random_range(0..=2),
            }
        } else if roll < self.warning_below {
            FallbackOutcome {
                status: Status::Warning,
                errors: 0,
                warnings: rng.random_range(1..=5),
            }
        } else {
            FallbackOutcome {
                status: Status::Failed,
                errors: rng.random_range(1..=3),
                warnings: 0,
            }
        }
    }
}

/// Always lands in one band, with that band's minimum counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFallback {
    status: Status,
}

impl FixedFallback {
    pub fn new(status: Status) -> Result<Self, ConfigError> {
        match status {
            Status::Success | Status::Warning | Status::Failed => Ok(FixedFallback { status }),
            other => Err(ConfigError::UnknownFallback(other.to_string())),
        }
    }
}

impl FallbackPolicy for FixedFallback {
    fn resolve(&self, _rng: &mut dyn RngCore) -> FallbackOutcome {
        let (errors, warnings) = match self.status {
            Status::Failed => (1, 0),
            Status::Warning => (0, 1),
            _ => (0, 0),
        };
        FallbackOutcome {
            status: self.status,
            errors,
            warnings,
        }
    }
}

/// How job names and timestamps are produced for a classified file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryScheme {
    /// `Chem` plus a random three digit number, stamped with the current time.
    #[default]
    Synthetic,
    /// Name taken from the file name, stamped at a random time in the past week.
    FromFilename,
}

impl std::str::FromStr for EntryScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthetic" => Ok(EntryScheme::Synthetic),
            "from-filename" | "filename" => Ok(EntryScheme::FromFilename),
            other => Err(ConfigError::UnknownScheme(other.to_string())),
        }
    }
}

/// Parse a fallback name: `random` or one of the fixed bands.
pub fn parse_fallback(
    name: &str,
    success_below: f64,
    warning_below: f64,
) -> Result<Box<dyn FallbackPolicy>, ConfigError> {
    let name = name.trim().to_ascii_lowercase();
    if name == "random" {
        return Ok(Box::new(RandomFallback::new(success_below, warning_below)?));
    }
    let status: Status = name
        .parse()
        .map_err(|_| ConfigError::UnknownFallback(name.clone()))?;
    Ok(Box::new(FixedFallback::new(status)?))
}

pub struct Classifier {
    scheme: EntryScheme,
    fallback: Box<dyn FallbackPolicy>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(EntryScheme::default(), Box::new(RandomFallback::default()))
    }
}

impl Classifier {
    #[must_use]
    pub fn new(scheme: EntryScheme, fallback: Box<dyn FallbackPolicy>) -> Self {
        Classifier { scheme, fallback }
    }

    /// Classify one decoded log file. `now` and `rng` are the only sources of
    /// time and randomness.
    pub fn classify(
        &self,
        content: &str,
        filename: &str,
        now: NaiveDateTime,
        rng: &mut dyn RngCore,
    ) -> LogEntry {
        let (job_name, stamped_at) = match self.scheme {
            EntryScheme::Synthetic => {
                let number: u32 = rng.random_range(1..=999);
                (format!("{SYNTHETIC_PREFIX}{number:03}"), now)
            }
            EntryScheme::FromFilename => {
                let offset = rng.random_range(0..PAST_WEEK_SECS);
                (job_name_from_filename(filename), now - Duration::seconds(offset))
            }
        };

        let detection = detect(content).map_or(Detection::Fallback, Detection::Marker);
        log::debug!("{filename}: {detection:?} -> job {job_name}");

        let (status, errors, warnings, details) = match detection {
            Detection::Marker(MarkerRule::NoFiles) => (
                Status::NoFiles,
                0,
                0,
                format!("Job {job_name}: No new files to back up. All files were skipped."),
            ),
            Detection::Marker(MarkerRule::ZipCreated) => (
                Status::Success,
                0,
                0,
                format!("Job {job_name}: Backup completed successfully. ZIP archive created."),
            ),
            Detection::Marker(MarkerRule::Incremental) => (
                Status::Incremental,
                0,
                0,
                format!("Job {job_name}: Incremental backup completed."),
            ),
            Detection::Fallback => {
                let outcome = self.fallback.resolve(rng);
                (
                    outcome.status,
                    outcome.errors,
                    outcome.warnings,
                    outcome.details(&job_name),
                )
            }
        };

        LogEntry {
            job_name,
            date: format_date(stamped_at),
            status,
            errors,
            warnings,
            details: Some(details),
        }
    }
}

/// `backup_server-01.txt` -> `backup server 01`
#[must_use]
pub fn job_name_from_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .map_or_else(|| filename.to_string(), |n| n.to_string_lossy().to_string());

    let lower = base.to_ascii_lowercase();
    let stem = LOG_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map_or(base.as_str(), |ext| &base[..base.len() - ext.len()]);

    let name = stem
        .replace(['_', '-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() { base } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_date;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NO_FILES_LOG: &str = "12:00:01 Starting job\n\
        12:00:02 Finalizing backup...\n\
        12:00:02 Nothing to backup! All files were skipped.\n\
        12:00:03 Archive is not created.\n";

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 29)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn classify_with(classifier: &Classifier, content: &str, seed: u64) -> LogEntry {
        let mut rng = StdRng::seed_from_u64(seed);
        classifier.classify(content, "job.txt", fixed_now(), &mut rng)
    }

    #[test]
    fn test_no_files_markers() {
        let entry = classify_with(&Classifier::default(), NO_FILES_LOG, 1);
        assert_eq!(entry.status, Status::NoFiles);
        assert_eq!(entry.errors, 0);
        assert_eq!(entry.warnings, 0);
        let details = entry.details.unwrap();
        assert!(details.contains(&entry.job_name));
        assert!(details.contains("No new files"));
    }

    #[test]
    fn test_no_files_needs_all_three_markers() {
        let partial = "Finalizing backup...\nArchive is not created.\n";
        assert_eq!(detect(partial), None);
    }

    #[test]
    fn test_no_files_beats_zip_created() {
        let content = format!("{NO_FILES_LOG}[ZIP] File created\nIncremental\n");
        assert_eq!(detect(&content), Some(MarkerRule::NoFiles));
        let entry = classify_with(&Classifier::default(), &content, 7);
        assert_eq!(entry.status, Status::NoFiles);
    }

    #[test]
    fn test_zip_created_is_success() {
        let entry = classify_with(&Classifier::default(), "[ZIP] File created", 3);
        assert_eq!(entry.status, Status::Success);
        assert_eq!((entry.errors, entry.warnings), (0, 0));
    }

    #[test]
    fn test_zip_created_beats_incremental() {
        assert_eq!(
            detect("Incremental run\n[ZIP] File created"),
            Some(MarkerRule::ZipCreated)
        );
    }

    #[test]
    fn test_incremental_marker() {
        let entry = classify_with(&Classifier::default(), "Mode: Incremental\n", 4);
        assert_eq!(entry.status, Status::Incremental);
        assert_eq!((entry.errors, entry.warnings), (0, 0));
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert_eq!(detect("incremental"), None);
        assert_eq!(detect("[zip] file created"), None);
    }

    #[test]
    fn test_fallback_stays_in_its_bands() {
        let classifier = Classifier::default();
        for seed in 0..500 {
            let entry = classify_with(&classifier, "random unrecognized output", seed);
            match entry.status {
                Status::Success => {
                    assert_eq!(entry.errors, 0);
                    assert!(entry.warnings <= 2);
                }
                Status::Warning => {
                    assert_eq!(entry.errors, 0);
                    assert!((1..=5).contains(&entry.warnings));
                }
                Status::Failed => {
                    assert!((1..=3).contains(&entry.errors));
                    assert_eq!(entry.warnings, 0);
                }
                other => panic!("fallback produced {other}"),
            }
        }
    }

    #[test]
    fn test_fallback_reaches_every_band() {
        let classifier = Classifier::default();
        let statuses: Vec<Status> = (0..200)
            .map(|seed| classify_with(&classifier, "???", seed).status)
            .collect();
        assert!(statuses.contains(&Status::Success));
        assert!(statuses.contains(&Status::Warning));
        assert!(statuses.contains(&Status::Failed));
    }

    #[test]
    fn test_same_seed_same_entry() {
        let classifier = Classifier::default();
        assert_eq!(
            classify_with(&classifier, "no markers", 42),
            classify_with(&classifier, "no markers", 42)
        );
    }

    #[test]
    fn test_threshold_extremes_pin_the_band() {
        let always_failed = Classifier::new(
            EntryScheme::Synthetic,
            Box::new(RandomFallback::new(0.0, 0.0).unwrap()),
        );
        let always_warning = Classifier::new(
            EntryScheme::Synthetic,
            Box::new(RandomFallback::new(0.0, 1.0).unwrap()),
        );
        let always_success = Classifier::new(
            EntryScheme::Synthetic,
            Box::new(RandomFallback::new(1.0, 1.0).unwrap()),
        );
        for seed in 0..50 {
            assert_eq!(classify_with(&always_failed, "x", seed).status, Status::Failed);
            assert_eq!(classify_with(&always_warning, "x", seed).status, Status::Warning);
            assert_eq!(classify_with(&always_success, "x", seed).status, Status::Success);
        }
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(RandomFallback::new(0.8, 0.2).is_err());
        assert!(RandomFallback::new(-0.1, 0.5).is_err());
        assert!(RandomFallback::new(0.5, 1.5).is_err());
    }

    #[test]
    fn test_fixed_fallback() {
        let classifier = Classifier::new(
            EntryScheme::Synthetic,
            Box::new(FixedFallback::new(Status::Failed).unwrap()),
        );
        let entry = classify_with(&classifier, "unknown", 9);
        assert_eq!(entry.status, Status::Failed);
        assert_eq!((entry.errors, entry.warnings), (1, 0));
        assert!(FixedFallback::new(Status::NoFiles).is_err());
        assert!(FixedFallback::new(Status::Incremental).is_err());
    }

    #[test]
    fn test_parse_fallback_names() {
        assert!(parse_fallback("random", 0.4, 0.7).is_ok());
        assert!(parse_fallback("Warning", 0.4, 0.7).is_ok());
        assert!(parse_fallback("no-files", 0.4, 0.7).is_err());
        assert!(parse_fallback("sometimes", 0.4, 0.7).is_err());
        assert!(parse_fallback("random", 0.9, 0.1).is_err());
    }

    #[test]
    fn test_synthetic_scheme_name_and_time() {
        let entry = classify_with(&Classifier::default(), "[ZIP] File created", 11);
        assert!(entry.job_name.starts_with("Chem"));
        let digits = &entry.job_name[4..];
        assert_eq!(digits.len(), 3);
        let number: u32 = digits.parse().unwrap();
        assert!((1..=999).contains(&number));
        assert_eq!(parse_date(&entry.date), Some(fixed_now()));
    }

    #[test]
    fn test_from_filename_scheme_name_and_time() {
        let classifier = Classifier::new(
            EntryScheme::FromFilename,
            Box::new(RandomFallback::default()),
        );
        let mut rng = StdRng::seed_from_u64(5);
        let entry = classifier.classify(
            "[ZIP] File created",
            "logs/nightly_backup-srv01.txt",
            fixed_now(),
            &mut rng,
        );
        assert_eq!(entry.job_name, "nightly backup srv01");

        let ts = entry.timestamp().unwrap();
        assert!(ts <= fixed_now());
        assert!(ts > fixed_now() - Duration::days(7));
    }

    #[test]
    fn test_job_name_from_filename() {
        assert_eq!(job_name_from_filename("Daily_Backup.TXT"), "Daily Backup");
        assert_eq!(job_name_from_filename("db-dump.2024.log"), "db dump 2024");
        assert_eq!(job_name_from_filename("/var/log/chem__007.txt"), "chem 007");
        assert_eq!(job_name_from_filename("report.csv"), "report csv");
        assert_eq!(job_name_from_filename("___.txt"), "___.txt");
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("synthetic".parse::<EntryScheme>().unwrap(), EntryScheme::Synthetic);
        assert_eq!(
            "From-Filename".parse::<EntryScheme>().unwrap(),
            EntryScheme::FromFilename
        );
        assert!("uuid".parse::<EntryScheme>().is_err());
    }
}
