use crate::classifier::Classifier;
use crate::types::LogEntry;
use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{path}: file not found")]
    NotFound { path: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: content is not valid UTF-8 text")]
    Decode { path: String },
}

#[derive(Debug, Clone)]
pub struct RawLog {
    pub file_name: String,
    pub content: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub entries: Vec<LogEntry>,
    pub files: Vec<ProcessedFile>,
    pub failures: Vec<FileFailure>,
}

fn is_log_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}

/// Expand files and directories into the list of log files to process.
///
/// Files given directly are kept whatever their extension; directories are
/// walked recursively for `.txt` files. Missing paths are reported, not fatal.
#[must_use]
pub fn collect_log_files(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<FileFailure>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_file() && is_log_file(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            log::info!("{}: found {} log files", path.display(), found.len());
            files.extend(found);
        } else {
            log::warn!("{}: no such file or directory", path.display());
            failures.push(FileFailure {
                file: path.display().to_string(),
                message: "file not found".to_string(),
            });
        }
    }

    (files, failures)
}

pub fn read_log_file(path: &Path) -> Result<RawLog, LoadError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            LoadError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    let size = bytes.len() as u64;
    let content = String::from_utf8(bytes).map_err(|_| LoadError::Decode {
        path: path.display().to_string(),
    })?;
    let content = match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    };

    Ok(RawLog {
        file_name: display_name(path),
        content,
        size,
    })
}

fn rng_for(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    }
}

fn classify_file(
    path: &Path,
    classifier: &Classifier,
    now: NaiveDateTime,
    mut rng: StdRng,
) -> Result<(LogEntry, ProcessedFile), FileFailure> {
    let raw = read_log_file(path).map_err(|e| FileFailure {
        file: display_name(path),
        message: e.to_string(),
    })?;

    let entry = classifier.classify(&raw.content, &raw.file_name, now, &mut rng);
    Ok((
        entry,
        ProcessedFile {
            name: raw.file_name,
            size: raw.size,
        },
    ))
}

/// Read and classify every file in parallel, then join.
///
/// Results keep the order of `paths`. A file that cannot be read or decoded
/// becomes a failure for that file only. With a seed, file `i` is classified
/// with `seed + i`, so a run is reproducible.
#[must_use]
pub fn process_batch(
    paths: &[PathBuf],
    classifier: &Classifier,
    now: NaiveDateTime,
    seed: Option<u64>,
) -> BatchOutcome {
    if paths.is_empty() {
        return BatchOutcome::default();
    }

    let workers = thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(paths.len());
    let chunk_size = paths.len().div_ceil(workers);

    let results: Vec<Result<(LogEntry, ProcessedFile), FileFailure>> = thread::scope(|s| {
        let handles: Vec<_> = paths
            .chunks(chunk_size)
            .enumerate()
            .map(|(c, chunk)| {
                let offset = c * chunk_size;
                let handle = s.spawn(move || {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(j, path)| {
                            let rng = rng_for(seed, offset + j);
                            panic::catch_unwind(AssertUnwindSafe(|| {
                                classify_file(path, classifier, now, rng)
                            }))
                            .unwrap_or_else(|_| {
                                Err(FileFailure {
                                    file: display_name(path),
                                    message: "classification panicked".to_string(),
                                })
                            })
                        })
                        .collect::<Vec<_>>()
                });
                (handle, chunk)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(handle, chunk)| {
                handle.join().unwrap_or_else(|_| {
                    chunk
                        .iter()
                        .map(|path| {
                            Err(FileFailure {
                                file: display_name(path),
                                message: "worker thread panicked".to_string(),
                            })
                        })
                        .collect()
                })
            })
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok((entry, file)) => {
                outcome.entries.push(entry);
                outcome.files.push(file);
            }
            Err(failure) => {
                log::warn!("failed to process {}: {}", failure.file, failure.message);
                outcome.failures.push(failure);
            }
        }
    }

    log::info!(
        "processed {} files: {} classified, {} failed",
        paths.len(),
        outcome.entries.len(),
        outcome.failures.len()
    );
    outcome
}
