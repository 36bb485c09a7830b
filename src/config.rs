use crate::classifier::{Classifier, EntryScheme, RandomFallback, parse_fallback};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".audit_config";
pub const DEFAULT_TIMELINE_DAYS: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(
        "invalid fallback thresholds (success below {success_below}, warning below {warning_below}); expected 0 <= success <= warning <= 1"
    )]
    InvalidThresholds {
        success_below: f64,
        warning_below: f64,
    },

    #[error("unknown entry scheme '{0}' (expected synthetic or from-filename)")]
    UnknownScheme(String),

    #[error("unknown fallback '{0}' (expected random, success, warning or failed)")]
    UnknownFallback(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Values read from a `KEY=VALUE` config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileConfig {
    pub scheme: Option<String>,
    pub fallback: Option<String>,
    pub success_below: Option<f64>,
    pub warning_below: Option<f64>,
    pub seed: Option<u64>,
    pub timeline_days: Option<usize>,
}

impl FileConfig {
    /// Load from `path`, or from `.audit_config` in the working directory when
    /// no path is given. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                let key = k.trim();
                let val = v.trim().trim_matches('"');
                map.insert(key, val);
            }
        }

        Ok(FileConfig {
            scheme: map.get("SCHEME").map(|v| (*v).to_string()),
            fallback: map.get("FALLBACK").map(|v| (*v).to_string()),
            success_below: parse_value(&map, "SUCCESS_BELOW")?,
            warning_below: parse_value(&map, "WARNING_BELOW")?,
            seed: parse_value(&map, "SEED")?,
            timeline_days: parse_value(&map, "TIMELINE_DAYS")?,
        })
    }
}

fn parse_value<T: std::str::FromStr>(
    map: &HashMap<&str, &str>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    map.get(key)
        .map(|v| {
            v.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: (*v).to_string(),
            })
        })
        .transpose()
}

/// Command-line values; any `Some` wins over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub scheme: Option<String>,
    pub fallback: Option<String>,
    pub seed: Option<u64>,
    pub timeline_days: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub scheme: EntryScheme,
    pub fallback: String,
    pub success_below: f64,
    pub warning_below: f64,
    pub seed: Option<u64>,
    pub timeline_days: usize,
}

impl Settings {
    pub fn resolve(file: FileConfig, cli: Overrides) -> Result<Self, ConfigError> {
        let scheme = match cli.scheme.or(file.scheme) {
            Some(name) => name.parse()?,
            None => EntryScheme::default(),
        };

        let settings = Settings {
            scheme,
            fallback: cli
                .fallback
                .or(file.fallback)
                .unwrap_or_else(|| "random".to_string()),
            success_below: file
                .success_below
                .unwrap_or(RandomFallback::DEFAULT_SUCCESS_BELOW),
            warning_below: file
                .warning_below
                .unwrap_or(RandomFallback::DEFAULT_WARNING_BELOW),
            seed: cli.seed.or(file.seed),
            timeline_days: cli
                .timeline_days
                .or(file.timeline_days)
                .unwrap_or(DEFAULT_TIMELINE_DAYS),
        };

        // Surface bad fallback settings at startup rather than per file.
        settings.classifier()?;
        Ok(settings)
    }

    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        let fallback = parse_fallback(&self.fallback, self.success_below, self.warning_below)?;
        Ok(Classifier::new(self.scheme, fallback))
    }
}
