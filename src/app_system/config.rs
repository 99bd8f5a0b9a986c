use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

use crate::admin_actor::AdminSettings;
use crate::domain::Fields;
use crate::view::DateFormatter;

pub const DEFAULT_EXPORT_PREFIX: &str = "majormania-orders";
pub const DEFAULT_CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid UTC offset {0:?}, expected +HH:MM or -HH:MM")]
    InvalidOffset(String),
    #[error("Invalid channel buffer {0:?}, expected a positive integer")]
    InvalidBuffer(String),
    #[error("Cannot read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Seed file {path} is not a JSON array of documents: {source}")]
    SeedParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Startup configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub export_prefix: String,
    pub export_dir: PathBuf,
    pub seed_file: Option<PathBuf>,
    pub display_offset: FixedOffset,
    pub channel_buffer: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            export_dir: PathBuf::from("."),
            seed_file: None,
            display_offset: utc(),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let display_offset = match lookup("ORDER_ADMIN_UTC_OFFSET") {
            Some(raw) => parse_offset(&raw).ok_or(ConfigError::InvalidOffset(raw))?,
            None => defaults.display_offset,
        };
        let channel_buffer = match lookup("ORDER_ADMIN_CHANNEL_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidBuffer(raw)),
            },
            None => defaults.channel_buffer,
        };

        Ok(Self {
            export_prefix: lookup("ORDER_ADMIN_EXPORT_PREFIX").unwrap_or(defaults.export_prefix),
            export_dir: lookup("ORDER_ADMIN_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            seed_file: lookup("ORDER_ADMIN_SEED_FILE").map(PathBuf::from),
            display_offset,
            channel_buffer,
        })
    }

    pub fn settings(&self) -> AdminSettings {
        AdminSettings {
            formatter: DateFormatter::new(self.display_offset),
            export_prefix: self.export_prefix.clone(),
        }
    }
}

/// Reads a JSON array of order documents used to seed the in-process collection.
pub fn load_seed(path: &Path) -> Result<Vec<Fields>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::SeedParse {
        path: path.to_path_buf(),
        source,
    })
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// `+HH:MM` / `-HH:MM`
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    let sign = match raw.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let (hours, minutes) = raw[1..].split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
