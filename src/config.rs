//! Environment configuration
//!
//! - `CONFERENCE_PORT`: HTTP port (default 3030)
//! - `CONFERENCE_DATA_FILE`: JSONL snapshot path; unset keeps data in memory
//! - `CONFERENCE_JWT_SECRET`: token signing secret; unset generates one
//! - `CONFERENCE_TXN_RETRIES`: retries for colliding transactions (default 3)
//! - `CONFERENCE_ANNOUNCEMENT_REFRESH_SECS`: announcement refresh period (default 3600)

use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::store::DEFAULT_TRANSACTION_RETRIES;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_ANNOUNCEMENT_REFRESH_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_file: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub transaction_retries: usize,
    pub announcement_refresh: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_file: None,
            jwt_secret: None,
            transaction_retries: DEFAULT_TRANSACTION_RETRIES,
            announcement_refresh: Duration::from_secs(DEFAULT_ANNOUNCEMENT_REFRESH_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; invalid values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let refresh_secs = parse_or(&lookup, "CONFERENCE_ANNOUNCEMENT_REFRESH_SECS", DEFAULT_ANNOUNCEMENT_REFRESH_SECS);

        Self {
            port: parse_or(&lookup, "CONFERENCE_PORT", defaults.port),
            data_file: lookup("CONFERENCE_DATA_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(|path| resolve_path(&path)),
            jwt_secret: lookup("CONFERENCE_JWT_SECRET").filter(|secret| !secret.is_empty()),
            transaction_retries: parse_or(&lookup, "CONFERENCE_TXN_RETRIES", defaults.transaction_retries),
            announcement_refresh: Duration::from_secs(refresh_secs.max(1)),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
    }
}

/// Relative paths resolve against the working directory
fn resolve_path(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}
