//! Runtime settings: `.env` / environment first, CLI flags on top.
//!
//! | variable                | default                  |
//! | ----------------------- | ------------------------ |
//! | `LV_CATALOG`            | `moneycontrol_links.csv` |
//! | `LV_USER_AGENT`         | `Mozilla/5.0`            |
//! | `LV_FETCH_TIMEOUT_SECS` | `15`                     |
//! | `LV_PROBE_TIMEOUT_SECS` | `5`                      |
//! | `LV_PROBE_WORKERS`      | `15`                     |

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::verify::{DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_WORKERS};
use crate::data::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::AppError;

pub const DEFAULT_CATALOG_PATH: &str = "moneycontrol_links.csv";
pub const DEFAULT_VERIFIED_CATALOG_PATH: &str = "verified_moneycontrol_links.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            probe_workers: DEFAULT_PROBE_WORKERS,
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read the `LV_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = get("LV_CATALOG") {
            settings.catalog_path = PathBuf::from(path);
        }
        if let Some(ua) = get("LV_USER_AGENT") {
            settings.user_agent = ua;
        }
        if let Some(raw) = get("LV_FETCH_TIMEOUT_SECS") {
            settings.fetch_timeout = Duration::from_secs(parse_positive("LV_FETCH_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("LV_PROBE_TIMEOUT_SECS") {
            settings.probe_timeout = Duration::from_secs(parse_positive("LV_PROBE_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("LV_PROBE_WORKERS") {
            settings.probe_workers = parse_positive("LV_PROBE_WORKERS", &raw)? as usize;
        }

        Ok(settings)
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64, AppError> {
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(AppError::input(format!("Invalid {name}='{raw}': expected a positive integer."))),
    }
}
