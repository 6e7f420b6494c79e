use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::history::RecoveryPolicy;

pub const ENV_HOME: &str = "QR_KEEPER_HOME";
pub const ENV_QUOTA_BYTES: &str = "QR_KEEPER_QUOTA_BYTES";
pub const ENV_TRIM_RATIO: &str = "QR_KEEPER_TRIM_RATIO";

const APP_DIR_NAME: &str = "qr-keeper";

/// Runtime settings for the file-backed history store
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub quota_bytes: Option<u64>,
    pub trim_ratio: f64,
}

impl Settings {
    /// Resolve settings from `QR_KEEPER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var(ENV_HOME) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let quota_bytes = match env::var(ENV_QUOTA_BYTES) {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{} must be a byte count, got {:?}", ENV_QUOTA_BYTES, raw))?,
            ),
            Err(_) => None,
        };

        let trim_ratio = match env::var(ENV_TRIM_RATIO) {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{} must be a number, got {:?}", ENV_TRIM_RATIO, raw))?,
            Err(_) => RecoveryPolicy::DEFAULT_TRIM_RATIO,
        };

        Ok(Self { data_dir, quota_bytes, trim_ratio })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        quota_bytes: Option<u64>,
        trim_ratio: Option<f64>,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if quota_bytes.is_some() {
            self.quota_bytes = quota_bytes;
        }
        if let Some(ratio) = trim_ratio {
            self.trim_ratio = ratio;
        }
        self
    }
}

/// Get the platform data directory for qr-keeper
pub fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}
