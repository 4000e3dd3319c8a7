//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use om_core::Thresholds;
use om_core::summary::DEFAULT_PATIENT_WEIGHT_KG;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Which backend entries are read from and written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Local SQLite file at `database_path`.
    #[default]
    Sqlite,
    /// Hosted REST tables at `remote_url`.
    Remote,
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend holding the entries.
    pub store: StoreKind,
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Base URL of the hosted store.
    pub remote_url: Option<String>,
    /// API key for the hosted store.
    pub remote_api_key: Option<String>,
    /// IANA zone used for day boundaries and display.
    pub timezone: String,
    /// Patient weight used to derive the normal output range.
    pub patient_weight_kg: f64,
    /// Names allowed to record entries. Empty accepts anyone.
    pub caregivers: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store", &self.store)
            .field("database_path", &self.database_path)
            .field("remote_url", &self.remote_url)
            .field(
                "remote_api_key",
                &self.remote_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timezone", &self.timezone)
            .field("patient_weight_kg", &self.patient_weight_kg)
            .field("caregivers", &self.caregivers)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            store: StoreKind::default(),
            database_path: data_dir.join("om.db"),
            remote_url: None,
            remote_api_key: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            patient_weight_kg: DEFAULT_PATIENT_WEIGHT_KG,
            caregivers: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // OM_DATABASE_PATH, OM_TIMEZONE, ...
        figment = figment.merge(Env::prefixed("OM_"));

        figment.extract()
    }

    /// Parses the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| anyhow!("invalid timezone {:?}: {err}", self.timezone))
    }

    /// Normal output range for the configured patient weight.
    pub fn thresholds(&self) -> Result<Thresholds> {
        if !(self.patient_weight_kg.is_finite() && self.patient_weight_kg > 0.0) {
            return Err(anyhow!(
                "patient_weight_kg must be a positive number, got {}",
                self.patient_weight_kg
            ));
        }
        Ok(Thresholds::for_weight(self.patient_weight_kg))
    }
}

/// Returns the platform-specific config directory for om.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("om"))
}

/// Returns the platform-specific data directory for om.
///
/// On Linux: `~/.local/share/om`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("om"))
}
