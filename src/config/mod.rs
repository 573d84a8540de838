use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

/// Application configuration, stored as YAML in the platform config dir.
/// Loaded once at startup; `--db` on the command line overrides `database`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Fixed tenant timezone, as minutes east of UTC. All tenant-local input
    /// is converted through this offset before any comparison.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Maximum distance between the reported location and the contract
    /// location at clock-in/out time.
    #[serde(default = "default_geofence_radius")]
    pub geofence_radius_m: f64,
    /// Interval of the auto-termination sweep.
    #[serde(default = "default_sweep_minutes")]
    pub termination_sweep_minutes: u64,
    /// Tenant-local hour at which the daily assignment notifications fire.
    #[serde(default = "default_notification_hour")]
    pub daily_notification_hour: u32,
}

fn default_utc_offset() -> i32 {
    0
}
fn default_geofence_radius() -> f64 {
    500.0
}
fn default_sweep_minutes() -> u64 {
    15
}
fn default_notification_hour() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            utc_offset_minutes: default_utc_offset(),
            geofence_radius_m: default_geofence_radius(),
            termination_sweep_minutes: default_sweep_minutes(),
            daily_notification_hour: default_notification_hour(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("shiftpoint")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".shiftpoint")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("shiftpoint.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("shiftpoint.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Self {
        let path = Self::config_file();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
                Err(_) => Config::default(),
            }
        } else {
            Config::default()
        }
    }

    /// Persist the configuration, creating the config dir when missing.
    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("serialize: {}", e)))?;
        fs::write(Self::config_file(), yaml)?;
        Ok(())
    }
}
