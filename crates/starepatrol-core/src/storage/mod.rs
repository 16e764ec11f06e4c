mod config;
pub mod database;
mod settings;

pub use config::{Config, DEFAULT_REMINDER_MESSAGE};
pub use database::{BreakRecord, Database};
pub use settings::{NotificationMode, Settings, SettingsSource, SharedSettings, MIN_INTERVAL_SECS};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/starepatrol[-dev]/` based on STAREPATROL_ENV.
///
/// Set STAREPATROL_ENV=dev to use the development data directory, or
/// STAREPATROL_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STAREPATROL_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STAREPATROL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("starepatrol-dev")
            } else {
                base_dir.join("starepatrol")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::NoConfigDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
