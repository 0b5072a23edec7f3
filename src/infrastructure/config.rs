//! Configuration file management.
//!
//! Handles loading and creating the TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Game Night Panel Configuration
# Auto-generated - edit as needed

[timer]
# Clock tick interval in milliseconds (default: 50)
tick_interval_ms = 50

[dice]
# Delay before a roll is revealed, in milliseconds (default: 500)
reveal_delay_ms = 500

# Number of recent rolls kept (default: 5)
history_limit = 5

[audio]
# Sound library root with effects/ and background/ subdirectories
# (optional, defaults to <data_dir>/sounds)
# sounds_dir = "/path/to/sounds"

# Effect played when the countdown reaches zero
alert_sound = "Alien Same Zone.mp3"

# Effect played when dice are rolled
roll_sound = "Roll Dice.mp3"

# External player; {file}, {volume} (0-100) and {start} (seconds) are substituted
player_command = ["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet", "-ss", "{start}", "-volume", "{volume}", "{file}"]

# Prints a file's duration in seconds
probe_command = ["ffprobe", "-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1", "{file}"]

# Music progress polling interval in milliseconds (default: 100)
progress_interval_ms = 100

[paths]
# Custom data directory (optional, defaults to ~/.gamenight-panel)
# data_dir = "/custom/path"
"#;

/// Load configuration from file or fall back to defaults.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the commented default configuration file if it doesn't exist.
///
/// Returns the path and whether the file was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists() -> Result<(PathBuf, bool)> {
    let config_path = config_file_path();
    let created = write_default_config(&config_path)?;
    Ok((config_path, created))
}

fn write_default_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}
