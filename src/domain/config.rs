//! Application configuration records.
//!
//! Every section and field has a default so a partial (or missing)
//! `config.toml` always yields a usable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::dice::DEFAULT_HISTORY_LIMIT;

/// Timer polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Interval between clock ticks in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl TimerConfig {
    /// Tick interval, never shorter than 1 ms.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

const fn default_tick_interval() -> u64 {
    50
}

/// Dice roller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceConfig {
    /// Delay between starting a roll and revealing it, in milliseconds.
    #[serde(default = "default_reveal_delay")]
    pub reveal_delay_ms: u64,

    /// Number of rolls kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: default_reveal_delay(),
            history_limit: default_history_limit(),
        }
    }
}

impl DiceConfig {
    #[must_use]
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

const fn default_reveal_delay() -> u64 {
    500
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Audio library and player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Root of the sound library (`effects/` and `background/` inside).
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,

    /// Effect played once when a countdown expires.
    #[serde(default = "default_alert_sound")]
    pub alert_sound: String,

    /// Effect played when a dice roll starts.
    #[serde(default = "default_roll_sound")]
    pub roll_sound: String,

    /// External player command. `{file}`, `{volume}` (0-100) and `{start}`
    /// (seconds) are substituted per argument.
    #[serde(default = "default_player_command")]
    pub player_command: Vec<String>,

    /// Command printing a source's duration in seconds on stdout. `{file}` is substituted.
    #[serde(default = "default_probe_command")]
    pub probe_command: Vec<String>,

    /// Music progress polling interval in milliseconds.
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sounds_dir: None,
            alert_sound: default_alert_sound(),
            roll_sound: default_roll_sound(),
            player_command: default_player_command(),
            probe_command: default_probe_command(),
            progress_interval_ms: default_progress_interval(),
        }
    }
}

fn default_alert_sound() -> String {
    "Alien Same Zone.mp3".into()
}

fn default_roll_sound() -> String {
    "Roll Dice.mp3".into()
}

fn default_player_command() -> Vec<String> {
    [
        "ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet", "-ss", "{start}", "-volume",
        "{volume}", "{file}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_probe_command() -> Vec<String> {
    [
        "ffprobe",
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
        "{file}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_progress_interval() -> u64 {
    100
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub dice: DiceConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gamenight-panel")
    }

    /// Preference database path.
    #[must_use]
    pub fn preferences_db_path(&self) -> PathBuf {
        self.data_dir().join("preferences.db")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }

    /// Sound library root, defaulting to `<data_dir>/sounds`.
    #[must_use]
    pub fn sounds_dir(&self) -> PathBuf {
        self.audio
            .sounds_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("sounds"))
    }

    #[must_use]
    pub fn effects_dir(&self) -> PathBuf {
        self.sounds_dir().join("effects")
    }

    #[must_use]
    pub fn background_dir(&self) -> PathBuf {
        self.sounds_dir().join("background")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timer.tick_interval_ms, 50);
        assert_eq!(config.dice.reveal_delay_ms, 500);
        assert_eq!(config.dice.history_limit, 5);
        assert_eq!(config.audio.progress_interval_ms, 100);
        assert_eq!(config.audio.alert_sound, "Alien Same Zone.mp3");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("[dice]\nreveal_delay_ms = 0\n").unwrap();
        assert_eq!(config.dice.reveal_delay_ms, 0);
        assert_eq!(config.dice.history_limit, 5);
        assert_eq!(config.timer.tick_interval_ms, 50);
    }

    #[test]
    fn test_tick_interval_never_zero() {
        let config = TimerConfig { tick_interval_ms: 0 };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_sound_dirs_follow_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/gn")),
            },
            ..Default::default()
        };
        assert_eq!(config.effects_dir(), PathBuf::from("/tmp/gn/sounds/effects"));
        assert_eq!(
            config.background_dir(),
            PathBuf::from("/tmp/gn/sounds/background")
        );
        assert_eq!(
            config.preferences_db_path(),
            PathBuf::from("/tmp/gn/preferences.db")
        );
    }
}
