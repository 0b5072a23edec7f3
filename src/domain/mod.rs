//! Domain layer - core state machines and types.
//!
//! This layer contains the timer clock, dice, preferences and playback
//! records without any external dependencies (DB, audio, terminal).

pub mod audio;
pub mod config;
pub mod dice;
pub mod error;
pub mod preferences;
pub mod timer;

pub use audio::{AudioBackend, MusicPlayback};
pub use config::{AppConfig, AudioConfig, DiceConfig};
pub use dice::{DiceHistory, DiceRoll};
pub use error::{AppError, Result};
pub use preferences::{ButtonUpdate, Preferences, SoundEffectButton, SOUND_BUTTON_COUNT};
pub use timer::{resolve_duration, TickOutcome, TimerClock, TimerMode};
