//! Application layer - use cases and orchestration.
//!
//! Clocks, dice, soundboard and music are combined here into the panel,
//! with formatting for terminal and JSON output.

pub mod dice_roller;
pub mod effects;
#[cfg(test)]
pub mod fake_audio;
pub mod formatter;
pub mod music_player;
pub mod panel;
pub mod soundboard;

pub use dice_roller::DiceRoller;
pub use effects::EffectPlayer;
pub use formatter::{
    format_buttons_table, format_dice_roll, format_history_table, format_json,
    format_library_table, format_music_status, format_timer_line, format_track_list,
    format_volumes, OutputFormat,
};
pub use music_player::MusicPlayer;
pub use panel::{Panel, PanelCommand, PanelEvent, VolumeTarget, HELP};
pub use soundboard::{PressOutcome, SoundBoard};
