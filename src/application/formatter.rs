//! Output formatting for the panel.
//!
//! Clock displays, dice faces, and tables for buttons, history and the
//! sound library. Listing commands also support JSON.

use std::time::Duration;

use chrono::Local;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{
    DiceRoll, MusicPlayback, Preferences, SoundEffectButton, TimerClock, TimerMode,
};
use crate::infrastructure::sound_library::{display_name, SoundLibrary};

/// Output format options for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// Countdown main display `M:SS`, whole seconds rounded up so the clock
/// only reads `0:00` once it has actually run out.
#[must_use]
pub fn format_countdown_main(remaining: Duration) -> String {
    let total = remaining.as_millis().div_ceil(1000);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Stopwatch main display `M:SS`, or `H:MM:SS` from one hour.
#[must_use]
pub fn format_stopwatch_main(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Two-digit hundredths of the current second.
#[must_use]
pub fn format_centis(value: Duration) -> String {
    format!("{:02}", value.subsec_millis() / 10)
}

/// `M:SS` for a track position in seconds; `0:00` for anything unusable.
#[must_use]
pub fn format_track_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".into();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Fixed-width bar for a fraction in `[0, 1]`.
#[must_use]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}

/// Full display string for a clock, e.g. `0:59.50`.
///
/// Hundredths are only shown while running or paused. With hundredths the
/// countdown rounds down like the stopwatch, so `0:28.75` means exactly that.
#[must_use]
pub fn format_clock_value(clock: &TimerClock) -> String {
    let value = clock.value();
    let live = clock.is_running() || clock.is_paused();
    match (clock.mode(), live) {
        (TimerMode::Countdown, false) => format!("{}.00", format_countdown_main(value)),
        (TimerMode::Countdown, true) => {
            let total = value.as_secs();
            format!("{}:{:02}.{}", total / 60, total % 60, format_centis(value))
        }
        (TimerMode::Stopwatch, false) => format!("{}.00", format_stopwatch_main(value)),
        (TimerMode::Stopwatch, true) => {
            format!("{}.{}", format_stopwatch_main(value), format_centis(value))
        }
    }
}

/// One status line for a clock.
#[must_use]
pub fn format_timer_line(clock: &TimerClock) -> String {
    let value = format_clock_value(clock);
    let value = if clock.is_low_time() {
        value.red().bold()
    } else if clock.is_running() {
        value.cyan().bold()
    } else {
        value.normal()
    };

    let status = if clock.is_running() {
        "Running".green()
    } else if clock.is_paused() {
        "Paused".yellow()
    } else if clock.has_expired() {
        "Expired".red().bold()
    } else {
        "Ready".dimmed()
    };

    let arrow = match clock.mode() {
        TimerMode::Countdown => "↓",
        TimerMode::Stopwatch => "↑",
    };

    format!(
        "{:<9} {} {:>10} {} {}",
        clock.mode().to_string(),
        arrow,
        value,
        progress_bar(clock.progress(), 20),
        status
    )
}

/// Unicode die face for `1..=6`.
#[must_use]
pub const fn die_face(value: u8) -> char {
    match value {
        1 => '⚀',
        2 => '⚁',
        3 => '⚂',
        4 => '⚃',
        5 => '⚄',
        6 => '⚅',
        _ => '?',
    }
}

/// `⚂ 3 + ⚄ 5 = 8`, with a doubles marker.
#[must_use]
pub fn format_dice_roll(roll: &DiceRoll) -> String {
    let mut out = format!(
        "{} {} + {} {} = {}",
        die_face(roll.dice1),
        roll.dice1,
        die_face(roll.dice2),
        roll.dice2,
        roll.sum.to_string().bold()
    );
    if roll.is_doubles() {
        out.push_str(&format!("  {}", "doubles!".magenta()));
    }
    out
}

/// Recent rolls, most recent first.
#[must_use]
pub fn format_history_table(rolls: &[DiceRoll]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Dice", "Sum", "Time"]);

    for (i, roll) in rolls.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format!(
                "{} {}  {} {}",
                die_face(roll.dice1),
                roll.dice1,
                die_face(roll.dice2),
                roll.dice2
            ),
            roll.sum.to_string(),
            roll.timestamp.with_timezone(&Local).format("%H:%M").to_string(),
        ]);
    }

    table.to_string()
}

/// Soundboard buttons with their assignments.
#[must_use]
pub fn format_buttons_table(buttons: &[SoundEffectButton], library: &SoundLibrary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Sound", "Status"]);

    for (i, button) in buttons.iter().enumerate() {
        let (sound, status) = if !button.has_sound() {
            ("—".to_string(), "unassigned")
        } else if library.effect_path(&button.sound_file).is_some() {
            (display_name(&button.sound_file).to_string(), "ready")
        } else {
            (button.sound_file.clone(), "missing")
        };
        table.add_row(vec![
            (i + 1).to_string(),
            button.name.clone(),
            sound,
            status.to_string(),
        ]);
    }

    table.to_string()
}

/// Effects and background tracks available on disk.
#[must_use]
pub fn format_library_table(library: &SoundLibrary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Kind", "Name", "File"]);

    let effects = library.effects.iter().map(|f| ("effect", f));
    let tracks = library.background.iter().map(|f| ("music", f));
    for (i, (kind, file)) in effects.chain(tracks).enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            kind.to_string(),
            display_name(file).to_string(),
            file.clone(),
        ]);
    }

    table.to_string()
}

/// Numbered background tracks, for `music list`.
#[must_use]
pub fn format_track_list(library: &SoundLibrary) -> String {
    if library.background.is_empty() {
        return format!(
            "No background tracks in {}",
            library.background_dir.display()
        );
    }

    library
        .background
        .iter()
        .enumerate()
        .map(|(i, file)| format!("  {:2}. {}", i + 1, display_name(file)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Music status line: track, time, bar, flags.
#[must_use]
pub fn format_music_status(state: &MusicPlayback, volume: f32) -> String {
    if !state.has_track() {
        return format!("{} no track selected", "♪".dimmed());
    }

    let status = if state.is_playing {
        "▶".green()
    } else {
        "⏸".yellow()
    };
    let loop_flag = if state.looping { " ⟳" } else { "" };

    format!(
        "{} {} {} / {} {} vol {}{}",
        status,
        display_name(&state.current_track).bold(),
        format_track_time(state.current_time()),
        format_track_time(state.duration),
        progress_bar(state.progress, 20),
        format_percent(volume),
        loop_flag
    )
}

/// Volume preferences.
#[must_use]
pub fn format_volumes(prefs: &Preferences) -> String {
    format!(
        "Music:   {} {}\nEffects: {} {}",
        progress_bar(f64::from(prefs.music_volume), 20),
        format_percent(prefs.music_volume),
        progress_bar(f64::from(prefs.effects_volume), 20),
        format_percent(prefs.effects_volume)
    )
}

fn format_percent(volume: f32) -> String {
    format!("{:.0}%", volume * 100.0)
}

/// Serialize any listing as pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
