//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the panel.

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Game night panel - countdown, stopwatch, dice, soundboard and music in the terminal.
///
/// Run `gamenight panel` for the interactive panel, or use the one-shot commands.
#[derive(Parser, Debug)]
#[command(name = "gamenight")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for listings: table or json.
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive panel: countdown, stopwatch, dice, soundboard and music.
    Panel,

    /// Run a countdown in the panel and exit when it expires.
    Countdown {
        /// Preset (30s, 1m, 5m, 10m), MM:SS, or a number of minutes.
        duration: String,

        /// Stay in the panel after the countdown expires.
        #[arg(long)]
        stay: bool,
    },

    /// Run a stopwatch in the panel.
    Stopwatch,

    /// Roll two dice and record the result.
    Roll,

    /// Show recent dice rolls.
    History {
        /// Clear the roll history.
        #[arg(long)]
        clear: bool,
    },

    /// Manage soundboard buttons.
    Sounds {
        #[command(subcommand)]
        action: SoundsAction,
    },

    /// Show or set music and effects volume (0-1).
    Volume {
        /// Music volume.
        #[arg(long)]
        music: Option<f32>,

        /// Sound effects volume.
        #[arg(long)]
        effects: Option<f32>,
    },

    /// Background music.
    Music {
        #[command(subcommand)]
        action: MusicAction,
    },

    /// List the sound library (effects and background tracks).
    Library,

    /// Show data, config and sound paths.
    Paths,

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SoundsAction {
    /// List the ten buttons and their sounds.
    List,

    /// Assign an effect to a button (`none` clears it).
    Assign {
        /// Button number (1-10).
        number: usize,

        /// Effect file or display name from the library.
        sound: String,
    },

    /// Rename a button.
    Rename {
        /// Button number (1-10).
        number: usize,

        /// New button name.
        name: String,
    },

    /// Reset all buttons to their defaults.
    Reset,

    /// Play a button's sound and wait for it to finish.
    Play {
        /// Button number (1-10).
        number: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum MusicAction {
    /// List background tracks.
    List,

    /// Play a background track in the panel.
    Play {
        /// Track number, file name or display name.
        track: String,

        /// Do not loop the track.
        #[arg(long)]
        no_loop: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create the default config file if it does not exist.
    Init,

    /// Show the current configuration.
    Show,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
