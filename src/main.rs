//! Game night panel - a terminal control panel for tabletop game nights.
//!
//! Countdown and stopwatch side by side, a two-dice roller with history,
//! a ten-button soundboard and a background music player. Preferences are
//! kept in a small `SQLite` key-value store under `~/.gamenight-panel`.
//!
//! Quick start:
//!   gamenight panel              # Interactive panel (type `help`)
//!   gamenight countdown 5m       # Countdown, alert sound on expiry
//!   gamenight roll               # Roll two dice
//!   gamenight sounds list        # Soundboard buttons

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::formatter::format_countdown_main;
use application::panel::{ClockCommand, MusicCommand};
use application::{
    format_buttons_table, format_dice_roll, format_history_table, format_json,
    format_library_table, format_music_status, format_timer_line, format_track_list,
    format_volumes, soundboard, DiceRoller, EffectPlayer, MusicPlayer, OutputFormat, Panel,
    PanelCommand, PanelEvent, PressOutcome, SoundBoard, VolumeTarget, HELP,
};
use cli::{Cli, Commands, ConfigAction, MusicAction, SoundsAction};
use domain::{resolve_duration, AppConfig, AppError, Preferences};
use infrastructure::preference_store::KEY_DICE_ROLLS;
use infrastructure::{
    ensure_config_exists, load_config, PreferenceStore, ProcessPlayer, SoundLibrary,
};

type LivePanel = Panel<ProcessPlayer, StdRng>;

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| AppError::Config { message: e })?;
    let config = load_config()?;

    match cli.command {
        Commands::Panel => run_panel(&config, PanelOptions::default())?,
        Commands::Countdown { duration, stay } => {
            resolve_duration(&duration)?;
            run_panel(
                &config,
                PanelOptions {
                    startup: vec![
                        PanelCommand::SetCountdown(duration),
                        PanelCommand::Countdown(ClockCommand::Start),
                    ],
                    exit_on_expire: !stay,
                    ..Default::default()
                },
            )?;
        }
        Commands::Stopwatch => run_panel(
            &config,
            PanelOptions {
                startup: vec![PanelCommand::Stopwatch(ClockCommand::Start)],
                ..Default::default()
            },
        )?,
        Commands::Roll => cmd_roll(&config, format)?,
        Commands::History { clear } => cmd_history(&config, clear, format)?,
        Commands::Sounds { action } => cmd_sounds(&config, action, format)?,
        Commands::Volume { music, effects } => cmd_volume(&config, music, effects, format)?,
        Commands::Music { action } => match action {
            MusicAction::List => cmd_music_list(&config, format)?,
            MusicAction::Play { track, no_loop } => run_panel(
                &config,
                PanelOptions {
                    startup: vec![
                        PanelCommand::Music(MusicCommand::Select(track)),
                        PanelCommand::Music(MusicCommand::Play),
                    ],
                    looping: no_loop.then_some(false),
                    ..Default::default()
                },
            )?,
        },
        Commands::Library => cmd_library(&config, format)?,
        Commands::Paths => cmd_paths(&config),
        Commands::Config { action } => cmd_config(&config, &action)?,
    }

    Ok(())
}

/// How the interactive loop is started.
#[derive(Debug, Default)]
struct PanelOptions {
    /// Commands applied before the first tick.
    startup: Vec<PanelCommand>,
    /// Leave once the countdown expires (one-shot `countdown`).
    exit_on_expire: bool,
    /// Override the persisted loop setting without saving it.
    looping: Option<bool>,
}

fn block_on<F: Future>(future: F) -> domain::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::io("Failed to start async runtime", e))?;
    let output = runtime.block_on(future);
    // A pending stdin read lives on a blocking thread; don't wait for it.
    runtime.shutdown_background();
    Ok(output)
}

fn open_store(config: &AppConfig) -> domain::Result<PreferenceStore> {
    PreferenceStore::open(&config.preferences_db_path())
}

fn build_panel(config: &AppConfig, prefs: Preferences, looping: Option<bool>) -> LivePanel {
    let library = SoundLibrary::discover(config);
    let audio = config.audio.clone();
    let soundboard = SoundBoard::new(EffectPlayer::new(move || ProcessPlayer::new(&audio)));
    let music = MusicPlayer::new(
        ProcessPlayer::new(&config.audio),
        prefs.music_volume,
        looping.unwrap_or(prefs.music_loop),
    );
    let dice = DiceRoller::new(
        StdRng::from_os_rng(),
        &config.dice,
        prefs.dice_rolls.clone(),
    );

    Panel::new(prefs, library, &config.audio, dice, soundboard, music)
}

/// Interactive panel command.
fn run_panel(config: &AppConfig, options: PanelOptions) -> domain::Result<()> {
    let mut store = open_store(config)?;
    let prefs = store.load()?;
    let mut panel = build_panel(config, prefs, options.looping);

    if options.startup.is_empty() {
        println!("{}", "🎲 Game night panel".bold());
        println!("Type {} for commands, {} to leave.", "help".cyan(), "quit".cyan());
        println!();
    }

    block_on(panel_loop(&mut panel, &mut store, config, options))??;

    // Flush anything the last iteration changed.
    persist(&mut panel, &mut store);
    Ok(())
}

async fn panel_loop(
    panel: &mut LivePanel,
    store: &mut PreferenceStore,
    config: &AppConfig,
    options: PanelOptions,
) -> domain::Result<()> {
    let mut screen = Screen::new();

    for command in options.startup {
        let events = panel.handle(command, Instant::now());
        if screen.show(panel, &events, options.exit_on_expire) {
            return Ok(());
        }
    }
    persist(panel, store);

    let mut ticker = tokio::time::interval(config.timer.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = panel.tick(Instant::now());
                let quit = screen.show(panel, &events, options.exit_on_expire);
                screen.draw_live(panel);
                persist(panel, store);
                if quit {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        let events = match line.parse::<PanelCommand>() {
                            Ok(command) => panel.handle(command, Instant::now()),
                            Err(e) => vec![PanelEvent::Warning(e.to_string())],
                        };
                        let quit = screen.show(panel, &events, options.exit_on_expire);
                        persist(panel, store);
                        if quit {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("stdin closed");
                        stdin_open = false;
                        if !options.exit_on_expire {
                            break;
                        }
                    }
                    Err(e) => return Err(AppError::io("Failed to read stdin", e)),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted");
                break;
            }
        }
    }

    screen.clear_live();
    Ok(())
}

/// Save preferences if the panel changed them. Failures are logged, not fatal.
fn persist(panel: &mut LivePanel, store: &mut PreferenceStore) {
    if panel.take_dirty() {
        if let Err(e) = store.save(panel.preferences()) {
            tracing::warn!("Could not save preferences: {}", e);
        }
    }
}

/// Terminal output for the panel: event lines plus an optional live status line.
struct Screen {
    live: bool,
    last_frame: String,
}

impl Screen {
    fn new() -> Self {
        Self {
            live: std::io::stdout().is_terminal(),
            last_frame: String::new(),
        }
    }

    /// Print events. Returns true when the loop should end.
    fn show(&mut self, panel: &LivePanel, events: &[PanelEvent], exit_on_expire: bool) -> bool {
        let mut quit = false;
        for event in events {
            self.clear_live();
            match event {
                PanelEvent::Quit => quit = true,
                PanelEvent::CountdownExpired => {
                    println!("{} {}", "⏰".bold(), "Time's up!".red().bold());
                    quit |= exit_on_expire;
                }
                other => println!("{}", describe(panel, other)),
            }
        }
        quit
    }

    fn draw_live(&mut self, panel: &LivePanel) {
        if !self.live || !panel.is_active() {
            return;
        }

        let mut frame = String::new();
        if panel.countdown().is_running() || panel.countdown().is_paused() {
            frame.push_str(&format_timer_line(panel.countdown()));
        }
        if panel.stopwatch().is_running() || panel.stopwatch().is_paused() {
            if !frame.is_empty() {
                frame.push_str("  ");
            }
            frame.push_str(&format_timer_line(panel.stopwatch()));
        }
        if panel.dice().is_rolling() {
            frame.push_str("  🎲 rolling...");
        }

        if frame != self.last_frame {
            print!("\r\x1b[2K{frame}");
            let _ = std::io::stdout().flush();
            self.last_frame = frame;
        }
    }

    fn clear_live(&mut self) {
        if self.live && !self.last_frame.is_empty() {
            print!("\r\x1b[2K");
            let _ = std::io::stdout().flush();
            self.last_frame.clear();
        }
    }
}

fn describe(panel: &LivePanel, event: &PanelEvent) -> String {
    let ok = "✓".green().bold();
    match event {
        PanelEvent::CountdownSet(duration) => {
            format!("{ok} Countdown set to {}", format_countdown_main(*duration).bold())
        }
        PanelEvent::CountdownStarted => format!("{ok} Countdown started"),
        PanelEvent::CountdownPaused => format!("{ok} Countdown paused"),
        PanelEvent::CountdownReset => format!("{ok} Countdown reset"),
        PanelEvent::StopwatchStarted => format!("{ok} Stopwatch started"),
        PanelEvent::StopwatchPaused => format!("{ok} Stopwatch paused"),
        PanelEvent::StopwatchReset => format!("{ok} Stopwatch reset"),
        PanelEvent::DiceRolling => "🎲 Rolling...".to_string(),
        PanelEvent::DiceRevealed(roll) => format!("🎲 {}", format_dice_roll(roll)),
        PanelEvent::HistoryCleared => format!("{ok} Dice history cleared"),
        PanelEvent::Sound(outcome) => describe_press(outcome),
        PanelEvent::TrackSelected(file) => format!("{ok} Selected {}", file.bold()),
        PanelEvent::MusicChanged | PanelEvent::MusicLooped | PanelEvent::MusicEnded => {
            format_music_status(panel.music().state(), panel.music().volume())
        }
        PanelEvent::VolumeChanged(target, level) => {
            let name = match target {
                VolumeTarget::Music => "Music",
                VolumeTarget::Effects => "Effects",
            };
            format!("{ok} {name} volume {:.0}%", level * 100.0)
        }
        PanelEvent::Warning(message) => format!("{} {}", "!".yellow().bold(), message),
        PanelEvent::Status => format_status(panel),
        PanelEvent::Help => HELP.to_string(),
        PanelEvent::CountdownExpired | PanelEvent::Quit => String::new(),
    }
}

fn describe_press(outcome: &PressOutcome) -> String {
    match outcome {
        PressOutcome::Played { name, .. } => format!("♪ {}", name.cyan()),
        PressOutcome::Unassigned { name } => {
            format!("{} {} has no sound assigned", "!".yellow().bold(), name)
        }
        PressOutcome::Missing { name, file } => format!(
            "{} {} plays {}, which is not in the library",
            "!".yellow().bold(),
            name,
            file
        ),
    }
}

fn format_status(panel: &LivePanel) -> String {
    let last_roll = panel
        .dice()
        .history()
        .latest()
        .map_or_else(|| "no rolls yet".dimmed().to_string(), format_dice_roll);

    [
        format_timer_line(panel.countdown()),
        format_timer_line(panel.stopwatch()),
        format!("Dice      {last_roll}"),
        format_music_status(panel.music().state(), panel.music().volume()),
        format_volumes(panel.preferences()),
    ]
    .join("\n")
}

/// Roll command.
fn cmd_roll(config: &AppConfig, format: OutputFormat) -> domain::Result<()> {
    let mut store = open_store(config)?;
    let mut prefs = store.load()?;
    let mut roller = DiceRoller::new(
        StdRng::from_os_rng(),
        &config.dice,
        std::mem::take(&mut prefs.dice_rolls),
    );

    let roll = block_on(roller.roll())?;
    prefs.dice_rolls = roller.history().rolls().to_vec();
    store.save(&prefs)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&roll).map_err(AppError::json_parse)?),
        OutputFormat::Table => println!("🎲 {}", format_dice_roll(&roll)),
    }
    Ok(())
}

/// Dice history command.
fn cmd_history(config: &AppConfig, clear: bool, format: OutputFormat) -> domain::Result<()> {
    let store = open_store(config)?;

    if clear {
        store.remove(KEY_DICE_ROLLS)?;
        println!("{} Dice history cleared", "✓".green().bold());
        return Ok(());
    }

    let prefs = store.load()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&prefs.dice_rolls).map_err(AppError::json_parse)?
        ),
        OutputFormat::Table if prefs.dice_rolls.is_empty() => println!("No rolls yet"),
        OutputFormat::Table => println!("{}", format_history_table(&prefs.dice_rolls)),
    }
    Ok(())
}

/// Soundboard button management.
fn cmd_sounds(config: &AppConfig, action: SoundsAction, format: OutputFormat) -> domain::Result<()> {
    let mut store = open_store(config)?;
    let mut prefs = store.load()?;
    let library = SoundLibrary::discover(config);
    let ok = "✓".green().bold();

    match action {
        SoundsAction::List => match format {
            OutputFormat::Json => println!(
                "{}",
                format_json(&prefs.sound_effect_buttons).map_err(AppError::json_parse)?
            ),
            OutputFormat::Table => println!(
                "{}",
                format_buttons_table(&prefs.sound_effect_buttons, &library)
            ),
        },
        SoundsAction::Assign { number, sound } => {
            soundboard::assign(&mut prefs, &library, number, &sound)?;
            store.save(&prefs)?;
            let button = soundboard::button(&prefs, number)?;
            if button.has_sound() {
                println!("{ok} {} → {}", button.name, button.sound_file.cyan());
            } else {
                println!("{ok} {} cleared", button.name);
            }
        }
        SoundsAction::Rename { number, name } => {
            soundboard::rename(&mut prefs, number, &name)?;
            store.save(&prefs)?;
            println!("{ok} Button {number} renamed to {}", name.trim().cyan());
        }
        SoundsAction::Reset => {
            prefs.reset_buttons();
            store.save(&prefs)?;
            println!("{ok} Soundboard reset to defaults");
        }
        SoundsAction::Play { number } => {
            let audio = config.audio.clone();
            let mut board = SoundBoard::new(EffectPlayer::new(move || ProcessPlayer::new(&audio)));
            let outcome = board.press(&prefs, &library, number)?;
            println!("{}", describe_press(&outcome));
            if matches!(outcome, PressOutcome::Played { .. }) {
                block_on(wait_for_effects(&mut board))?;
            }
        }
    }
    Ok(())
}

/// Wait until every effect voice has finished, or Ctrl-C.
async fn wait_for_effects(board: &mut SoundBoard<ProcessPlayer>) {
    let mut poll = tokio::time::interval(Duration::from_millis(100));
    loop {
        tokio::select! {
            _ = poll.tick() => {
                board.reap();
                if board.active_voices() == 0 {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                board.stop_all();
                break;
            }
        }
    }
}

/// Show or set volumes.
fn cmd_volume(
    config: &AppConfig,
    music: Option<f32>,
    effects: Option<f32>,
    format: OutputFormat,
) -> domain::Result<()> {
    let mut store = open_store(config)?;
    let mut prefs = store.load()?;

    if music.is_some() || effects.is_some() {
        if let Some(level) = music {
            prefs.set_music_volume(level);
        }
        if let Some(level) = effects {
            prefs.set_effects_volume(level);
        }
        store.save(&prefs)?;
    }

    match format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&json!({
                "musicVolume": prefs.music_volume,
                "effectsVolume": prefs.effects_volume,
            }))
            .map_err(AppError::json_parse)?
        ),
        OutputFormat::Table => println!("{}", format_volumes(&prefs)),
    }
    Ok(())
}

/// List background tracks.
fn cmd_music_list(config: &AppConfig, format: OutputFormat) -> domain::Result<()> {
    let library = SoundLibrary::discover(config);
    match format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&library.background).map_err(AppError::json_parse)?
        ),
        OutputFormat::Table => println!("{}", format_track_list(&library)),
    }
    Ok(())
}

/// Show the sound library.
fn cmd_library(config: &AppConfig, format: OutputFormat) -> domain::Result<()> {
    let library = SoundLibrary::discover(config);
    match format {
        OutputFormat::Json => println!("{}", format_json(&library).map_err(AppError::json_parse)?),
        OutputFormat::Table => {
            println!("{}", format_library_table(&library));
            println!();
            println!(
                "Total: {} effect(s), {} track(s)",
                library.effects.len(),
                library.background.len()
            );
        }
    }
    Ok(())
}

/// Show paths command.
fn cmd_paths(config: &AppConfig) {
    println!("{}", "📂 Game Night Panel Paths".bold());
    println!();

    let paths = [
        ("data", config.data_dir()),
        ("config", config.config_file_path()),
        ("preferences", config.preferences_db_path()),
        ("effects", config.effects_dir()),
        ("music", config.background_dir()),
    ];
    for (label, path) in paths {
        let marker = if path.exists() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {marker} {:<12} {}", label, path.display());
    }
}

/// Configuration management.
fn cmd_config(config: &AppConfig, action: &ConfigAction) -> domain::Result<()> {
    match action {
        ConfigAction::Init => {
            let (path, created) = ensure_config_exists()?;
            if created {
                println!("{} Created {}", "✓".green().bold(), path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Show => {
            let text = toml::to_string_pretty(config).map_err(|e| AppError::Config {
                message: format!("Failed to serialize config: {e}"),
            })?;
            println!("{}", "⚙️  Configuration".bold());
            println!();
            println!("{text}");
        }
    }
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
