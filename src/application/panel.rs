//! The interactive control panel.
//!
//! Owns a countdown and a stopwatch side by side, the dice roller, the
//! soundboard and the music player. The host loop calls [`Panel::tick`] on
//! a fixed short interval and [`Panel::handle`] for every command line; both
//! return events for the host to render. Preference changes are flagged so
//! the host can persist them.

use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::domain::{
    resolve_duration, AppError, AudioBackend, AudioConfig, DiceRoll, Preferences, Result,
    TickOutcome, TimerClock,
};
use crate::infrastructure::SoundLibrary;

use super::dice_roller::DiceRoller;
use super::music_player::{MusicEvent, MusicPlayer};
use super::soundboard::{PressOutcome, SoundBoard};

/// Clock action shared by the countdown and the stopwatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockCommand {
    Start,
    Pause,
    /// Start if stopped, pause if running.
    Toggle,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MusicCommand {
    Select(String),
    Play,
    Pause,
    Toggle,
    Stop,
    /// Seek to a fraction of the track, `0.0..=1.0`.
    Seek(f64),
    /// Set looping, or flip it when `None`.
    Loop(Option<bool>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTarget {
    Music,
    Effects,
}

/// One parsed line of panel input.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Preset label or custom `MM:SS` / minutes input.
    SetCountdown(String),
    Countdown(ClockCommand),
    Stopwatch(ClockCommand),
    Roll,
    ClearHistory,
    Effect(usize),
    Music(MusicCommand),
    Volume(VolumeTarget, f32),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  cd <30s|1m|5m|10m|MM:SS|min>   set the countdown (only while stopped)
  cd start|pause|reset|toggle    control the countdown (bare `cd` toggles)
  sw start|pause|reset|toggle    control the stopwatch (bare `sw` toggles)
  roll                           roll two dice
  clear                          clear dice history
  fx <1-10>                      play a soundboard button
  music <track|number>           select a background track
  music play|pause|stop          control the music (bare `music` toggles)
  music seek <0-100>             jump to a percentage of the track
  music loop [on|off]            set or flip looping
  vol music|fx <0-1|N%>          set a volume
  status                         show everything
  help                           this text
  quit                           leave the panel";

fn parse_clock(arg: Option<&str>) -> Result<ClockCommand> {
    match arg.map(str::to_lowercase).as_deref() {
        None | Some("toggle" | "t") => Ok(ClockCommand::Toggle),
        Some("start" | "resume" | "go") => Ok(ClockCommand::Start),
        Some("pause" | "stop" | "p") => Ok(ClockCommand::Pause),
        Some("reset" | "r") => Ok(ClockCommand::Reset),
        Some(other) => Err(AppError::invalid_input(format!(
            "unknown clock action '{other}'"
        ))),
    }
}

/// Parse a level as a fraction in `0.0..=1.0`.
///
/// A trailing `%` always means percent. Otherwise `fraction_max` decides:
/// values up to it are fractions, larger ones are percentages.
fn parse_level(text: &str, fraction_max: f64) -> Result<f64> {
    let trimmed = text.trim();
    let (number, percent) = trimmed
        .strip_suffix('%')
        .map_or((trimmed, false), |n| (n, true));
    let value: f64 = number
        .parse()
        .map_err(|_| AppError::invalid_input(format!("'{trimmed}' is not a number")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::invalid_input(format!("'{trimmed}' is out of range")));
    }
    if !percent && value <= fraction_max {
        Ok(value)
    } else {
        Ok((value / 100.0).min(1.0))
    }
}

/// Volume: `0-1` as a fraction, anything above as a percentage.
fn parse_volume(text: &str) -> Result<f64> {
    parse_level(text, 1.0)
}

/// Seek position: a percentage, or a fraction when written with a decimal point.
fn parse_position(text: &str) -> Result<f64> {
    let fraction_max = if text.contains('.') { 1.0 } else { -1.0 };
    parse_level(text, fraction_max)
}

fn parse_music(args: &[&str]) -> Result<MusicCommand> {
    let Some((&first, rest)) = args.split_first() else {
        return Ok(MusicCommand::Toggle);
    };

    match first.to_lowercase().as_str() {
        "play" | "resume" => Ok(MusicCommand::Play),
        "pause" => Ok(MusicCommand::Pause),
        "stop" => Ok(MusicCommand::Stop),
        "toggle" => Ok(MusicCommand::Toggle),
        "seek" => {
            let pct = rest
                .first()
                .ok_or_else(|| AppError::invalid_input("seek needs a position (0-100)"))?;
            Ok(MusicCommand::Seek(parse_position(pct)?))
        }
        "loop" => match rest.first().map(|s| s.to_lowercase()).as_deref() {
            None => Ok(MusicCommand::Loop(None)),
            Some("on" | "yes" | "true") => Ok(MusicCommand::Loop(Some(true))),
            Some("off" | "no" | "false") => Ok(MusicCommand::Loop(Some(false))),
            Some(other) => Err(AppError::invalid_input(format!(
                "loop takes on or off, not '{other}'"
            ))),
        },
        _ => Ok(MusicCommand::Select(args.join(" "))),
    }
}

impl FromStr for PanelCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(AppError::invalid_input("empty command"));
        };

        match head.to_lowercase().as_str() {
            "cd" | "countdown" => match args.first() {
                Some(&arg) if parse_clock(Some(arg)).is_err() => {
                    Ok(Self::SetCountdown(arg.to_string()))
                }
                arg => Ok(Self::Countdown(parse_clock(arg.copied())?)),
            },
            "sw" | "stopwatch" => Ok(Self::Stopwatch(parse_clock(args.first().copied())?)),
            "roll" | "r" | "dice" => Ok(Self::Roll),
            "clear" => Ok(Self::ClearHistory),
            "fx" | "sfx" | "effect" => {
                let number = args
                    .first()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| AppError::invalid_input("fx needs a button number (1-10)"))?;
                Ok(Self::Effect(number))
            }
            "music" | "m" => Ok(Self::Music(parse_music(args)?)),
            "vol" | "volume" => {
                let target = match args.first().map(|s| s.to_lowercase()).as_deref() {
                    Some("music" | "m") => VolumeTarget::Music,
                    Some("fx" | "effects" | "sfx") => VolumeTarget::Effects,
                    _ => return Err(AppError::invalid_input("vol needs `music` or `fx`")),
                };
                let level = args
                    .get(1)
                    .ok_or_else(|| AppError::invalid_input("vol needs a level (0-100)"))?;
                #[allow(clippy::cast_possible_truncation)]
                let level = parse_volume(level)? as f32;
                Ok(Self::Volume(target, level))
            }
            "status" | "s" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(AppError::invalid_input(format!(
                "unknown command '{other}' (try `help`)"
            ))),
        }
    }
}

/// Something the host should show or act on.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    CountdownSet(Duration),
    CountdownStarted,
    CountdownPaused,
    CountdownReset,
    CountdownExpired,
    StopwatchStarted,
    StopwatchPaused,
    StopwatchReset,
    DiceRolling,
    DiceRevealed(DiceRoll),
    HistoryCleared,
    Sound(PressOutcome),
    TrackSelected(String),
    MusicChanged,
    MusicLooped,
    MusicEnded,
    VolumeChanged(VolumeTarget, f32),
    /// Input or action that was ignored; the panel keeps going.
    Warning(String),
    Status,
    Help,
    Quit,
}

/// Panel state and behaviour, independent of the terminal.
pub struct Panel<B: AudioBackend, R: Rng> {
    countdown: TimerClock,
    stopwatch: TimerClock,
    dice: DiceRoller<R>,
    soundboard: SoundBoard<B>,
    music: MusicPlayer<B>,
    prefs: Preferences,
    library: SoundLibrary,
    alert_sound: String,
    roll_sound: String,
    progress_interval: Duration,
    last_music_poll: Option<Instant>,
    prefs_dirty: bool,
}

impl<B: AudioBackend, R: Rng> Panel<B, R> {
    #[must_use]
    pub fn new(
        prefs: Preferences,
        library: SoundLibrary,
        audio: &AudioConfig,
        dice: DiceRoller<R>,
        soundboard: SoundBoard<B>,
        music: MusicPlayer<B>,
    ) -> Self {
        Self {
            countdown: TimerClock::countdown(),
            stopwatch: TimerClock::stopwatch(),
            dice,
            soundboard,
            music,
            prefs,
            library,
            alert_sound: audio.alert_sound.clone(),
            roll_sound: audio.roll_sound.clone(),
            progress_interval: Duration::from_millis(audio.progress_interval_ms.max(1)),
            last_music_poll: None,
            prefs_dirty: false,
        }
    }

    #[must_use]
    pub const fn countdown(&self) -> &TimerClock {
        &self.countdown
    }

    #[must_use]
    pub const fn stopwatch(&self) -> &TimerClock {
        &self.stopwatch
    }

    #[must_use]
    pub const fn dice(&self) -> &DiceRoller<R> {
        &self.dice
    }

    #[must_use]
    pub const fn music(&self) -> &MusicPlayer<B> {
        &self.music
    }

    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// True if anything is moving and worth redrawing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.countdown.is_running()
            || self.stopwatch.is_running()
            || self.dice.is_rolling()
            || self.music.state().is_playing
    }

    /// Returns whether preferences changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.prefs_dirty)
    }

    /// Advance clocks, reveal dice, poll music and release finished effects.
    pub fn tick(&mut self, now: Instant) -> Vec<PanelEvent> {
        let mut events = Vec::new();

        if self.countdown.tick(now) == TickOutcome::Expired {
            self.on_countdown_expired(&mut events);
        }
        self.stopwatch.tick(now);

        if let Some(roll) = self.dice.poll(now) {
            self.record_roll();
            events.push(PanelEvent::DiceRevealed(roll));
        }

        let poll_due = self
            .last_music_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= self.progress_interval);
        if poll_due {
            self.last_music_poll = Some(now);
            match self.music.poll() {
                MusicEvent::None => {}
                MusicEvent::Restarted => events.push(PanelEvent::MusicLooped),
                MusicEvent::Ended => events.push(PanelEvent::MusicEnded),
            }
        }

        self.soundboard.reap();
        events
    }

    /// Apply one command. Recoverable problems come back as `Warning` events.
    pub fn handle(&mut self, command: PanelCommand, now: Instant) -> Vec<PanelEvent> {
        let mut events = Vec::new();
        if let Err(e) = self.apply(command, now, &mut events) {
            tracing::debug!("Command ignored: {}", e);
            events.push(PanelEvent::Warning(e.to_string()));
        }
        events
    }

    fn apply(
        &mut self,
        command: PanelCommand,
        now: Instant,
        events: &mut Vec<PanelEvent>,
    ) -> Result<()> {
        match command {
            PanelCommand::SetCountdown(input) => {
                let duration = resolve_duration(&input)?;
                self.countdown.set_duration(duration)?;
                events.push(PanelEvent::CountdownSet(duration));
            }
            PanelCommand::Countdown(action) => self.apply_countdown(&action, now, events)?,
            PanelCommand::Stopwatch(action) => self.apply_stopwatch(&action, now, events),
            PanelCommand::Roll => {
                if !self.dice.begin(now) {
                    return Err(AppError::invalid_state("dice are already rolling"));
                }
                let roll_sound = self.roll_sound.clone();
                self.cue(&roll_sound, events);
                events.push(PanelEvent::DiceRolling);
            }
            PanelCommand::ClearHistory => {
                self.dice.clear_history();
                self.prefs.dice_rolls.clear();
                self.prefs_dirty = true;
                events.push(PanelEvent::HistoryCleared);
            }
            PanelCommand::Effect(number) => {
                let outcome = self.soundboard.press(&self.prefs, &self.library, number)?;
                events.push(PanelEvent::Sound(outcome));
            }
            PanelCommand::Music(action) => self.apply_music(action, events)?,
            PanelCommand::Volume(target, level) => {
                match target {
                    VolumeTarget::Music => {
                        self.prefs.set_music_volume(level);
                        self.music.set_volume(self.prefs.music_volume);
                    }
                    VolumeTarget::Effects => self.prefs.set_effects_volume(level),
                }
                self.prefs_dirty = true;
                let applied = match target {
                    VolumeTarget::Music => self.prefs.music_volume,
                    VolumeTarget::Effects => self.prefs.effects_volume,
                };
                events.push(PanelEvent::VolumeChanged(target, applied));
            }
            PanelCommand::Status => events.push(PanelEvent::Status),
            PanelCommand::Help => events.push(PanelEvent::Help),
            PanelCommand::Quit => events.push(PanelEvent::Quit),
        }
        Ok(())
    }

    fn apply_countdown(
        &mut self,
        action: &ClockCommand,
        now: Instant,
        events: &mut Vec<PanelEvent>,
    ) -> Result<()> {
        let action = match action {
            ClockCommand::Toggle if self.countdown.is_running() => &ClockCommand::Pause,
            ClockCommand::Toggle => &ClockCommand::Start,
            other => other,
        };

        match action {
            ClockCommand::Start => {
                if !self.countdown.start(now) {
                    if self.countdown.is_running() {
                        return Ok(());
                    }
                    return Err(AppError::invalid_state(
                        "set a countdown first (e.g. `cd 1m`)",
                    ));
                }
                events.push(PanelEvent::CountdownStarted);
            }
            ClockCommand::Pause => {
                if self.countdown.pause(now) == TickOutcome::Expired {
                    self.on_countdown_expired(events);
                } else if self.countdown.is_paused() {
                    events.push(PanelEvent::CountdownPaused);
                }
            }
            ClockCommand::Reset => {
                self.countdown.reset();
                events.push(PanelEvent::CountdownReset);
            }
            ClockCommand::Toggle => {}
        }
        Ok(())
    }

    fn apply_stopwatch(&mut self, action: &ClockCommand, now: Instant, events: &mut Vec<PanelEvent>) {
        let action = match action {
            ClockCommand::Toggle if self.stopwatch.is_running() => &ClockCommand::Pause,
            ClockCommand::Toggle => &ClockCommand::Start,
            other => other,
        };

        match action {
            ClockCommand::Start => {
                if self.stopwatch.start(now) {
                    events.push(PanelEvent::StopwatchStarted);
                }
            }
            ClockCommand::Pause => {
                self.stopwatch.pause(now);
                if self.stopwatch.is_paused() {
                    events.push(PanelEvent::StopwatchPaused);
                }
            }
            ClockCommand::Reset => {
                self.stopwatch.reset();
                events.push(PanelEvent::StopwatchReset);
            }
            ClockCommand::Toggle => {}
        }
    }

    fn apply_music(&mut self, action: MusicCommand, events: &mut Vec<PanelEvent>) -> Result<()> {
        match action {
            MusicCommand::Select(name) => {
                let file = self.music.select(&self.library, &name)?;
                events.push(PanelEvent::TrackSelected(file));
                return Ok(());
            }
            MusicCommand::Play => self.music.play()?,
            MusicCommand::Pause => self.music.pause(),
            MusicCommand::Toggle => self.music.toggle()?,
            MusicCommand::Stop => self.music.stop(),
            MusicCommand::Seek(fraction) => self.music.seek(fraction)?,
            MusicCommand::Loop(setting) => {
                let looping = setting.unwrap_or(!self.music.state().looping);
                self.music.set_looping(looping);
                self.prefs.music_loop = looping;
                self.prefs_dirty = true;
            }
        }
        events.push(PanelEvent::MusicChanged);
        Ok(())
    }

    fn on_countdown_expired(&mut self, events: &mut Vec<PanelEvent>) {
        tracing::info!("Countdown expired");
        let alert = self.alert_sound.clone();
        self.cue(&alert, events);
        events.push(PanelEvent::CountdownExpired);
    }

    fn cue(&mut self, file: &str, events: &mut Vec<PanelEvent>) {
        if let Err(e) = self.soundboard.cue(&self.library, file) {
            events.push(PanelEvent::Warning(format!("sound not playing: {e}")));
        }
    }

    /// Mirror the roller's history, which may be empty with a zero limit.
    fn record_roll(&mut self) {
        self.prefs.dice_rolls = self.dice.history().rolls().to_vec();
        self.prefs_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::effects::EffectPlayer;
    use crate::application::fake_audio::{CallLog, FakeAudio};
    use crate::domain::DiceConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn panel(log: &CallLog) -> Panel<FakeAudio, StdRng> {
        panel_with_dice(log, &DiceConfig::default())
    }

    fn panel_with_dice(log: &CallLog, dice_config: &DiceConfig) -> Panel<FakeAudio, StdRng> {
        let library = SoundLibrary {
            effects_dir: PathBuf::from("/fx"),
            background_dir: PathBuf::from("/bg"),
            effects: vec!["Alien Same Zone.mp3".into(), "Roll Dice.mp3".into(), "Gong.mp3".into()],
            background: vec!["Tavern.mp3".into()],
        };
        let mut prefs = Preferences::default();
        prefs.sound_effect_buttons[0].sound_file = "Gong.mp3".into();

        let effects_log = log.clone();
        let soundboard =
            SoundBoard::new(EffectPlayer::new(move || FakeAudio::new(effects_log.clone())));
        let music = MusicPlayer::new(FakeAudio::new(log.clone()), prefs.music_volume, true);
        let dice = DiceRoller::new(
            StdRng::seed_from_u64(1),
            dice_config,
            prefs.dice_rolls.clone(),
        );

        Panel::new(prefs, library, &AudioConfig::default(), dice, soundboard, music)
    }

    fn cmd(line: &str) -> PanelCommand {
        line.parse().unwrap()
    }

    fn count_alerts(log: &CallLog) -> usize {
        log.borrow()
            .iter()
            .filter(|l| l.contains("Alien Same Zone"))
            .count()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(cmd("cd 1m"), PanelCommand::SetCountdown("1m".into()));
        assert_eq!(cmd("cd 2:30"), PanelCommand::SetCountdown("2:30".into()));
        assert_eq!(cmd("cd start"), PanelCommand::Countdown(ClockCommand::Start));
        assert_eq!(cmd("cd"), PanelCommand::Countdown(ClockCommand::Toggle));
        assert_eq!(cmd("SW reset"), PanelCommand::Stopwatch(ClockCommand::Reset));
        assert_eq!(cmd("fx 3"), PanelCommand::Effect(3));
        assert_eq!(cmd("music seek 50"), PanelCommand::Music(MusicCommand::Seek(0.5)));
        assert_eq!(
            cmd("music Night Rain"),
            PanelCommand::Music(MusicCommand::Select("Night Rain".into()))
        );
        assert_eq!(
            cmd("music loop off"),
            PanelCommand::Music(MusicCommand::Loop(Some(false)))
        );
        assert_eq!(cmd("vol fx 30"), PanelCommand::Volume(VolumeTarget::Effects, 0.3));
        assert_eq!(cmd("vol music 0.25"), PanelCommand::Volume(VolumeTarget::Music, 0.25));
        assert_eq!(cmd("vol music 1"), PanelCommand::Volume(VolumeTarget::Music, 1.0));
        assert_eq!(cmd("vol fx 40%"), PanelCommand::Volume(VolumeTarget::Effects, 0.4));
        assert_eq!(cmd("music seek 1"), PanelCommand::Music(MusicCommand::Seek(0.01)));
        assert_eq!(cmd("music seek 0.5"), PanelCommand::Music(MusicCommand::Seek(0.5)));
        assert_eq!(cmd("q"), PanelCommand::Quit);

        assert!("".parse::<PanelCommand>().is_err());
        assert!("fx".parse::<PanelCommand>().is_err());
        assert!("vol loud 3".parse::<PanelCommand>().is_err());
        assert!("dance".parse::<PanelCommand>().is_err());
    }

    #[test]
    fn test_countdown_expiry_alerts_once() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        panel.handle(cmd("cd 30s"), t0);
        assert_eq!(
            panel.handle(cmd("cd start"), t0),
            vec![PanelEvent::CountdownStarted]
        );

        let mut expired = 0;
        for i in 1..=700u64 {
            let events = panel.tick(t0 + Duration::from_millis(i * 50));
            expired += events
                .iter()
                .filter(|e| **e == PanelEvent::CountdownExpired)
                .count();
        }

        assert_eq!(expired, 1);
        assert_eq!(count_alerts(&log), 1);
        assert_eq!(panel.countdown().value(), Duration::ZERO);
    }

    #[test]
    fn test_malformed_countdown_input_keeps_prior_value() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        panel.handle(cmd("cd 5m"), t0);
        let events = panel.handle(cmd("cd 7:99"), t0);
        assert!(matches!(events.as_slice(), [PanelEvent::Warning(_)]));
        assert_eq!(panel.countdown().value(), Duration::from_secs(300));
    }

    #[test]
    fn test_duration_change_ignored_while_running() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        panel.handle(cmd("cd 1m"), t0);
        panel.handle(cmd("cd start"), t0);
        let events = panel.handle(cmd("cd 10m"), t0 + Duration::from_secs(1));
        assert!(matches!(events.as_slice(), [PanelEvent::Warning(_)]));
        assert_eq!(panel.countdown().initial(), Duration::from_secs(60));
    }

    #[test]
    fn test_start_without_duration_warns() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let events = panel.handle(cmd("cd start"), Instant::now());
        assert!(matches!(events.as_slice(), [PanelEvent::Warning(_)]));
    }

    #[test]
    fn test_stopwatch_runs_alongside_countdown() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        panel.handle(cmd("cd 1m"), t0);
        panel.handle(cmd("cd"), t0);
        panel.handle(cmd("sw"), t0);
        panel.tick(t0 + Duration::from_secs(10));
        panel.handle(cmd("sw pause"), t0 + Duration::from_secs(10));
        panel.tick(t0 + Duration::from_secs(20));

        assert_eq!(panel.countdown().value(), Duration::from_secs(40));
        assert_eq!(panel.stopwatch().value(), Duration::from_secs(10));
        assert!(panel.stopwatch().is_paused());
    }

    #[test]
    fn test_roll_reveals_after_delay_and_marks_dirty() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        assert_eq!(panel.handle(cmd("roll"), t0), vec![PanelEvent::DiceRolling]);
        assert!(log.borrow().iter().any(|l| l.contains("Roll Dice")));
        assert!(matches!(
            panel.handle(cmd("roll"), t0).as_slice(),
            [PanelEvent::Warning(_)]
        ));
        assert!(panel.tick(t0 + Duration::from_millis(100)).is_empty());

        let events = panel.tick(t0 + Duration::from_millis(500));
        let Some(PanelEvent::DiceRevealed(roll)) = events.first() else {
            panic!("expected a revealed roll, got {events:?}");
        };
        assert_eq!(panel.preferences().dice_rolls.first(), Some(roll));
        assert!(panel.take_dirty());
        assert!(!panel.take_dirty());

        panel.handle(cmd("clear"), t0 + Duration::from_secs(1));
        assert!(panel.preferences().dice_rolls.is_empty());
        assert!(panel.take_dirty());
    }

    #[test]
    fn test_roll_with_zero_history_limit_reveals_without_keeping() {
        let log = FakeAudio::log();
        let config = DiceConfig {
            reveal_delay_ms: 0,
            history_limit: 0,
        };
        let mut panel = panel_with_dice(&log, &config);
        let t0 = Instant::now();

        assert_eq!(panel.handle(cmd("roll"), t0), vec![PanelEvent::DiceRolling]);
        let events = panel.tick(t0);
        assert!(matches!(events.first(), Some(PanelEvent::DiceRevealed(_))));
        assert!(panel.preferences().dice_rolls.is_empty());
        assert!(panel.dice().history().latest().is_none());
        assert!(panel.take_dirty());
    }

    #[test]
    fn test_effect_button_and_volume() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        panel.handle(cmd("vol fx 50"), t0);
        let events = panel.handle(cmd("fx 1"), t0);
        assert!(matches!(
            events.as_slice(),
            [PanelEvent::Sound(PressOutcome::Played { .. })]
        ));
        assert!(log.borrow().iter().any(|l| l == "play /fx/Gong.mp3 @0.50"));

        let events = panel.handle(cmd("fx 12"), t0);
        assert!(matches!(events.as_slice(), [PanelEvent::Warning(_)]));
    }

    #[test]
    fn test_music_commands_and_loop_persisted() {
        let log = FakeAudio::log();
        let mut panel = panel(&log);
        let t0 = Instant::now();

        assert_eq!(
            panel.handle(cmd("music tavern"), t0),
            vec![PanelEvent::TrackSelected("Tavern.mp3".into())]
        );
        panel.handle(cmd("music play"), t0);
        assert!(panel.music().state().is_playing);
        assert!(panel.is_active());

        panel.handle(cmd("music loop"), t0);
        assert!(!panel.preferences().music_loop);
        assert!(panel.take_dirty());

        panel.handle(cmd("music stop"), t0);
        assert!(!panel.music().state().is_playing);
    }
}
