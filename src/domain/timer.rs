//! Countdown and stopwatch clock.
//!
//! The clock never counts ticks. Every `tick(now)` measures the real time
//! elapsed since the previous reference instant and applies exactly that
//! delta, so scheduling jitter in the host loop cannot accumulate as drift.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Remaining time at or below which a running countdown is "low".
pub const LOW_TIME_THRESHOLD: Duration = Duration::from_secs(5);

/// Which way the clock runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Counts down from an initial duration to zero.
    #[default]
    Countdown,
    /// Counts up from zero with no end.
    Stopwatch,
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Countdown => write!(f, "Countdown"),
            Self::Stopwatch => write!(f, "Stopwatch"),
        }
    }
}

/// Fixed countdown durations offered next to custom input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPreset {
    pub label: &'static str,
    pub seconds: u64,
}

impl TimerPreset {
    /// Duration of this preset.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    /// Look up a preset by its label (`30s`, `1m`, `5m`, `10m`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        PRESETS
            .iter()
            .copied()
            .find(|p| p.label.eq_ignore_ascii_case(label.trim()))
    }
}

pub const PRESETS: [TimerPreset; 4] = [
    TimerPreset { label: "30s", seconds: 30 },
    TimerPreset { label: "1m", seconds: 60 },
    TimerPreset { label: "5m", seconds: 300 },
    TimerPreset { label: "10m", seconds: 600 },
];

/// Parse custom countdown input.
///
/// Accepts `MM:SS` (seconds below 60) or a bare number of minutes. Returns
/// `None` for anything malformed or for a zero-length result.
#[must_use]
pub fn parse_time_input(input: &str) -> Option<Duration> {
    let input = input.trim();

    if let Some((mins, secs)) = input.split_once(':') {
        let mins: u64 = mins.trim().parse().ok()?;
        let secs: u64 = secs.trim().parse().ok()?;
        if secs >= 60 {
            return None;
        }
        let total = mins.checked_mul(60)?.checked_add(secs)?;
        return (total > 0).then(|| Duration::from_secs(total));
    }

    let mins: u64 = input.parse().ok()?;
    let total = mins.checked_mul(60)?;
    (total > 0).then(|| Duration::from_secs(total))
}

/// Resolve either a preset label or custom `MM:SS` / minutes input.
///
/// # Errors
/// Returns `InvalidInput` when the text is neither.
pub fn resolve_duration(input: &str) -> Result<Duration> {
    TimerPreset::from_label(input)
        .map(|p| p.duration())
        .or_else(|| parse_time_input(input))
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "'{input}' is not a preset (30s, 1m, 5m, 10m), MM:SS or a number of minutes"
            ))
        })
}

/// What a tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock is not running; nothing changed.
    Idle,
    /// Value moved by the elapsed delta.
    Advanced,
    /// Countdown just reached zero. Reported once per run.
    Expired,
}

/// Dual-mode timer state machine.
#[derive(Debug, Clone)]
pub struct TimerClock {
    mode: TimerMode,
    /// Remaining time (countdown) or elapsed time (stopwatch).
    value: Duration,
    initial: Duration,
    running: bool,
    paused: bool,
    last_tick: Option<Instant>,
    expired_fired: bool,
}

impl TimerClock {
    /// A countdown with no duration set. It cannot start until one is.
    #[must_use]
    pub const fn countdown() -> Self {
        Self::new(TimerMode::Countdown)
    }

    /// A stopwatch at zero.
    #[must_use]
    pub const fn stopwatch() -> Self {
        Self::new(TimerMode::Stopwatch)
    }

    /// A countdown preloaded with `duration`.
    #[cfg(test)]
    #[must_use]
    pub const fn countdown_from(duration: Duration) -> Self {
        let mut clock = Self::countdown();
        clock.value = duration;
        clock.initial = duration;
        clock
    }

    const fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            value: Duration::ZERO,
            initial: Duration::ZERO,
            running: false,
            paused: false,
            last_tick: None,
            expired_fired: false,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TimerMode {
        self.mode
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// True between a pause and the next start or reset.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Countdown target. Always zero for a stopwatch.
    #[must_use]
    pub const fn initial(&self) -> Duration {
        self.initial
    }

    /// Current stored value: remaining for a countdown, elapsed for a stopwatch.
    #[must_use]
    pub const fn value(&self) -> Duration {
        self.value
    }

    /// Whether this run of the countdown has already reported expiry.
    #[must_use]
    pub const fn has_expired(&self) -> bool {
        self.expired_fired
    }

    /// Set the countdown target (preset or custom input).
    ///
    /// # Errors
    /// `InvalidState` while running or for a stopwatch; the value is left alone.
    pub fn set_duration(&mut self, duration: Duration) -> Result<()> {
        if self.mode != TimerMode::Countdown {
            return Err(AppError::invalid_state("a stopwatch has no duration"));
        }
        if self.running {
            return Err(AppError::invalid_state(
                "pause or reset the countdown before changing its duration",
            ));
        }

        self.initial = duration;
        self.value = duration;
        self.paused = false;
        self.expired_fired = false;
        self.last_tick = None;
        tracing::debug!(duration_ms = duration.as_millis(), "Countdown duration set");
        Ok(())
    }

    /// Start or resume from the current value.
    ///
    /// Returns `false` if the clock did not start: already running, or a
    /// countdown with no duration set.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }

        if self.mode == TimerMode::Countdown {
            if self.initial.is_zero() && self.value.is_zero() {
                return false;
            }
            if self.value.is_zero() {
                self.value = self.initial;
            }
        }

        self.running = true;
        self.paused = false;
        self.expired_fired = false;
        self.last_tick = Some(now);
        true
    }

    /// Apply the real time elapsed since the last reference instant.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        match self.mode {
            TimerMode::Stopwatch => {
                self.value = self.value.saturating_add(delta);
                TickOutcome::Advanced
            }
            TimerMode::Countdown => {
                self.value = self.value.saturating_sub(delta);
                if !self.value.is_zero() {
                    return TickOutcome::Advanced;
                }

                self.running = false;
                self.last_tick = None;
                if self.expired_fired {
                    TickOutcome::Advanced
                } else {
                    self.expired_fired = true;
                    TickOutcome::Expired
                }
            }
        }
    }

    /// Fold in the time since the last tick, then stop advancing.
    ///
    /// The returned outcome is `Expired` if that final delta finished the countdown.
    pub fn pause(&mut self, now: Instant) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        let outcome = self.tick(now);
        if self.running {
            self.running = false;
            self.paused = true;
            self.last_tick = None;
        }
        outcome
    }

    /// Back to the initial value (countdown) or zero (stopwatch).
    pub fn reset(&mut self) {
        self.value = match self.mode {
            TimerMode::Countdown => self.initial,
            TimerMode::Stopwatch => Duration::ZERO,
        };
        self.running = false;
        self.paused = false;
        self.expired_fired = false;
        self.last_tick = None;
    }

    /// Fraction of the countdown still remaining, 1.0 when no target is set.
    /// For a stopwatch, progress through the current minute.
    #[must_use]
    pub fn progress(&self) -> f64 {
        match self.mode {
            TimerMode::Countdown => {
                if self.initial.is_zero() {
                    1.0
                } else {
                    self.value.as_secs_f64() / self.initial.as_secs_f64()
                }
            }
            TimerMode::Stopwatch => (self.value.as_secs_f64() % 60.0) / 60.0,
        }
    }

    /// Countdown with five seconds or less left (but not finished).
    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.mode == TimerMode::Countdown
            && !self.value.is_zero()
            && self.value <= LOW_TIME_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn ms(m: u64) -> Duration {
        Duration::from_millis(m)
    }

    #[test]
    fn test_set_duration_reads_back_immediately() {
        for d in [0, 1, 30, 60, 599, 3600] {
            let mut clock = TimerClock::countdown();
            clock.set_duration(secs(d)).unwrap();
            assert_eq!(clock.value(), secs(d));
            assert_eq!(clock.initial(), secs(d));
        }
    }

    #[test]
    fn test_countdown_ticks_subtract_real_elapsed_time() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(10));
        assert!(clock.start(t0));

        // Irregular tick spacing, 3.337s total.
        let mut now = t0;
        for step in [50, 49, 120, 1, 2000, 17, 1100] {
            now += ms(step);
            assert_eq!(clock.tick(now), TickOutcome::Advanced);
        }

        assert_eq!(clock.value(), secs(10) - ms(3337));
    }

    #[test]
    fn test_one_minute_preset_expires_once() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown();
        clock
            .set_duration(TimerPreset::from_label("1m").unwrap().duration())
            .unwrap();
        clock.start(t0);

        let mut expired = 0;
        for i in 1..=1300u64 {
            if clock.tick(t0 + ms(i * 50)) == TickOutcome::Expired {
                expired += 1;
            }
        }

        assert_eq!(clock.value(), Duration::ZERO);
        assert_eq!(expired, 1);
        assert!(!clock.is_running());
        assert!(clock.has_expired());
    }

    #[test]
    fn test_countdown_overshoot_clamps_to_zero() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(ms(100));
        clock.start(t0);

        assert_eq!(clock.tick(t0 + secs(5)), TickOutcome::Expired);
        assert_eq!(clock.value(), Duration::ZERO);
        assert_eq!(clock.tick(t0 + secs(6)), TickOutcome::Idle);
    }

    #[test]
    fn test_start_after_expiry_restarts_from_initial() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(1));
        clock.start(t0);
        assert_eq!(clock.tick(t0 + secs(2)), TickOutcome::Expired);

        assert!(clock.start(t0 + secs(3)));
        assert_eq!(clock.value(), secs(1));
        assert!(!clock.has_expired());
        assert_eq!(clock.tick(t0 + secs(4)), TickOutcome::Expired);
    }

    #[test]
    fn test_countdown_without_duration_does_not_start() {
        let mut clock = TimerClock::countdown();
        assert!(!clock.start(Instant::now()));
        assert!(!clock.is_running());
    }

    #[test]
    fn test_set_duration_rejected_while_running() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(30));
        clock.start(t0);
        clock.tick(t0 + secs(1));

        assert!(clock.set_duration(secs(600)).is_err());
        assert_eq!(clock.initial(), secs(30));
        assert_eq!(clock.value(), secs(29));
    }

    #[test]
    fn test_pause_folds_pending_time_and_freezes() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(30));
        clock.start(t0);
        clock.tick(t0 + ms(50));
        clock.pause(t0 + ms(80));

        assert!(clock.is_paused());
        assert_eq!(clock.value(), secs(30) - ms(80));

        // Time passing while paused is not charged.
        assert_eq!(clock.tick(t0 + secs(20)), TickOutcome::Idle);
        clock.start(t0 + secs(20));
        clock.tick(t0 + secs(21));
        assert_eq!(clock.value(), secs(29) - ms(80));
    }

    #[test]
    fn test_reset_returns_to_last_set_duration() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(300));
        clock.start(t0);
        clock.tick(t0 + secs(42));
        clock.reset();

        assert_eq!(clock.value(), secs(300));
        assert!(!clock.is_running());
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_stopwatch_monotonic_frozen_and_reset() {
        let t0 = Instant::now();
        let mut clock = TimerClock::stopwatch();
        clock.start(t0);

        let mut last = Duration::ZERO;
        for i in 1..=40u64 {
            clock.tick(t0 + ms(i * 37));
            assert!(clock.value() >= last);
            last = clock.value();
        }
        assert_eq!(last, ms(40 * 37));

        clock.pause(t0 + ms(2000));
        let frozen = clock.value();
        assert_eq!(frozen, secs(2));
        clock.tick(t0 + secs(60));
        assert_eq!(clock.value(), frozen);

        clock.reset();
        assert_eq!(clock.value(), Duration::ZERO);
    }

    #[test]
    fn test_stopwatch_rejects_duration() {
        let mut clock = TimerClock::stopwatch();
        assert!(clock.set_duration(secs(10)).is_err());
    }

    #[test]
    fn test_parse_time_input() {
        assert_eq!(parse_time_input("1:30"), Some(secs(90)));
        assert_eq!(parse_time_input("0:45"), Some(secs(45)));
        assert_eq!(parse_time_input("3"), Some(secs(180)));
        assert_eq!(parse_time_input(" 12:05 "), Some(secs(725)));
        assert_eq!(parse_time_input("1:60"), None);
        assert_eq!(parse_time_input("0:00"), None);
        assert_eq!(parse_time_input("0"), None);
        assert_eq!(parse_time_input("-2"), None);
        assert_eq!(parse_time_input("abc"), None);
        assert_eq!(parse_time_input("1:xx"), None);
    }

    #[test]
    fn test_resolve_duration_prefers_presets() {
        assert_eq!(resolve_duration("10m").unwrap(), secs(600));
        assert_eq!(resolve_duration("30S").unwrap(), secs(30));
        assert_eq!(resolve_duration("2:00").unwrap(), secs(120));
        assert!(resolve_duration("soon").is_err());
    }

    #[test]
    fn test_progress_and_low_time() {
        let t0 = Instant::now();
        let mut clock = TimerClock::countdown_from(secs(10));
        assert!((clock.progress() - 1.0).abs() < f64::EPSILON);
        clock.start(t0);
        clock.tick(t0 + secs(5));
        assert!((clock.progress() - 0.5).abs() < 1e-9);
        assert!(clock.is_low_time());

        assert!((TimerClock::countdown().progress() - 1.0).abs() < f64::EPSILON);
    }
}
