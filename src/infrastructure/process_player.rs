//! Audio backend that delegates playback to an external player process.
//!
//! The player command is started with the requested start offset and volume.
//! Pausing and seeking kill the process and remember the position; resuming
//! starts a new one from there. Position is tracked from wall-clock time
//! since the current process was started.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::domain::preferences::clamp_volume;
use crate::domain::{AppError, AudioBackend, AudioConfig, Result};

/// Playback through a spawned command such as `ffplay`.
pub struct ProcessPlayer {
    command: Vec<String>,
    probe: Vec<String>,
    source: Option<PathBuf>,
    child: Option<Child>,
    volume: f32,
    /// Position at which the current process started (or the paused position).
    offset: Duration,
    started_at: Option<Instant>,
    duration: Option<Duration>,
    /// Last process exited with a non-zero status.
    failed: bool,
}

impl ProcessPlayer {
    /// Create a player from the `[audio]` configuration.
    #[must_use]
    pub fn new(config: &AudioConfig) -> Self {
        Self::with_commands(config.player_command.clone(), config.probe_command.clone())
    }

    #[must_use]
    pub const fn with_commands(command: Vec<String>, probe: Vec<String>) -> Self {
        Self {
            command,
            probe,
            source: None,
            child: None,
            volume: 1.0,
            offset: Duration::ZERO,
            started_at: None,
            duration: None,
            failed: false,
        }
    }

    fn spawn(&mut self) -> Result<()> {
        let Some(source) = self.source.clone() else {
            return Err(AppError::playback("no source selected", None));
        };
        let args = render_args(&self.command, &source, self.volume, self.offset);
        let Some((program, rest)) = args.split_first() else {
            return Err(AppError::Config {
                message: "audio.player_command is empty".into(),
            });
        };

        let child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AppError::playback(format!("Failed to start '{program}'"), Some(e))
            })?;

        tracing::debug!(
            file = %source.display(),
            start_ms = self.offset.as_millis(),
            "Player process started"
        );
        self.child = Some(child);
        self.started_at = Some(Instant::now());
        self.failed = false;
        Ok(())
    }

    fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("Player process already gone: {}", e);
            }
            let _ = child.wait();
        }
        self.started_at = None;
    }

    fn probe_duration(&self, source: &Path) -> Option<Duration> {
        let args = render_args(&self.probe, source, self.volume, Duration::ZERO);
        let (program, rest) = args.split_first()?;

        let output = match Command::new(program).args(rest).stdin(Stdio::null()).output() {
            Ok(output) if output.status.success() => output,
            Ok(_) | Err(_) => {
                tracing::debug!(file = %source.display(), "Duration probe failed");
                return None;
            }
        };

        let text = String::from_utf8_lossy(&output.stdout);
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }

    fn clamp_to_duration(&self, position: Duration) -> Duration {
        self.duration.map_or(position, |d| position.min(d))
    }
}

impl AudioBackend for ProcessPlayer {
    fn play(&mut self, source: &Path, volume: f32) -> Result<()> {
        self.volume = clamp_volume(volume);

        if self.source.as_deref() != Some(source) {
            self.kill();
            self.source = Some(source.to_path_buf());
            self.offset = Duration::ZERO;
            self.duration = self.probe_duration(source);
        } else if self.child.is_some() {
            return Ok(());
        }

        self.spawn()
    }

    fn pause(&mut self) {
        if self.child.is_some() {
            self.offset = self.position();
            self.kill();
        }
    }

    fn stop(&mut self) {
        self.kill();
        self.offset = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let was_playing = self.child.is_some();
        self.kill();
        self.offset = self.clamp_to_duration(position);
        if was_playing {
            self.spawn()?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        if (volume - self.volume).abs() < f32::EPSILON {
            return;
        }
        self.volume = volume;

        // Command-line players only take volume at startup.
        if self.child.is_some() {
            self.offset = self.position();
            self.kill();
            if let Err(e) = self.spawn() {
                tracing::warn!("Could not restart player with new volume: {}", e);
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.child.is_some()
    }

    fn is_finished(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(Some(status)) if status.success() => {
                tracing::debug!(?status, "Player process exited");
                self.offset = self.duration.unwrap_or_else(|| self.position());
                self.child = None;
                self.started_at = None;
                true
            }
            Ok(Some(status)) => {
                tracing::warn!(?status, "Player process failed");
                self.offset = self.position();
                self.failed = true;
                self.child = None;
                self.started_at = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Could not poll player process: {}", e);
                false
            }
        }
    }

    fn has_failed(&self) -> bool {
        self.failed
    }

    fn position(&self) -> Duration {
        let running = self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        self.clamp_to_duration(self.offset.saturating_add(running))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Substitute `{file}`, `{volume}` and `{start}` in each argument.
fn render_args(template: &[String], source: &Path, volume: f32, start: Duration) -> Vec<String> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let volume_pct = (clamp_volume(volume) * 100.0).round() as u32;
    let file = source.to_string_lossy();
    let start = format!("{:.3}", start.as_secs_f64());

    template
        .iter()
        .map(|arg| {
            arg.replace("{file}", &file)
                .replace("{volume}", &volume_pct.to_string())
                .replace("{start}", &start)
        })
        .collect()
}
