//! Audio playback seam and music playback state.
//!
//! The panel never decodes audio. It talks to an [`AudioBackend`] that can
//! play, pause, stop and seek a file and report where it is.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Playback collaborator for a single audio source.
pub trait AudioBackend {
    /// Start (or resume) playing `source` at `volume` in `[0, 1]`.
    ///
    /// # Errors
    /// `Playback` when the runtime refuses to start; the backend is then not playing.
    fn play(&mut self, source: &Path, volume: f32) -> Result<()>;

    /// Stop advancing, keeping the position.
    fn pause(&mut self);

    /// Stop and rewind to the start.
    fn stop(&mut self);

    /// Jump to `position`. Playback continues if it was playing.
    ///
    /// # Errors
    /// `Playback` when restarting at the new position fails.
    fn seek(&mut self, position: Duration) -> Result<()>;

    fn set_volume(&mut self, volume: f32);

    fn is_playing(&self) -> bool;

    /// True once the source has stopped on its own, at its end or on an error.
    fn is_finished(&mut self) -> bool;

    /// True if the last playback stopped because of an error rather than
    /// reaching the end. Cleared by the next successful `play`.
    fn has_failed(&self) -> bool;

    fn position(&self) -> Duration;

    /// Length of the current source, if known.
    fn duration(&self) -> Option<Duration>;
}

/// Runtime-only state of the background music player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicPlayback {
    pub is_playing: bool,
    pub current_track: String,
    /// Position as a fraction of the duration, `0.0..=1.0`.
    pub progress: f64,
    /// Track length in seconds, 0 when unknown.
    pub duration: f64,
    pub looping: bool,
}

impl Default for MusicPlayback {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_track: String::new(),
            progress: 0.0,
            duration: 0.0,
            looping: true,
        }
    }
}

impl MusicPlayback {
    /// Select a new track; progress restarts from zero.
    pub fn select_track(&mut self, track: impl Into<String>) {
        self.current_track = track.into();
        self.progress = 0.0;
        self.duration = 0.0;
        self.is_playing = false;
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
    }

    /// Position in seconds implied by progress and duration.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        if self.duration > 0.0 {
            self.progress * self.duration
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn has_track(&self) -> bool {
        !self.current_track.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_track_resets_progress() {
        let mut playback = MusicPlayback {
            current_track: "Tavern.mp3".into(),
            progress: 0.6,
            duration: 120.0,
            is_playing: true,
            looping: false,
        };
        playback.select_track("Forest.mp3");

        assert_eq!(playback.current_track, "Forest.mp3");
        assert!(playback.progress.abs() < f64::EPSILON);
        assert!(!playback.is_playing);
        assert!(!playback.looping);
    }

    #[test]
    fn test_progress_clamped_and_time() {
        let mut playback = MusicPlayback {
            duration: 200.0,
            ..Default::default()
        };
        playback.set_progress(0.25);
        assert!((playback.current_time() - 50.0).abs() < 1e-9);
        playback.set_progress(4.0);
        assert!((playback.progress - 1.0).abs() < f64::EPSILON);
        playback.set_progress(f64::NAN);
        assert!(playback.progress.abs() < f64::EPSILON);
    }
}
