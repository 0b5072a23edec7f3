//! Background music player.
//!
//! Wraps one [`AudioBackend`] with the runtime playback state: selected
//! track, play/pause, stop, seek, loop and volume. `poll` is called on the
//! progress cadence while playing to refresh progress and handle track end.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::preferences::clamp_volume;
use crate::domain::{AppError, AudioBackend, MusicPlayback, Result};
use crate::infrastructure::SoundLibrary;

/// Result of a progress poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicEvent {
    /// Nothing happened worth reporting.
    None,
    /// Track ended and started over.
    Restarted,
    /// Track ended and playback stopped.
    Ended,
}

pub struct MusicPlayer<B: AudioBackend> {
    backend: B,
    state: MusicPlayback,
    track_path: Option<PathBuf>,
    volume: f32,
}

impl<B: AudioBackend> MusicPlayer<B> {
    pub fn new(backend: B, volume: f32, looping: bool) -> Self {
        Self {
            backend,
            state: MusicPlayback {
                looping,
                ..MusicPlayback::default()
            },
            track_path: None,
            volume: clamp_volume(volume),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &MusicPlayback {
        &self.state
    }

    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Select a background track by file name, display name or number.
    /// Any current playback stops and progress returns to zero.
    ///
    /// # Errors
    /// `InvalidInput` if the library has no such track.
    pub fn select(&mut self, library: &SoundLibrary, name: &str) -> Result<String> {
        let (file, path) = library.track_path(name).ok_or_else(|| {
            AppError::invalid_input(format!("no background track matches '{name}'"))
        })?;

        self.backend.stop();
        self.state.select_track(file.clone());
        self.track_path = Some(path);
        tracing::info!(track = %file, "Track selected");
        Ok(file)
    }

    /// Start or resume the selected track.
    ///
    /// # Errors
    /// `InvalidState` with no track selected; `Playback` if the runtime refuses,
    /// in which case the player reports "not playing".
    pub fn play(&mut self) -> Result<()> {
        let path = self
            .track_path
            .clone()
            .ok_or_else(|| AppError::invalid_state("select a track first"))?;

        if let Err(e) = self.backend.play(&path, self.volume) {
            self.state.is_playing = false;
            tracing::warn!("Music playback rejected: {}", e);
            return Err(e);
        }

        self.state.is_playing = true;
        self.state.duration = self
            .backend
            .duration()
            .map_or(0.0, |d| d.as_secs_f64());
        Ok(())
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.state.is_playing = false;
        self.refresh_progress();
    }

    /// Play if paused, pause if playing.
    ///
    /// # Errors
    /// See [`MusicPlayer::play`].
    pub fn toggle(&mut self) -> Result<()> {
        if self.state.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self) {
        self.backend.stop();
        self.state.is_playing = false;
        self.state.set_progress(0.0);
    }

    /// Seek to a fraction of the track. Ignored while the duration is unknown.
    ///
    /// # Errors
    /// `Playback` if the backend fails to restart at the new position.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        self.state.set_progress(fraction);
        let Some(duration) = self.backend.duration() else {
            return Ok(());
        };

        let target = duration.mul_f64(self.state.progress);
        if let Err(e) = self.backend.seek(target) {
            self.state.is_playing = false;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.state.looping = looping;
    }

    /// Change volume, applied immediately.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        self.backend.set_volume(self.volume);
    }

    /// Refresh progress and handle the end of the track.
    pub fn poll(&mut self) -> MusicEvent {
        if !self.state.is_playing {
            return MusicEvent::None;
        }

        if !self.backend.is_finished() {
            self.refresh_progress();
            return MusicEvent::None;
        }

        if self.backend.has_failed() {
            tracing::warn!(track = %self.state.current_track, "Playback failed, not restarting");
        } else if self.state.looping {
            let restarted = self
                .backend
                .seek(Duration::ZERO)
                .and_then(|()| self.play());
            match restarted {
                Ok(()) => {
                    self.state.set_progress(0.0);
                    tracing::debug!(track = %self.state.current_track, "Track looped");
                    return MusicEvent::Restarted;
                }
                Err(e) => tracing::warn!("Could not loop track: {}", e),
            }
        }

        self.backend.stop();
        self.state.is_playing = false;
        self.state.set_progress(0.0);
        MusicEvent::Ended
    }

    fn refresh_progress(&mut self) {
        if let Some(duration) = self.backend.duration().filter(|d| !d.is_zero()) {
            self.state.duration = duration.as_secs_f64();
            self.state
                .set_progress(self.backend.position().as_secs_f64() / duration.as_secs_f64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_audio::FakeAudio;

    fn library() -> SoundLibrary {
        SoundLibrary {
            background_dir: PathBuf::from("/bg"),
            background: vec!["Forest.mp3".into(), "Tavern.mp3".into()],
            ..Default::default()
        }
    }

    fn player(looping: bool) -> MusicPlayer<FakeAudio> {
        MusicPlayer::new(FakeAudio::new(FakeAudio::log()), 0.5, looping)
    }

    #[test]
    fn test_play_requires_track() {
        let mut player = player(true);
        assert!(matches!(
            player.play(),
            Err(AppError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_select_play_and_progress() {
        let mut player = player(true);
        assert_eq!(player.select(&library(), "tavern").unwrap(), "Tavern.mp3");
        player.play().unwrap();

        assert!(player.state().is_playing);
        assert!((player.state().duration - 100.0).abs() < f64::EPSILON);

        player.backend.position = Duration::from_secs(25);
        assert_eq!(player.poll(), MusicEvent::None);
        assert!((player.state().progress - 0.25).abs() < 1e-9);
        assert!((player.state().current_time() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejected_playback_is_not_playing() {
        let mut player = player(true);
        player.select(&library(), "1").unwrap();
        player.backend.reject_play = true;

        assert!(player.play().is_err());
        assert!(!player.state().is_playing);
        assert_eq!(player.poll(), MusicEvent::None);
    }

    #[test]
    fn test_toggle_and_stop() {
        let mut player = player(true);
        player.select(&library(), "Forest.mp3").unwrap();
        player.toggle().unwrap();
        assert!(player.state().is_playing);
        player.toggle().unwrap();
        assert!(!player.state().is_playing);

        player.play().unwrap();
        player.backend.position = Duration::from_secs(40);
        player.stop();
        assert!(!player.state().is_playing);
        assert!(player.state().progress.abs() < f64::EPSILON);
        assert_eq!(player.backend.position, Duration::ZERO);
    }

    #[test]
    fn test_seek_fraction() {
        let mut player = player(true);
        player.select(&library(), "Forest").unwrap();
        player.play().unwrap();
        player.seek(0.75).unwrap();
        assert_eq!(player.backend.position, Duration::from_secs(75));

        player.seek(3.0).unwrap();
        assert_eq!(player.backend.position, Duration::from_secs(100));
    }

    #[test]
    fn test_end_of_track_loops() {
        let mut player = player(true);
        player.select(&library(), "Forest").unwrap();
        player.play().unwrap();
        player.backend.finish();

        assert_eq!(player.poll(), MusicEvent::Restarted);
        assert!(player.state().is_playing);
        assert!(player.backend.playing);
        assert_eq!(player.backend.position, Duration::ZERO);
    }

    #[test]
    fn test_end_of_track_without_loop_stops() {
        let mut player = player(false);
        player.select(&library(), "Forest").unwrap();
        player.play().unwrap();
        player.backend.finish();

        assert_eq!(player.poll(), MusicEvent::Ended);
        assert!(!player.state().is_playing);
        assert!(player.state().progress.abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_playback_is_not_restarted() {
        let log = FakeAudio::log();
        let mut player = MusicPlayer::new(FakeAudio::new(log.clone()), 0.5, true);
        player.select(&library(), "Forest").unwrap();
        player.play().unwrap();
        player.backend.fail();

        assert_eq!(player.poll(), MusicEvent::Ended);
        assert!(!player.state().is_playing);
        assert!(!player.backend.playing);
        assert_eq!(player.poll(), MusicEvent::None);

        let plays = log.borrow().iter().filter(|l| l.starts_with("play ")).count();
        assert_eq!(plays, 1);
    }

    #[test]
    fn test_volume_clamped_and_applied() {
        let mut player = player(true);
        player.set_volume(1.5);
        assert!((player.volume() - 1.0).abs() < f32::EPSILON);
        assert!((player.backend.volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_select_unknown_track() {
        let mut player = player(true);
        assert!(player.select(&library(), "Dungeon").is_err());
        assert!(!player.state().has_track());
    }
}
