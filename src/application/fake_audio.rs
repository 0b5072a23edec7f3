//! In-memory audio backend for tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::domain::{AppError, AudioBackend, Result};

/// Shared call log, visible to every backend created from the same factory.
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Backend that records calls and lets tests drive position and completion.
#[derive(Debug)]
pub struct FakeAudio {
    pub log: CallLog,
    pub reject_play: bool,
    pub source: Option<PathBuf>,
    pub volume: f32,
    pub playing: bool,
    pub finished: bool,
    pub failed: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
}

impl FakeAudio {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            reject_play: false,
            source: None,
            volume: 0.0,
            playing: false,
            finished: false,
            failed: false,
            position: Duration::ZERO,
            duration: Some(Duration::from_secs(100)),
        }
    }

    pub fn log() -> CallLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Simulate the source playing to its end.
    pub fn finish(&mut self) {
        self.finished = true;
        self.playing = false;
        self.position = self.duration.unwrap_or_default();
    }

    /// Simulate the source stopping on a playback error.
    pub fn fail(&mut self) {
        self.finished = true;
        self.failed = true;
        self.playing = false;
    }
}

impl AudioBackend for FakeAudio {
    fn play(&mut self, source: &Path, volume: f32) -> Result<()> {
        if self.reject_play {
            self.log.borrow_mut().push(format!("rejected {}", source.display()));
            return Err(AppError::playback("autoplay blocked", None));
        }
        if self.source.as_deref() != Some(source) {
            self.position = Duration::ZERO;
        }
        self.log
            .borrow_mut()
            .push(format!("play {} @{volume:.2}", source.display()));
        self.source = Some(source.to_path_buf());
        self.volume = volume;
        self.playing = true;
        self.finished = false;
        self.failed = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.log.borrow_mut().push("pause".into());
        self.playing = false;
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push("stop".into());
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("seek {}", position.as_secs_f64()));
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.borrow_mut().push(format!("volume {volume:.2}"));
        self.volume = volume;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    fn has_failed(&self) -> bool {
        self.failed
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
