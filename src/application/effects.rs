//! One-shot sound effects.
//!
//! Every effect gets its own backend ("voice") so effects can overlap. Voices
//! are dropped once they report that they finished.

use std::path::Path;

use crate::domain::{AudioBackend, Result};

/// Pool of overlapping effect voices.
pub struct EffectPlayer<B: AudioBackend> {
    factory: Box<dyn Fn() -> B>,
    voices: Vec<B>,
}

impl<B: AudioBackend> EffectPlayer<B> {
    /// `factory` builds a fresh backend for each effect.
    pub fn new(factory: impl Fn() -> B + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            voices: Vec::new(),
        }
    }

    /// Play `source` once at `volume`.
    ///
    /// # Errors
    /// `Playback` if the backend refuses to start; no voice is kept.
    pub fn play(&mut self, source: &Path, volume: f32) -> Result<()> {
        self.reap();
        let mut voice = (self.factory)();
        voice.play(source, volume)?;
        self.voices.push(voice);
        Ok(())
    }

    /// Drop voices that have finished or were stopped.
    pub fn reap(&mut self) {
        self.voices
            .retain_mut(|voice| !voice.is_finished() && voice.is_playing());
    }

    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
        self.voices.clear();
    }

    #[must_use]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}
