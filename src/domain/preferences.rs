//! Persisted user preferences.
//!
//! Plain records: volumes, soundboard button assignments, recent dice rolls and
//! the music loop flag. Timer and playback state are never persisted.

use serde::{Deserialize, Serialize};

use super::dice::DiceRoll;

/// Number of soundboard buttons.
pub const SOUND_BUTTON_COUNT: usize = 10;

pub const DEFAULT_MUSIC_VOLUME: f32 = 0.5;
pub const DEFAULT_EFFECTS_VOLUME: f32 = 0.7;

/// Clamp a volume into `[0, 1]`, mapping NaN to silence.
#[must_use]
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// One configurable soundboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundEffectButton {
    pub id: String,
    pub name: String,
    /// File name inside the effects library; empty when unassigned.
    #[serde(default)]
    pub sound_file: String,
}

impl SoundEffectButton {
    /// Default button for 1-based position `number`.
    #[must_use]
    pub fn default_for(number: usize) -> Self {
        Self {
            id: format!("effect-{number}"),
            name: format!("Effect {number}"),
            sound_file: String::new(),
        }
    }

    #[must_use]
    pub fn has_sound(&self) -> bool {
        !self.sound_file.trim().is_empty()
    }
}

/// The ten default buttons, `effect-1` through `effect-10`.
#[must_use]
pub fn default_sound_buttons() -> Vec<SoundEffectButton> {
    (1..=SOUND_BUTTON_COUNT)
        .map(SoundEffectButton::default_for)
        .collect()
}

/// Partial update applied to a button.
#[derive(Debug, Clone, Default)]
pub struct ButtonUpdate {
    pub name: Option<String>,
    pub sound_file: Option<String>,
}

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub music_volume: f32,
    pub effects_volume: f32,
    pub sound_effect_buttons: Vec<SoundEffectButton>,
    pub dice_rolls: Vec<DiceRoll>,
    pub music_loop: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            music_volume: DEFAULT_MUSIC_VOLUME,
            effects_volume: DEFAULT_EFFECTS_VOLUME,
            sound_effect_buttons: default_sound_buttons(),
            dice_rolls: Vec::new(),
            music_loop: true,
        }
    }
}

impl Preferences {
    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = clamp_volume(volume);
    }

    pub fn set_effects_volume(&mut self, volume: f32) {
        self.effects_volume = clamp_volume(volume);
    }

    /// Apply `update` to the button with `id`. Returns false if no such button.
    pub fn update_button(&mut self, id: &str, update: ButtonUpdate) -> bool {
        let Some(button) = self.sound_effect_buttons.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            button.name = name;
        }
        if let Some(file) = update.sound_file {
            button.sound_file = file;
        }
        true
    }

    pub fn reset_buttons(&mut self) {
        self.sound_effect_buttons = default_sound_buttons();
    }

    /// Repair values loaded from storage: clamp volumes and make sure there are
    /// exactly ten buttons, keeping any valid persisted ones in place.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.music_volume = clamp_volume(self.music_volume);
        self.effects_volume = clamp_volume(self.effects_volume);

        let mut buttons = default_sound_buttons();
        for stored in self.sound_effect_buttons.drain(..) {
            if let Some(slot) = buttons.iter_mut().find(|b| b.id == stored.id) {
                *slot = stored;
            }
        }
        self.sound_effect_buttons = buttons;
        self
    }
}
