//! Soundboard: ten configurable effect buttons.

use crate::domain::{
    AppError, AudioBackend, ButtonUpdate, Preferences, Result, SoundEffectButton,
    SOUND_BUTTON_COUNT,
};
use crate::infrastructure::SoundLibrary;

use super::effects::EffectPlayer;

/// What pressing a button did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// The assigned sound started playing.
    Played { name: String, file: String },
    /// Button has no sound; nothing happened.
    Unassigned { name: String },
    /// Assigned file is no longer in the library.
    Missing { name: String, file: String },
}

/// Button id for a 1-based button number.
///
/// # Errors
/// `InvalidInput` outside `1..=10`.
pub fn button_id(number: usize) -> Result<String> {
    if (1..=SOUND_BUTTON_COUNT).contains(&number) {
        Ok(format!("effect-{number}"))
    } else {
        Err(AppError::invalid_input(format!(
            "button {number} does not exist (1-{SOUND_BUTTON_COUNT})"
        )))
    }
}

/// Look up a button by its 1-based number.
///
/// # Errors
/// `InvalidInput` if the number is out of range.
pub fn button(prefs: &Preferences, number: usize) -> Result<&SoundEffectButton> {
    let id = button_id(number)?;
    prefs
        .sound_effect_buttons
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::invalid_input(format!("button {number} is not configured")))
}

/// Assign a library effect to a button. `none` or an empty name clears it.
///
/// # Errors
/// `InvalidInput` for an unknown button or a file that is not in the library.
pub fn assign(
    prefs: &mut Preferences,
    library: &SoundLibrary,
    number: usize,
    sound: &str,
) -> Result<()> {
    let id = button_id(number)?;
    let sound = sound.trim();

    let sound_file = if sound.is_empty() || sound.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        library
            .find_effect(sound)
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "'{sound}' is not in the effects library ({})",
                    library.effects_dir.display()
                ))
            })?
            .to_string()
    };

    prefs.update_button(
        &id,
        ButtonUpdate {
            sound_file: Some(sound_file.clone()),
            ..Default::default()
        },
    );
    tracing::info!(button = %id, file = %sound_file, "Sound button assigned");
    Ok(())
}

/// Rename a button.
///
/// # Errors
/// `InvalidInput` for an unknown button or a blank name.
pub fn rename(prefs: &mut Preferences, number: usize, name: &str) -> Result<()> {
    let id = button_id(number)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("button name cannot be empty"));
    }

    prefs.update_button(
        &id,
        ButtonUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        },
    );
    tracing::info!(button = %id, name, "Sound button renamed");
    Ok(())
}

/// Plays effects for buttons and for the panel's own cues.
pub struct SoundBoard<B: AudioBackend> {
    effects: EffectPlayer<B>,
}

impl<B: AudioBackend> SoundBoard<B> {
    #[must_use]
    pub const fn new(effects: EffectPlayer<B>) -> Self {
        Self { effects }
    }

    /// Press button `number` at the effects volume.
    ///
    /// # Errors
    /// `InvalidInput` for an unknown button, `Playback` if the sound cannot start.
    pub fn press(
        &mut self,
        prefs: &Preferences,
        library: &SoundLibrary,
        number: usize,
    ) -> Result<PressOutcome> {
        let button = button(prefs, number)?;
        if !button.has_sound() {
            return Ok(PressOutcome::Unassigned {
                name: button.name.clone(),
            });
        }

        let Some(path) = library.effect_path(&button.sound_file) else {
            tracing::warn!(file = %button.sound_file, "Assigned sound missing from library");
            return Ok(PressOutcome::Missing {
                name: button.name.clone(),
                file: button.sound_file.clone(),
            });
        };

        self.effects.play(&path, prefs.effects_volume)?;
        Ok(PressOutcome::Played {
            name: button.name.clone(),
            file: button.sound_file.clone(),
        })
    }

    /// Play a named library effect (alert, dice roll) at full volume.
    ///
    /// Returns `false` when the file is not in the library.
    ///
    /// # Errors
    /// `Playback` if the sound cannot start.
    pub fn cue(&mut self, library: &SoundLibrary, file: &str) -> Result<bool> {
        let Some(path) = library.effect_path(file) else {
            tracing::debug!(file, "Cue sound not in library");
            return Ok(false);
        };
        self.effects.play(&path, 1.0)?;
        Ok(true)
    }

    /// Release voices that have finished.
    pub fn reap(&mut self) {
        self.effects.reap();
    }

    pub fn stop_all(&mut self) {
        self.effects.stop_all();
    }

    #[must_use]
    pub fn active_voices(&self) -> usize {
        self.effects.active_voices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_audio::{CallLog, FakeAudio};
    use std::path::PathBuf;

    fn library() -> SoundLibrary {
        SoundLibrary {
            effects_dir: PathBuf::from("/fx"),
            effects: vec!["Gong.mp3".into(), "Roll Dice.mp3".into()],
            ..Default::default()
        }
    }

    fn board(log: &CallLog) -> SoundBoard<FakeAudio> {
        let log = log.clone();
        SoundBoard::new(EffectPlayer::new(move || FakeAudio::new(log.clone())))
    }

    #[test]
    fn test_button_id_range() {
        assert_eq!(button_id(1).unwrap(), "effect-1");
        assert_eq!(button_id(10).unwrap(), "effect-10");
        assert!(button_id(0).is_err());
        assert!(button_id(11).is_err());
    }

    #[test]
    fn test_press_plays_at_effects_volume() {
        let log = FakeAudio::log();
        let mut board = board(&log);
        let library = library();
        let mut prefs = Preferences::default();
        prefs.set_effects_volume(0.4);
        assign(&mut prefs, &library, 2, "gong").unwrap();

        let outcome = board.press(&prefs, &library, 2).unwrap();
        assert_eq!(
            outcome,
            PressOutcome::Played {
                name: "Effect 2".into(),
                file: "Gong.mp3".into()
            }
        );
        assert_eq!(*log.borrow(), vec!["play /fx/Gong.mp3 @0.40".to_string()]);
    }

    #[test]
    fn test_unassigned_button_does_nothing() {
        let log = FakeAudio::log();
        let mut board = board(&log);
        let outcome = board
            .press(&Preferences::default(), &library(), 5)
            .unwrap();
        assert!(matches!(outcome, PressOutcome::Unassigned { .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_missing_file_reported() {
        let log = FakeAudio::log();
        let mut board = board(&log);
        let mut prefs = Preferences::default();
        prefs.sound_effect_buttons[0].sound_file = "Deleted.mp3".into();

        let outcome = board.press(&prefs, &library(), 1).unwrap();
        assert!(matches!(outcome, PressOutcome::Missing { .. }));
    }

    #[test]
    fn test_assign_validates_library_and_clears() {
        let library = library();
        let mut prefs = Preferences::default();
        assert!(assign(&mut prefs, &library, 3, "Kazoo.mp3").is_err());
        assign(&mut prefs, &library, 3, "Roll Dice.mp3").unwrap();
        assert_eq!(prefs.sound_effect_buttons[2].sound_file, "Roll Dice.mp3");
        assign(&mut prefs, &library, 3, "none").unwrap();
        assert!(!prefs.sound_effect_buttons[2].has_sound());
    }

    #[test]
    fn test_rename() {
        let mut prefs = Preferences::default();
        rename(&mut prefs, 4, "  Applause ").unwrap();
        assert_eq!(prefs.sound_effect_buttons[3].name, "Applause");
        assert!(rename(&mut prefs, 4, "   ").is_err());
    }

    #[test]
    fn test_cue_skips_missing_sound() {
        let log = FakeAudio::log();
        let mut board = board(&log);
        assert!(board.cue(&library(), "Roll Dice.mp3").unwrap());
        assert!(!board.cue(&library(), "Alien Same Zone.mp3").unwrap());
        assert_eq!(board.active_voices(), 1);
    }
}
