//! Sound library discovery.
//!
//! Finds effect and background audio files under the configured sounds
//! directory. A missing directory is an empty library, not an error.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::AppConfig;

/// File extensions treated as playable audio.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac"];

/// Audio file names available to the panel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SoundLibrary {
    pub effects_dir: PathBuf,
    pub background_dir: PathBuf,
    pub effects: Vec<String>,
    pub background: Vec<String>,
}

impl SoundLibrary {
    /// Scan the configured effects and background directories.
    #[must_use]
    pub fn discover(config: &AppConfig) -> Self {
        let effects_dir = config.effects_dir();
        let background_dir = config.background_dir();
        let effects = list_audio_files(&effects_dir);
        let background = list_audio_files(&background_dir);

        tracing::debug!(
            effects = effects.len(),
            background = background.len(),
            "Sound library scanned"
        );

        Self {
            effects_dir,
            background_dir,
            effects,
            background,
        }
    }

    /// Full path of an effect file, if it is in the library.
    #[must_use]
    pub fn effect_path(&self, file: &str) -> Option<PathBuf> {
        self.effects
            .iter()
            .any(|f| f == file)
            .then(|| self.effects_dir.join(file))
    }

    /// Full path of a background track, matched by file name or display name.
    #[must_use]
    pub fn track_path(&self, name: &str) -> Option<(String, PathBuf)> {
        self.find_track(name)
            .map(|file| (file.to_string(), self.background_dir.join(file)))
    }

    /// Resolve a track by exact file name, display name, or 1-based number.
    #[must_use]
    pub fn find_track(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Ok(number) = name.parse::<usize>() {
            if let Some(file) = number.checked_sub(1).and_then(|i| self.background.get(i)) {
                return Some(file.as_str());
            }
        }

        self.background
            .iter()
            .find(|f| f.as_str() == name || display_name(f).eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Resolve an effect by exact file name or display name.
    #[must_use]
    pub fn find_effect(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.effects
            .iter()
            .find(|f| f.as_str() == name || display_name(f).eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

/// File name without its audio extension.
#[must_use]
pub fn display_name(file: &str) -> &str {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .map_or(file, |ext| &file[..file.len() - ext.len() - 1])
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Sorted audio file names directly inside `dir`.
fn list_audio_files(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Sound directory {} unavailable: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_audio_file(path))
        .filter_map(|path| path.file_name()?.to_str().map(String::from))
        .collect();

    files.sort_by_key(|f| f.to_lowercase());
    files
}
