//! Local SQLite key-value store for preferences.
//!
//! Each preference lives under its own key as a JSON value. Missing keys and
//! values that no longer parse fall back to the built-in defaults, so a
//! damaged store never stops the panel from starting.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{AppError, Preferences, Result};

pub const KEY_MUSIC_VOLUME: &str = "musicVolume";
pub const KEY_EFFECTS_VOLUME: &str = "effectsVolume";
pub const KEY_SOUND_BUTTONS: &str = "soundEffectButtons";
pub const KEY_DICE_ROLLS: &str = "diceRolls";
pub const KEY_MUSIC_LOOP: &str = "musicLoop";

/// Preference repository using SQLite.
pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    /// Opens or creates the preference database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store that is discarded on drop.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
            )
            .map_err(AppError::database)
    }

    /// Raw JSON text stored under `key`.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(AppError::database)
    }

    /// Store raw JSON text under `key`.
    #[cfg(test)]
    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        upsert(&self.conn, key, value)
    }

    /// Typed read; `None` when the key is absent or its value does not parse.
    ///
    /// # Errors
    /// Returns error only if the query itself fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring corrupted preference, using default");
                Ok(None)
            }
        }
    }

    /// Typed write.
    #[cfg(test)]
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_raw(key, &to_json(value)?)
    }

    /// Remove a key.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])
            .map_err(AppError::database)?;
        Ok(())
    }

    /// Load all preferences, filling absent or corrupted keys with defaults.
    ///
    /// # Errors
    /// Returns error only on database failure.
    pub fn load(&self) -> Result<Preferences> {
        let defaults = Preferences::default();

        let prefs = Preferences {
            music_volume: self
                .get(KEY_MUSIC_VOLUME)?
                .unwrap_or(defaults.music_volume),
            effects_volume: self
                .get(KEY_EFFECTS_VOLUME)?
                .unwrap_or(defaults.effects_volume),
            sound_effect_buttons: self
                .get(KEY_SOUND_BUTTONS)?
                .unwrap_or(defaults.sound_effect_buttons),
            dice_rolls: self.get(KEY_DICE_ROLLS)?.unwrap_or(defaults.dice_rolls),
            music_loop: self.get(KEY_MUSIC_LOOP)?.unwrap_or(defaults.music_loop),
        };

        Ok(prefs.normalized())
    }

    /// Write every preference in one transaction.
    ///
    /// # Errors
    /// Returns error if any write fails; nothing is committed in that case.
    pub fn save(&mut self, prefs: &Preferences) -> Result<()> {
        let entries = [
            (KEY_MUSIC_VOLUME, to_json(&prefs.music_volume)?),
            (KEY_EFFECTS_VOLUME, to_json(&prefs.effects_volume)?),
            (KEY_SOUND_BUTTONS, to_json(&prefs.sound_effect_buttons)?),
            (KEY_DICE_ROLLS, to_json(&prefs.dice_rolls)?),
            (KEY_MUSIC_LOOP, to_json(&prefs.music_loop)?),
        ];

        let tx = self.conn.transaction().map_err(AppError::database)?;
        for (key, value) in &entries {
            upsert(&tx, key, value)?;
        }
        tx.commit().map_err(AppError::database)?;

        tracing::debug!("Preferences saved");
        Ok(())
    }

    /// Number of stored keys.
    #[cfg(test)]
    pub fn key_count(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM preferences", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|c| usize::try_from(c).unwrap_or_default())
            .map_err(AppError::database)
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO preferences (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        ",
        params![key, value],
    )
    .map_err(AppError::database)?;
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(AppError::json_parse)
}
