//! Two-dice rolls and the recent-roll history.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of rolls kept in history unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Faces on each die.
pub const DIE_FACES: u8 = 6;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// One revealed roll of two six-sided dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// `<epoch-millis>-<9 random base36 chars>`.
    pub id: String,
    pub dice1: u8,
    pub dice2: u8,
    /// Always `dice1 + dice2`.
    pub sum: u8,
    pub timestamp: DateTime<Utc>,
}

impl DiceRoll {
    /// Draw two independent uniform values in `1..=6`.
    #[must_use]
    pub fn roll(rng: &mut impl Rng) -> Self {
        let dice1 = rng.random_range(1..=DIE_FACES);
        let dice2 = rng.random_range(1..=DIE_FACES);
        Self::from_values(dice1, dice2, Utc::now(), rng)
    }

    /// Build a roll from known die values.
    #[must_use]
    pub fn from_values(
        dice1: u8,
        dice2: u8,
        timestamp: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Self {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
            .collect();
        Self {
            id: format!("{}-{suffix}", timestamp.timestamp_millis()),
            dice1,
            dice2,
            sum: dice1 + dice2,
            timestamp,
        }
    }

    #[must_use]
    pub const fn is_doubles(&self) -> bool {
        self.dice1 == self.dice2
    }
}

/// Most-recent-first list of rolls with a fixed cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceHistory {
    rolls: Vec<DiceRoll>,
    limit: usize,
}

impl Default for DiceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl DiceHistory {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            rolls: Vec::new(),
            limit,
        }
    }

    /// Rebuild from persisted rolls, dropping anything past the cap or out of range.
    #[must_use]
    pub fn from_rolls(rolls: Vec<DiceRoll>, limit: usize) -> Self {
        let mut rolls: Vec<DiceRoll> = rolls
            .into_iter()
            .filter(|r| {
                (1..=DIE_FACES).contains(&r.dice1)
                    && (1..=DIE_FACES).contains(&r.dice2)
                    && r.sum == r.dice1 + r.dice2
            })
            .collect();
        rolls.truncate(limit);
        Self { rolls, limit }
    }

    /// Record a roll at the front, evicting the oldest past the cap.
    pub fn push(&mut self, roll: DiceRoll) {
        self.rolls.insert(0, roll);
        self.rolls.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.rolls.clear();
    }

    #[must_use]
    pub fn latest(&self) -> Option<&DiceRoll> {
        self.rolls.first()
    }

    #[must_use]
    pub fn rolls(&self) -> &[DiceRoll] {
        &self.rolls
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }
}
