//! Dice rolling with a reveal delay and persisted history.
//!
//! A roll is started, then revealed once the delay has passed. The panel
//! drives this with `begin`/`poll` from its tick loop; one-shot commands use
//! the async [`DiceRoller::roll`].

use std::time::{Duration, Instant};

use rand::Rng;

use crate::domain::{DiceConfig, DiceHistory, DiceRoll};

pub struct DiceRoller<R: Rng> {
    rng: R,
    history: DiceHistory,
    reveal_delay: Duration,
    pending_since: Option<Instant>,
}

impl<R: Rng> DiceRoller<R> {
    pub fn new(rng: R, config: &DiceConfig, rolls: Vec<DiceRoll>) -> Self {
        Self {
            rng,
            history: DiceHistory::from_rolls(rolls, config.history_limit),
            reveal_delay: config.reveal_delay(),
            pending_since: None,
        }
    }

    #[must_use]
    pub const fn history(&self) -> &DiceHistory {
        &self.history
    }

    #[must_use]
    pub const fn is_rolling(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Start a roll. Returns `false` if one is already in flight.
    pub fn begin(&mut self, now: Instant) -> bool {
        if self.pending_since.is_some() {
            return false;
        }
        self.pending_since = Some(now);
        true
    }

    /// Reveal the pending roll once the delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<DiceRoll> {
        let started = self.pending_since?;
        if now.saturating_duration_since(started) < self.reveal_delay {
            return None;
        }
        self.pending_since = None;
        Some(self.reveal())
    }

    /// Roll, wait out the reveal delay, and record the result.
    pub async fn roll(&mut self) -> DiceRoll {
        tokio::time::sleep(self.reveal_delay).await;
        self.reveal()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("Dice history cleared");
    }

    fn reveal(&mut self) -> DiceRoll {
        let roll = DiceRoll::roll(&mut self.rng);
        tracing::info!(
            dice1 = roll.dice1,
            dice2 = roll.dice2,
            sum = roll.sum,
            "Dice rolled"
        );
        self.history.push(roll.clone());
        roll
    }
}
