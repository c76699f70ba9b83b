//! Best score tracking
//!
//! One best score per game, keyed by the game's name. The store is consulted
//! once at load; later submissions only write when the score improves.

use crate::persistence::ScoreStore;

pub struct HighScores {
    key: String,
    best: Option<u64>,
    store: Box<dyn ScoreStore>,
}

impl std::fmt::Debug for HighScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScores")
            .field("key", &self.key)
            .field("best", &self.best)
            .finish_non_exhaustive()
    }
}

impl HighScores {
    /// Read the saved best for `key`. Negative or non-finite values are
    /// treated as no saved score.
    pub fn load(key: &str, store: Box<dyn ScoreStore>) -> Self {
        let best = store
            .get(key)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64);
        match best {
            Some(best) => log::info!("Loaded best score {best} for {key}"),
            None => log::info!("No saved best score for {key}"),
        }
        Self {
            key: key.to_string(),
            best,
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn best(&self) -> Option<u64> {
        self.best
    }

    /// Whether `score` would beat the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0 && self.best.is_none_or(|best| score > best)
    }

    /// Record a finished game. Returns true if it set a new best.
    ///
    /// The in-memory best is updated even if the store refuses the write.
    pub fn submit(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = Some(score);
        if self.store.set(&self.key, score as f64) {
            log::info!("New best score {score} for {}", self.key);
        }
        true
    }
}
