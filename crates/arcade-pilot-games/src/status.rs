//! Per-game status board, limited flags and cooldowns.
//!
//! The board is observability state: every wait and attempt writes the
//! last phase and its pause there. The `limited` set and the cooldowns
//! on the other hand DO gate play; a limited game stays off for the
//! rest of the run, a cooling-down game until its deadline passes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use arcade_pilot_pace::humanize;

/// Last observed phase of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStatus {
    pub message: String,
    /// Human-readable length of the last pause.
    pub waiting: String,
}

impl Default for GameStatus {
    fn default() -> Self {
        Self {
            message: "pending".to_string(),
            waiting: "-".to_string(),
        }
    }
}

/// Status, limited flags and cooldowns for every game of one account.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    statuses: BTreeMap<String, GameStatus>,
    limited: HashSet<String>,
    cooldowns: HashMap<String, Instant>,
}

impl StatusBoard {
    /// A board with every game `pending`.
    pub fn new<'a>(games: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            statuses: games
                .into_iter()
                .map(|g| (g.to_string(), GameStatus::default()))
                .collect(),
            ..Self::default()
        }
    }

    /// Records the latest phase of `game`.
    pub fn record(&mut self, game: &str, message: impl Into<String>, waiting: Duration) {
        let status = self.statuses.entry(game.to_string()).or_default();
        status.message = message.into();
        status.waiting = humanize(waiting);
    }

    pub fn status(&self, game: &str) -> Option<&GameStatus> {
        self.statuses.get(game)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GameStatus)> {
        self.statuses.iter().map(|(g, s)| (g.as_str(), s))
    }

    /// Turns `game` off for the rest of the run.
    pub fn mark_limited(&mut self, game: &str) {
        self.limited.insert(game.to_string());
    }

    pub fn is_limited(&self, game: &str) -> bool {
        self.limited.contains(game)
    }

    /// Keeps `game` off until `duration` from now.
    pub fn set_cooldown(&mut self, game: &str, duration: Duration) {
        self.cooldowns
            .insert(game.to_string(), Instant::now() + duration);
    }

    /// Time left on `game`'s cooldown, `None` if it may play.
    pub fn cooldown_remaining(&self, game: &str) -> Option<Duration> {
        let until = self.cooldowns.get(game)?;
        let left = until.saturating_duration_since(Instant::now());
        (!left.is_zero()).then_some(left)
    }

    /// Whether `game` is neither limited nor cooling down.
    pub fn is_playable(&self, game: &str) -> bool {
        !self.is_limited(game) && self.cooldown_remaining(game).is_none()
    }
}

impl fmt::Display for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (game, status)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{game}: {} ({})", status.message, status.waiting)?;
            if self.is_limited(game) {
                f.write_str(" [limited]")?;
            }
        }
        Ok(())
    }
}
