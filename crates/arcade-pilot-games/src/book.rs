//! The game book: which games exist and what calling each one means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::GameError;

/// Name of the game that has a claim step after each play.
pub const MINES: &str = "mines";

/// Call data of the mines `endGame` claim, sent to the arcade contract.
pub const MINES_CLAIM_DATA: &str = "0x0d942fd00000000000000000000000008bbd8f37a3349d83c85de1f2e32b3fd2fce2468e0000000000000000000000000000000000000000000000000000000000000002000000000000000000000000e328a0b1e0be7043c9141c2073e408d1086e117500000000000000000000000000000000000000000000000000000000000000a000000000000000000000000000000000000000000000000000000000000000e00000000000000000000000000000000000000000000000000000000000000007656e6447616d65000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

fn zero_value() -> String {
    "0n".to_string()
}

/// One contract invocation, in the shape the hub's `call` expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCall {
    /// Contract address.
    pub dest: String,
    /// ABI-encoded call data, `0x`-prefixed.
    pub data: String,
    /// Native value in the hub's bigint notation.
    #[serde(default = "zero_value")]
    pub value: String,
}

impl GameCall {
    pub fn new(dest: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            data: data.into(),
            value: zero_value(),
        }
    }

    /// The `call` member of a permitted call's params.
    pub fn to_value(&self) -> Value {
        json!({
            "dest": self.dest,
            "data": self.data,
            "value": self.value,
        })
    }
}

/// Immutable mapping from game name to its call payload.
///
/// Built once at startup and shared read-only between accounts.
/// Iteration order is alphabetical so every account plays games in the
/// same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameBook {
    games: BTreeMap<String, GameCall>,
}

impl GameBook {
    pub fn new(games: BTreeMap<String, GameCall>) -> Self {
        Self { games }
    }

    /// Looks up a game's payload.
    ///
    /// # Errors
    /// - [`GameError::UnknownGame`] — no game with that name is configured
    pub fn get(&self, name: &str) -> Result<&GameCall, GameError> {
        self.games
            .get(name)
            .ok_or_else(|| GameError::UnknownGame(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.games.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.games.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, GameCall)> for GameBook {
    fn from_iter<I: IntoIterator<Item = (N, GameCall)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(n, c)| (n.into(), c)).collect())
    }
}
