//! Error types for the games layer.

use arcade_pilot_session::SessionError;

/// Errors that can occur while playing, recovering or registering.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The backend rejected a play and no recovery applies. Carries the
    /// backend's message verbatim.
    #[error("failed to play game [{game}]: {message}")]
    GamePlay { game: String, message: String },

    /// The game name is not in the configured [`GameBook`](crate::GameBook).
    #[error("undefined game: [{0}]")]
    UnknownGame(String),

    /// `refund` did not get a 2xx answer.
    #[error("failed to refund game {game}: {reason}")]
    Refund { game: String, reason: String },

    /// `reIterate` did not get a 2xx answer.
    #[error("failed to reiterate game {game}: {reason}")]
    Reiterate { game: String, reason: String },

    /// The approval call behind registration was rejected.
    #[error("failed to register user key: {0}")]
    Registration(String),

    /// A wallet address that does not parse as 20 hex bytes.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Re-establishing the session or the permit failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl GameError {
    pub(crate) fn game_play(game: &str, message: impl Into<String>) -> Self {
        Self::GamePlay {
            game: game.to_string(),
            message: message.into(),
        }
    }
}
