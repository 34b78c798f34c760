//! Unified error type for arcade-pilot.

use std::time::Duration;

use arcade_pilot_games::GameError;
use arcade_pilot_protocol::ProtocolError;
use arcade_pilot_session::SessionError;
use arcade_pilot_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// An account cycle returns this; the runner logs it with the account's
/// span and moves on to the next cycle. The `#[from]` variants let `?`
/// lift layer errors without ceremony.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// The configuration file is missing, unreadable or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An account secret is neither a private key nor a mnemonic.
    #[error("invalid account secret phrase or private key: {0}")]
    InvalidKey(String),

    /// The chain RPC could not report the wallet's balance.
    #[error("failed to get balance: {0}")]
    Balance(String),

    /// The airdrop user lookup failed.
    #[error("failed to get user information: {0}")]
    UserLookup(String),

    /// A cycle ran past its deadline and was cancelled.
    #[error("cycle exceeded its deadline of {}s", .0.as_secs())]
    Deadline(Duration),

    /// An account task ended without reporting back.
    #[error("account worker failed: {0}")]
    Worker(String),
}
