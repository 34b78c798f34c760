//! Error types for the session layer.

use arcade_pilot_protocol::ProtocolError;

/// Errors that can occur while establishing a session or a permit.
///
/// These cover the full setup chain: session creation, nonce, the
/// typed-message permit flow, and permit submission. All of them are
/// fatal for the current account cycle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `createSession` did not get a 2xx answer.
    #[error("failed to create session: {0}")]
    SessionCreation(String),

    /// `createNonce` did not get a 2xx answer.
    ///
    /// The backend usually refuses nonces for wallets that never played
    /// on the website.
    #[error("failed to create nonce, please play the games on the website first: {0}")]
    Nonce(String),

    /// `permitTypedMessage` failed, or its document could not be read.
    #[error("failed to create permit: {0}")]
    PermitFlow(String),

    /// `permit` was rejected. Carries the backend's message.
    #[error("failed to submit permit: {0}")]
    PermitSubmission(String),

    /// The wallet could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A lower-layer failure outside the named steps.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
