//! Error types for the protocol layer.
//!
//! Each crate in arcade-pilot defines its own error enum. A
//! `ProtocolError` means the problem is in building or reading an
//! envelope, or in the transport underneath it.

use arcade_pilot_transport::TransportError;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// or the backend changing a response shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The response is well-formed but not what the caller needs,
    /// e.g. an HTML error page where JSON was expected.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The request never got a 2xx answer.
    ///
    /// `transparent` keeps the transport's `"401 - Unauthorized"` text,
    /// which the game classifier matches against.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    /// The HTTP status behind a transport failure, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}
