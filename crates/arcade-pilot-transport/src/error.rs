/// Errors that can occur in the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The backend answered with a non-2xx status.
    ///
    /// The display form (`"401 - Unauthorized"`) is what the game
    /// classifier sees when a play call fails at the HTTP level.
    #[error("{status} - {reason}")]
    Status { status: u16, reason: String },

    /// The request never produced a response (DNS, TLS, reset, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The client or a request could not be built (bad proxy URL, bad header).
    #[error("invalid transport configuration: {0}")]
    Build(String),
}

impl TransportError {
    /// Returns the HTTP status for [`TransportError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
