//! Session types: the backend's time-boxed authorization window.
//!
//! A "session" is the hub's record that a wallet is allowed to act for a
//! while. It tracks:
//! - WHO owns it (the wallet address)
//! - WHEN it was created (epoch milliseconds)
//! - WHEN it runs out (`created + ttl`)
//!
//! The JSON-RPC request id is *not* part of the session; see
//! [`RequestIds`](arcade_pilot_protocol::RequestIds).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a created session stays valid on the backend.
    ///
    /// Default: 24 hours.
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One session created on the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub owner: String,
    /// Epoch milliseconds.
    pub created_at_ms: u64,
    /// Epoch milliseconds; sent to the hub as `until`.
    pub expires_at_ms: u64,
}

impl Session {
    /// A session created at `created_at_ms` that lives for `ttl`.
    pub fn new(owner: impl Into<String>, created_at_ms: u64, ttl: Duration) -> Self {
        Self {
            owner: owner.into(),
            created_at_ms,
            expires_at_ms: created_at_ms + ttl.as_millis() as u64,
        }
    }

    /// Whether the session is past its expiry at `now_ms`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
