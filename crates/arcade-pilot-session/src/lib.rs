//! Session lifecycle and permit authorization for arcade-pilot.
//!
//! This crate takes a wallet from "unknown to the hub" to "authorized to
//! play":
//!
//! 1. **Session** — `createSession` opens a 24h window ([`SessionClient::create_session`])
//! 2. **Nonce** — `createNonce` opens the permit flow ([`SessionClient::create_nonce`])
//! 3. **Permit** — nonce, typed message, signature, submission ([`SessionClient::authorize`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Games Layer (above)  ← plays through permitted calls, re-runs steps on staleness
//!     ↕
//! Session Layer (this crate)  ← session, nonce and permit state per account
//!     ↕
//! Protocol Layer (below)  ← JSON-RPC envelopes and the request-id counter
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod permit;
mod session;
mod signer;
mod store;

pub use error::SessionError;
pub use manager::SessionClient;
pub use permit::Permit;
pub use session::{Session, SessionConfig, now_ms};
pub use signer::Signer;
pub use store::SessionStore;
