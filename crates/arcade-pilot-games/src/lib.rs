//! Game orchestration for arcade-pilot.
//!
//! Drives the play loop of one account against the hub and decides, per
//! backend answer, whether to retry, re-authenticate, back off or give up.
//!
//! # Key types
//!
//! - [`GameBook`] — the configured games and their call payloads
//! - [`classify`] — ordered substring rules mapping error text to an [`ErrorClass`]
//! - [`Orchestrator`] — plays, claims, recovers, registers, polls points
//! - [`StatusBoard`] — per-game status, limited flags and cooldowns

mod book;
mod classify;
mod error;
mod orchestrator;
mod points;
mod status;

pub use book::{GameBook, GameCall, MINES, MINES_CLAIM_DATA};
pub use classify::{ErrorClass, RULES, classify};
pub use error::GameError;
pub use orchestrator::{BAN_COOLDOWN, Orchestrator, PlayOutcome, PlaySettings};
pub use points::{Points, approve_calldata};
pub use status::{GameStatus, StatusBoard};
