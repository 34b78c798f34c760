//! Backend error classification.
//!
//! The hub reports failures as free text. This module turns that text
//! into an [`ErrorClass`] with an ordered list of substring rules; the
//! first rule whose needle occurs in the message decides.
//!
//! The order matters: "Account is Locked for limit" must be a ban, not a
//! rate limit, so the `Locked` rule sits above the `limit` one.

use std::fmt;

/// What a backend error message means for the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The session went stale; re-create it and retry once.
    StaleSession,
    /// The account is banned from the game for a while.
    Banned,
    /// The game is rate limited for the rest of the run.
    RateLimited,
    /// The game's random outcome is still pending.
    RandomnessPending,
    /// The permit is no longer accepted.
    StalePermit,
    /// Anything else.
    Unclassified,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StaleSession => "stale session",
            Self::Banned => "banned",
            Self::RateLimited => "rate limited",
            Self::RandomnessPending => "randomness pending",
            Self::StalePermit => "stale permit",
            Self::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Substring rules, evaluated top to bottom.
pub const RULES: &[(&str, ErrorClass)] = &[
    ("Please refresh or try again later", ErrorClass::StaleSession),
    ("Locked", ErrorClass::Banned),
    ("limit", ErrorClass::RateLimited),
    ("random number", ErrorClass::RandomnessPending),
    ("Permit could not verify", ErrorClass::StalePermit),
];

/// Classifies a backend error message.
///
/// Returns `None` for an empty message, which the backend sends when an
/// error carries no text; such errors are not acted upon.
pub fn classify(message: &str) -> Option<ErrorClass> {
    if message.is_empty() {
        return None;
    }
    let class = RULES
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map_or(ErrorClass::Unclassified, |&(_, class)| class);
    Some(class)
}
