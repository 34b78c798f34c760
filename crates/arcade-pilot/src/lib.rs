//! # Arcade Pilot
//!
//! Multi-account automation for the Sonic arcade play-to-earn backend.
//!
//! Each configured wallet runs the same cycle on its own task: check the
//! balance, join the airdrop, open a session, obtain a permit, register,
//! play every configured game and report points. The layers below do the
//! work; this crate wires them to configuration, keys and the runner.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcade_pilot::prelude::*;
//!
//! # async fn start() -> Result<(), PilotError> {
//! let config = PilotConfig::load(&config_path(None, None)).await?;
//! Pilot::new(config).run().await
//! # }
//! ```

mod account;
mod config;
mod error;
mod pilot;
mod profile;
mod wallet;

pub use account::{Account, CycleReport};
pub use config::{
    AccountConfig, CONFIG_ENV, DEFAULT_CONFIG_PATH, PilotConfig, RetryConfig, RpcConfig,
    config_path,
};
pub use error::PilotError;
pub use pilot::Pilot;
pub use profile::{User, find_user, get_balance, referral_message, set_invited};
pub use wallet::{KeyKind, LocalWallet, detect_key};

pub mod prelude {
    pub use crate::{Account, CycleReport, Pilot, PilotConfig, PilotError, config_path};
    pub use arcade_pilot_games::{GameBook, GameCall, PlayOutcome, StatusBoard};
    pub use arcade_pilot_session::Signer;
}
