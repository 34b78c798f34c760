//! Configuration loaded once at startup.
//!
//! A single JSON document describes the accounts, the games and every
//! endpoint. Everything except `accounts`, `games` and `contract` has a
//! default, so a minimal file looks like:
//!
//! ```json
//! {
//!   "accounts": [{ "key": "0x…", "smart_address": "0x…" }],
//!   "contract": "0x…",
//!   "games": {
//!     "plinko": { "dest": "0x…", "data": "0x…" }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use arcade_pilot_games::{GameBook, PlaySettings};
use arcade_pilot_pace::RetryPolicy;

use crate::PilotError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ARCADE_PILOT_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// One wallet to drive.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// 64-hex-digit private key (optional `0x`) or a 12/24-word mnemonic.
    pub key: String,
    /// Smart-wallet address used as `player` for points and recovery.
    #[serde(default)]
    pub smart_address: Option<String>,
    /// HTTP(S) proxy for every request of this account.
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Chain RPC used for balance lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub chain_id: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://rpc.blaze.soniclabs.com".to_string(),
            chain_id: 57054,
        }
    }
}

/// Registration retry bounds, in the config file's units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..RetryPolicy::default()
        }
        .validated()
    }
}

fn default_approval_token() -> String {
    "0x4Cc7b0ddCD0597496E57C5325cf4c73dBA30cdc9".to_string()
}

fn default_hub_url() -> String {
    "https://arcade.hub.soniclabs.com/rpc".to_string()
}

fn default_gateway_url() -> String {
    "https://arcade.gateway.soniclabs.com".to_string()
}

fn default_airdrop_url() -> String {
    "https://airdrop.soniclabs.com".to_string()
}

fn default_origin() -> String {
    "https://arcade.soniclabs.com".to_string()
}

fn default_sessions_dir() -> PathBuf {
    PathBuf::from(".sessions")
}

fn default_plays_per_cycle() -> u32 {
    1
}

fn default_cycle_interval_secs() -> u64 {
    3_600
}

fn default_cycle_deadline_secs() -> u64 {
    1_800
}

/// Everything the pilot needs to run.
#[derive(Debug, Clone, Deserialize)]
pub struct PilotConfig {
    pub accounts: Vec<AccountConfig>,
    pub games: GameBook,
    /// Arcade contract the mines claim is sent to.
    pub contract: String,
    #[serde(default = "default_approval_token")]
    pub approval_token: String,
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Airdrop referral code attached to users without one.
    #[serde(default)]
    pub referrer_code: String,
    #[serde(default = "default_hub_url")]
    pub hub_url: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_airdrop_url")]
    pub airdrop_url: String,
    /// Origin/Referer the browser headers claim.
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: PathBuf,
    #[serde(default = "default_plays_per_cycle")]
    pub plays_per_cycle: u32,
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    #[serde(default = "default_cycle_deadline_secs")]
    pub cycle_deadline_secs: u64,
    #[serde(default)]
    pub register_retry: RetryConfig,
}

impl PilotConfig {
    /// Parses and validates a config document.
    pub fn from_json(text: &str) -> Result<Self, PilotError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| PilotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the config file at `path`.
    pub async fn load(path: &Path) -> Result<Self, PilotError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PilotError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), PilotError> {
        if self.accounts.is_empty() {
            return Err(PilotError::Config("no accounts configured".to_string()));
        }
        if self.games.is_empty() {
            return Err(PilotError::Config("no games configured".to_string()));
        }
        if self.contract.is_empty() {
            return Err(PilotError::Config("contract address is empty".to_string()));
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn cycle_deadline(&self) -> Duration {
        Duration::from_secs(self.cycle_deadline_secs)
    }

    /// Orchestrator settings for one account.
    pub fn play_settings(&self, account: &AccountConfig) -> PlaySettings {
        PlaySettings {
            contract: self.contract.clone(),
            approval_token: self.approval_token.clone(),
            gateway_url: self.gateway_url.clone(),
            player: account.smart_address.clone(),
            register_retry: self.register_retry.policy(),
        }
    }
}

/// Resolves the config path: first CLI argument, then [`CONFIG_ENV`],
/// then [`DEFAULT_CONFIG_PATH`].
pub fn config_path(cli_arg: Option<String>, env_value: Option<String>) -> PathBuf {
    cli_arg
        .or(env_value)
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}
