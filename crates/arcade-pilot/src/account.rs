//! One account's cycle, from key to status board.
//!
//! ```text
//! key → balance → user → referral → session → nonce → permit
//!     → register (+ points) → play every game → points → report
//! ```
//!
//! Everything for an account happens strictly in this order; the only
//! concurrency is between accounts.

use std::sync::Arc;

use arcade_pilot_games::{Orchestrator, Points, StatusBoard};
use arcade_pilot_pace::pause_ms;
use arcade_pilot_protocol::RpcClient;
use arcade_pilot_session::{SessionClient, SessionConfig, SessionStore, Signer};
use arcade_pilot_transport::{HttpTransport, Transport, random_user_agent};

use crate::profile::{find_user, get_balance, referral_message, set_invited};
use crate::{AccountConfig, LocalWallet, PilotConfig, PilotError};

/// What one cycle achieved.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub address: String,
    pub balance: String,
    pub points: Option<Points>,
    pub board: StatusBoard,
}

/// A configured wallet and everything needed to run its cycles.
#[derive(Debug, Clone)]
pub struct Account {
    index: usize,
    settings: AccountConfig,
    wallet: LocalWallet,
    config: Arc<PilotConfig>,
}

impl Account {
    /// Prepares account number `index` (0-based) of `config`.
    ///
    /// # Errors
    /// - [`PilotError::InvalidKey`] — the key is not usable
    pub fn new(index: usize, config: Arc<PilotConfig>) -> Result<Self, PilotError> {
        let settings = config
            .accounts
            .get(index)
            .cloned()
            .ok_or_else(|| PilotError::Config(format!("no account #{index}")))?;
        let wallet = LocalWallet::from_secret(&settings.key)?;
        Ok(Self {
            index,
            settings,
            wallet,
            config,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn address(&self) -> &str {
        self.wallet.address()
    }

    /// Runs one cycle over HTTP, honouring the account's proxy and a
    /// fresh random user agent.
    pub async fn run_cycle(&self) -> Result<CycleReport, PilotError> {
        let transport = HttpTransport::builder(&self.config.origin)
            .user_agent(random_user_agent())
            .proxy(self.settings.proxy.clone())
            .build()?;
        self.run_cycle_with(transport).await
    }

    /// Runs one cycle over `transport`.
    ///
    /// # Errors
    /// Balance, user lookup and every session/permit setup failure end
    /// the cycle. Registration, invite and points problems only log.
    pub async fn run_cycle_with<T: Transport>(
        &self,
        transport: T,
    ) -> Result<CycleReport, PilotError> {
        let config = &self.config;
        let address = self.wallet.address().to_string();
        tracing::info!(kind = ?self.wallet.kind(), "account connected");

        pause_ms(500, &format!("Fetching balance of address: {address}")).await;
        let balance = get_balance(&transport, &config.rpc.url, &address).await?;
        pause_ms(500, &format!("Balance updated: {balance}")).await;

        let store = SessionStore::new(&config.sessions_dir);
        let mut session = SessionClient::new(
            transport,
            &config.hub_url,
            self.wallet.clone(),
            SessionConfig::default(),
            store,
        );

        self.join_airdrop(session.rpc(), session.signer()).await?;

        session.create_session().await?;
        session.authorize().await?;

        let mut pilot = Orchestrator::new(
            session,
            Arc::new(config.games.clone()),
            config.play_settings(&self.settings),
        );
        pilot.register().await;
        pilot.play_round(config.plays_per_cycle).await?;
        pilot.get_points().await;

        tracing::info!(board = %pilot.board(), "cycle finished");
        Ok(CycleReport {
            address,
            balance,
            points: pilot.points(),
            board: pilot.board().clone(),
        })
    }

    /// Looks the user up and, if nobody referred them yet, attaches the
    /// configured referral code. Only the lookup can fail the cycle.
    async fn join_airdrop<T: Transport>(
        &self,
        rpc: &RpcClient<T>,
        signer: &LocalWallet,
    ) -> Result<(), PilotError> {
        let config = &self.config;
        let address = signer.address();

        pause_ms(1000, "Fetching user information").await;
        let user = find_user(rpc, &config.airdrop_url, address).await?;
        pause_ms(500, "User information retrieved successfully").await;

        if user.invited_code.is_some() {
            pause_ms(1000, "Invite code already set").await;
            return Ok(());
        }
        if config.referrer_code.is_empty() {
            tracing::debug!("no referrer code configured, invite skipped");
            return Ok(());
        }

        let message = referral_message(&config.referrer_code, address);
        let outcome: Result<_, PilotError> = async {
            let signature = signer.sign_message(message.as_bytes()).await?;
            set_invited(rpc, &config.airdrop_url, address, &config.referrer_code, &signature)
                .await?;
            pause_ms(1000, "Successfully updated the invite code").await;
            find_user(rpc, &config.airdrop_url, address).await
        }
        .await;

        if let Err(e) = outcome {
            tracing::error!(error = %e, "failed to update user invite code");
        }
        Ok(())
    }
}
