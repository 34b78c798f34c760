//! The game orchestrator: plays games and recovers from backend errors.
//!
//! One orchestrator drives one account. Each play is a permitted `call`
//! whose outcome is read in this order:
//!
//! 1. `result.hash.errorTypes` present → domain failure, wait and move on
//! 2. no `error` member → success
//! 3. otherwise the error text is classified (see [`classify`]) and the
//!    matching recovery runs
//!
//! Transport failures are classified by their text as well, so a
//! non-2xx reply is recovered from the same way an error envelope is.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use arcade_pilot_pace::{RetryPolicy, humanize, pause};
use arcade_pilot_protocol::{RpcMethod, RpcResponse};
use arcade_pilot_session::{SessionClient, SessionError, Signer};
use arcade_pilot_transport::Transport;

use crate::book::{MINES, MINES_CLAIM_DATA};
use crate::classify::{ErrorClass, classify};
use crate::{GameBook, GameCall, GameError, Points, StatusBoard};

/// How long a game stays off after the backend reports a ban.
pub const BAN_COOLDOWN: Duration = Duration::from_secs(6480);

/// Per-account settings the orchestrator needs beyond the game book.
#[derive(Debug, Clone)]
pub struct PlaySettings {
    /// Arcade contract the mines claim is sent to.
    pub contract: String,
    /// ERC-20 the registration approval is issued on.
    pub approval_token: String,
    /// Base URL of the points gateway.
    pub gateway_url: String,
    /// The account's smart-wallet address, used as `player`.
    pub player: Option<String>,
    pub register_retry: RetryPolicy,
}

/// How a single play attempt ended, when it did not end in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    /// The transaction went through but the game action failed.
    DomainFailure,
    /// Banned; the game cools down for [`BAN_COOLDOWN`].
    Banned,
    /// Rate limited; the game is off for the rest of the run.
    Limited,
    /// Pending randomness resolved with `reIterate`.
    Reiterated,
    /// Pending randomness resolved with `refund`.
    Refunded,
    /// Not attempted: the game is limited or cooling down.
    Skipped,
    /// The backend returned an error without any text.
    Unreported,
}

/// Plays the configured games for one account.
pub struct Orchestrator<T: Transport, S: Signer> {
    pub(crate) session: SessionClient<T, S>,
    pub(crate) book: Arc<GameBook>,
    pub(crate) settings: PlaySettings,
    pub(crate) board: StatusBoard,
    pub(crate) points: Option<Points>,
}

impl<T: Transport, S: Signer> Orchestrator<T, S> {
    /// Wraps an already authorized session. Every game in `book` starts
    /// out `pending`.
    pub fn new(session: SessionClient<T, S>, book: Arc<GameBook>, settings: PlaySettings) -> Self {
        let board = StatusBoard::new(book.names());
        Self {
            session,
            book,
            settings,
            board,
            points: None,
        }
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    pub fn session(&self) -> &SessionClient<T, S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionClient<T, S> {
        &mut self.session
    }

    pub fn settings(&self) -> &PlaySettings {
        &self.settings
    }

    /// The last points snapshot fetched.
    pub fn points(&self) -> Option<Points> {
        self.points
    }

    /// Plays every configured game up to `plays` times each.
    ///
    /// A game drops out of the round as soon as it becomes limited or
    /// starts cooling down. Per-play errors are logged and the round goes
    /// on; only a failure to re-establish the session or the permit
    /// aborts it.
    pub async fn play_round(&mut self, plays: u32) -> Result<(), GameError> {
        let book = Arc::clone(&self.book);
        for name in book.names() {
            for round in 1..=plays {
                if !self.board.is_playable(name) {
                    tracing::debug!(game = name, "game unavailable, skipping rest of round");
                    break;
                }
                match self.play(name).await {
                    Ok(outcome) => tracing::debug!(game = name, round, ?outcome, "play finished"),
                    Err(e @ GameError::Session(_)) => return Err(e),
                    Err(e) => tracing::error!(game = name, round, error = %e, "play failed"),
                }
            }
        }
        Ok(())
    }

    /// Plays `name` once, including the mines claim step.
    ///
    /// # Errors
    /// - [`GameError::UnknownGame`] — `name` is not in the book
    /// - [`GameError::GamePlay`] — stale permit (after re-authorizing),
    ///   an unclassified backend error, or a second stale session
    /// - [`GameError::Refund`] — pending randomness could not be resolved
    /// - [`GameError::Session`] — recovery could not re-establish state
    pub async fn play(&mut self, name: &str) -> Result<PlayOutcome, GameError> {
        let book = Arc::clone(&self.book);
        let call = book.get(name)?;

        if self.board.is_limited(name) {
            tracing::debug!(game = name, "game limited for this run");
            return Ok(PlayOutcome::Skipped);
        }
        if let Some(left) = self.board.cooldown_remaining(name) {
            tracing::debug!(game = name, left = %humanize(left), "game cooling down");
            return Ok(PlayOutcome::Skipped);
        }

        let outcome = self.play_game(name, call).await?;
        if name == MINES && outcome == PlayOutcome::Played {
            self.claim_mines().await?;
        }
        Ok(outcome)
    }

    async fn play_game(&mut self, name: &str, call: &GameCall) -> Result<PlayOutcome, GameError> {
        let mut refreshed = false;
        loop {
            self.game_wait(name, 1000, format!("Playing game: [{name}]")).await;

            let params = self.session.permitted_call(&call.to_value())?;
            let message = match self.session.call(RpcMethod::Call, params).await {
                Ok(response) => match self.settle(name, &response).await {
                    Some(outcome) => return Ok(outcome),
                    None => response.error_message().unwrap_or_default().to_string(),
                },
                Err(SessionError::Protocol(e)) => e.to_string(),
                Err(e) => return Err(e.into()),
            };

            let Some(class) = classify(&message) else {
                tracing::warn!(game = name, "backend error without a message");
                return Ok(PlayOutcome::Unreported);
            };
            tracing::error!(game = name, %class, %message, "play rejected");

            match class {
                ErrorClass::StaleSession if !refreshed => {
                    refreshed = true;
                    self.session.create_session().await?;
                    self.session.create_nonce().await?;
                }
                ErrorClass::StaleSession | ErrorClass::Unclassified => {
                    return Err(GameError::game_play(name, message));
                }
                ErrorClass::Banned => {
                    self.board.set_cooldown(name, BAN_COOLDOWN);
                    self.board.record(
                        name,
                        "Account has been banned, wait for 1.8 hours",
                        BAN_COOLDOWN,
                    );
                    tracing::warn!(game = name, cooldown = %humanize(BAN_COOLDOWN), "banned from game");
                    return Ok(PlayOutcome::Banned);
                }
                ErrorClass::RateLimited => {
                    self.board.mark_limited(name);
                    self.game_wait(name, 1000, message).await;
                    return Ok(PlayOutcome::Limited);
                }
                ErrorClass::RandomnessPending => {
                    self.game_wait(name, 5000, message).await;
                    return self.resolve_randomness(name).await;
                }
                ErrorClass::StalePermit => {
                    self.session.authorize().await?;
                    return Err(GameError::game_play(name, message));
                }
            }
        }
    }

    /// Handles the non-error readings of a `call` response. `None` means
    /// the response carries an error that still needs classifying.
    async fn settle(&mut self, name: &str, response: &RpcResponse) -> Option<PlayOutcome> {
        if let Some(failure) = response.domain_failure() {
            self.game_wait(name, 3000, format!("Play game failed: {}", failure.details))
                .await;
            return Some(PlayOutcome::DomainFailure);
        }
        if response.is_success() {
            self.game_wait(name, 2000, format!("Successfully played game: [{name}]"))
                .await;
            return Some(PlayOutcome::Played);
        }
        None
    }

    async fn resolve_randomness(&mut self, name: &str) -> Result<PlayOutcome, GameError> {
        match self.reiterate(name).await {
            Ok(()) => Ok(PlayOutcome::Reiterated),
            Err(e) => {
                tracing::warn!(game = name, error = %e, "reiterate failed, refunding instead");
                self.refund(name).await?;
                Ok(PlayOutcome::Refunded)
            }
        }
    }

    /// Claims the reward of the last mines play.
    ///
    /// A no-op when mines is limited. Claim failures are reported on the
    /// board and waited out, never raised. Returns whether the claim
    /// went through.
    ///
    /// # Errors
    /// - [`GameError::Session`] — no permit to sign the claim with
    pub async fn claim_mines(&mut self) -> Result<bool, GameError> {
        if self.board.is_limited(MINES) {
            tracing::debug!("mines limited, claim skipped");
            return Ok(false);
        }
        self.game_wait(MINES, 600, "Placed").await;
        self.game_wait(MINES, 100, "Claiming mine game reward").await;

        let claim = GameCall::new(&self.settings.contract, MINES_CLAIM_DATA);
        let params = self.session.permitted_call(&claim.to_value())?;
        let failure = match self.session.call(RpcMethod::Call, params).await {
            Err(e) => Some(format!("Failed to claim mine game: {e}")),
            Ok(response) => match (response.error_message(), response.domain_failure()) {
                (Some(message), _) => Some(format!("Failed to claim mine game: {message}")),
                (None, Some(failure)) => Some(format!("Claim failed: {}", failure.details)),
                (None, None) => None,
            },
        };

        match failure {
            Some(message) => {
                self.game_wait(MINES, 10_000, message).await;
                Ok(false)
            }
            None => {
                self.game_wait(MINES, 1500, "Successfully play and claim mine game.")
                    .await;
                Ok(true)
            }
        }
    }

    /// Asks the backend to refund `game`'s pending round.
    ///
    /// # Errors
    /// - [`GameError::Refund`] — no smart address is configured, or the
    ///   hub did not answer 2xx
    pub async fn refund(&mut self, game: &str) -> Result<(), GameError> {
        self.game_wait(
            game,
            1500,
            format!("Refunding game {game} to resolve awaiting random number"),
        )
        .await;
        self.recover(RpcMethod::Refund, game)
            .await
            .map_err(|reason| GameError::Refund {
                game: game.to_string(),
                reason,
            })?;
        self.game_wait(game, 2000, format!("Successfully refund game: {game}"))
            .await;
        Ok(())
    }

    /// Asks the backend to draw `game`'s pending randomness again.
    ///
    /// # Errors
    /// - [`GameError::Reiterate`] — no smart address is configured, or the
    ///   hub did not answer 2xx
    pub async fn reiterate(&mut self, game: &str) -> Result<(), GameError> {
        self.game_wait(
            game,
            1500,
            format!("Reiterate game {game} to resolve awaiting random number"),
        )
        .await;
        self.recover(RpcMethod::ReIterate, game)
            .await
            .map_err(|reason| GameError::Reiterate {
                game: game.to_string(),
                reason,
            })?;
        self.game_wait(game, 2000, format!("Successfully reiterate game: {game}"))
            .await;
        Ok(())
    }

    /// Sends a recovery call for `game` on behalf of the smart address.
    /// Without one there is nothing to recover and no call is made.
    async fn recover(&mut self, method: RpcMethod, game: &str) -> Result<(), String> {
        let Some(player) = self.settings.player.as_deref() else {
            return Err("smart address not configured".to_string());
        };
        let params = json!({
            "game": game,
            "player": player,
        });
        self.session
            .call(method, params)
            .await
            .map(drop)
            .map_err(|e| e.to_string())
    }

    /// Records the phase on the board, then pauses.
    async fn game_wait(&mut self, game: &str, millis: u64, message: impl Into<String>) {
        let message = message.into();
        let duration = Duration::from_millis(millis);
        self.board.record(game, message.as_str(), duration);
        pause(duration, &message).await;
    }
}
