//! Registration (token-spend approval) and points polling.

use alloy::primitives::{Address, U256, hex, keccak256};
use alloy::sol_types::SolValue;
use serde::Deserialize;

use arcade_pilot_pace::pause_ms;
use arcade_pilot_protocol::RpcMethod;
use arcade_pilot_session::Signer;
use arcade_pilot_transport::Transport;

use crate::{GameCall, GameError, Orchestrator};

/// Points snapshot from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub today: f64,
    #[serde(rename = "totalPoints", default)]
    pub total: f64,
}

/// ABI call data for `approve(spender, type(uint256).max)`.
///
/// # Errors
/// - [`GameError::InvalidAddress`] — `spender` is not an address
pub fn approve_calldata(spender: &str) -> Result<String, GameError> {
    let spender: Address = spender
        .parse()
        .map_err(|e| GameError::InvalidAddress(format!("{spender}: {e}")))?;

    let mut data = keccak256("approve(address,uint256)")[..4].to_vec();
    data.extend((spender, U256::MAX).abi_encode_params());
    Ok(hex::encode_prefixed(data))
}

impl<T: Transport, S: Signer> Orchestrator<T, S> {
    /// Registers the account's key by approving unlimited spending of the
    /// approval token, then fetches points.
    ///
    /// Retries with the configured backoff. Running out of attempts is
    /// logged and reported as `false`; registration never fails the
    /// cycle.
    pub async fn register(&mut self) -> bool {
        tracing::info!(token = %self.settings.approval_token, "registering user key");
        let mut backoff = self.settings.register_retry.start();

        while let Some(attempt) = backoff.next_attempt().await {
            match self.try_register().await {
                Ok(()) => {
                    pause_ms(1500, "User key registered").await;
                    self.get_points().await;
                    return true;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "failed to register user key");
                }
            }
        }

        tracing::warn!(
            attempts = backoff.attempts(),
            "registration retries exhausted, giving up until next cycle"
        );
        false
    }

    async fn try_register(&mut self) -> Result<(), GameError> {
        let data = approve_calldata(self.session.owner())?;
        let approval = GameCall::new(&self.settings.approval_token, data);
        let params = self.session.permitted_call(&approval.to_value())?;

        let response = self.session.call(RpcMethod::Call, params).await?;
        match response.error_message() {
            Some(message) => Err(GameError::Registration(message.to_string())),
            None => Ok(()),
        }
    }

    /// Fetches today's and total points for the smart address.
    ///
    /// Failures are logged at `warn` and yield `None`; a missing smart
    /// address skips the request.
    pub async fn get_points(&mut self) -> Option<Points> {
        let Some(player) = self.settings.player.as_deref() else {
            pause_ms(500, "Smart address not configured, skip").await;
            return None;
        };
        let url = format!(
            "{}/game/points-by-player?wallet={player}",
            self.settings.gateway_url.trim_end_matches('/')
        );

        pause_ms(1000, "Getting user points").await;
        match self.session.rpc().get_json::<Points>(&url).await {
            Ok(points) => {
                tracing::info!(today = points.today, total = points.total, "points updated");
                self.points = Some(points);
                pause_ms(1500, "Successfully get total points").await;
                Some(points)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to get points");
                None
            }
        }
    }
}
