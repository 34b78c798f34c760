//! The session client: one account's view of the hub.
//!
//! It owns everything that must stay strictly sequential for a wallet:
//! the [`RpcClient`] (and with it the request-id counter), the signer,
//! the current [`Session`] and the current [`Permit`].
//!
//! # Lifecycle
//!
//! ```text
//! create_session() ──→ authorize() ──→ permitted calls
//!        ▲              (create_nonce → typed message → permit)
//!        │                   ▲
//!   "Please refresh…"   "Permit could not verify"
//! ```
//!
//! Every step may be re-run later by the game layer when the backend
//! reports that the session or the permit went stale.

use serde_json::{Value, json};

use arcade_pilot_pace::pause_ms;
use arcade_pilot_protocol::{RpcClient, RpcMethod, RpcResponse};
use arcade_pilot_transport::Transport;

use crate::session::now_ms;
use crate::{Permit, Session, SessionConfig, SessionError, SessionStore, Signer};

/// Session and permit state for a single account.
///
/// Not shared between tasks: each account worker owns its client, so
/// `&mut self` on every call is what keeps the request ids ordered.
pub struct SessionClient<T: Transport, S: Signer> {
    pub(crate) rpc: RpcClient<T>,
    pub(crate) signer: S,
    pub(crate) config: SessionConfig,
    pub(crate) store: SessionStore,
    pub(crate) session: Option<Session>,
    pub(crate) permit: Option<Permit>,
}

impl<T: Transport, S: Signer> SessionClient<T, S> {
    /// Creates a client for `signer`'s wallet talking to the hub at
    /// `endpoint`. No request is sent until a lifecycle method runs.
    pub fn new(
        transport: T,
        endpoint: impl Into<String>,
        signer: S,
        config: SessionConfig,
        store: SessionStore,
    ) -> Self {
        let rpc = RpcClient::new(transport, endpoint, signer.address());
        Self {
            rpc,
            signer,
            config,
            store,
            session: None,
            permit: None,
        }
    }

    /// The wallet address every request is sent for.
    pub fn owner(&self) -> &str {
        self.rpc.owner()
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn rpc(&self) -> &RpcClient<T> {
        &self.rpc
    }

    pub fn rpc_mut(&mut self) -> &mut RpcClient<T> {
        &mut self.rpc
    }

    /// The most recently created session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The current authorization, if the permit sequence has completed.
    pub fn permit(&self) -> Option<&Permit> {
        self.permit.as_ref()
    }

    /// Forwards one JSON-RPC call through the account's counter.
    pub async fn call(
        &mut self,
        method: RpcMethod,
        params: Value,
    ) -> Result<RpcResponse, SessionError> {
        Ok(self.rpc.call(method, params).await?)
    }

    /// Opens a new 24h session on the hub.
    ///
    /// Any 2xx counts as success: the creation time is written to the
    /// account's marker file and the session is remembered. A failed
    /// marker write is only logged.
    ///
    /// # Errors
    /// - [`SessionError::SessionCreation`] — the hub did not answer 2xx
    pub async fn create_session(&mut self) -> Result<&Session, SessionError> {
        pause_ms(1000, "Creating session").await;

        match self.store.last_created(self.owner()).await {
            Ok(Some(last)) => {
                tracing::debug!(last_created_ms = last, "previous session marker found")
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read session marker"),
        }

        let created_at = now_ms();
        let session = Session::new(self.owner(), created_at, self.config.ttl);
        let params = json!({
            "owner": self.owner(),
            "until": session.expires_at_ms,
        });

        self.rpc
            .call(RpcMethod::CreateSession, params)
            .await
            .map_err(|e| SessionError::SessionCreation(e.to_string()))?;

        if let Err(e) = self.store.record(self.owner(), created_at).await {
            tracing::warn!(error = %e, "could not persist session marker");
        }
        tracing::info!(expires_at_ms = session.expires_at_ms, "session created");
        pause_ms(1000, "Successfully create session").await;

        Ok(&*self.session.insert(session))
    }

    /// Asks the hub for a fresh nonce ahead of the permit sequence.
    ///
    /// # Errors
    /// - [`SessionError::Nonce`] — the hub did not answer 2xx
    pub async fn create_nonce(&mut self) -> Result<(), SessionError> {
        pause_ms(500, "Creating nonce").await;

        let params = json!({ "owner": self.owner() });
        self.rpc
            .call(RpcMethod::CreateNonce, params)
            .await
            .map_err(|e| SessionError::Nonce(e.to_string()))?;

        pause_ms(500, "Successfully created nonce").await;
        Ok(())
    }
}
