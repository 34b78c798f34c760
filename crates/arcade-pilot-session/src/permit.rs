//! The permit sequence: nonce → typed message → signature → submission.
//!
//! The hub hands out an EIP-712 document describing what the arcade
//! contract may spend. Signing it and submitting the signature yields
//! the `part` (the hub calls it `hashKey`), which together with the
//! signature authorizes every later `call`.

use serde_json::{Value, json};

use arcade_pilot_pace::pause_ms;
use arcade_pilot_protocol::{RpcMethod, RpcResponse};
use arcade_pilot_transport::Transport;

use crate::{SessionClient, SessionError, Signer};

/// HTTP status the hub answers with when its anti-bot check trips.
const ANTI_BOT_STATUS: u16 = 401;

/// An authorization obtained from the permit sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit {
    /// The hub's `hashKey`.
    pub part: String,
    /// The EIP-712 signature it was issued for.
    pub signature: String,
}

impl<T: Transport, S: Signer> SessionClient<T, S> {
    /// Runs the full permit sequence (`createNonce`, `permitTypedMessage`,
    /// signature, `permit`) and stores the resulting [`Permit`].
    ///
    /// Can be re-run at any time to refresh a permit the hub no longer
    /// accepts; the previous one is replaced only on success.
    ///
    /// A 401 on `permitTypedMessage` is treated as the anti-bot
    /// challenge: one extra `createNonce` is issued (its outcome only
    /// logged) and the sequence still fails.
    ///
    /// # Errors
    /// - [`SessionError::Nonce`] — the hub refused the nonce
    /// - [`SessionError::PermitFlow`] — the typed message could not be
    ///   obtained or read
    /// - [`SessionError::Signing`] — the wallet refused the document
    /// - [`SessionError::PermitSubmission`] — the hub rejected the signature
    pub async fn authorize(&mut self) -> Result<&Permit, SessionError> {
        self.create_nonce().await?;
        let typed = self.request_typed_message().await?;
        pause_ms(500, "Successfully create permit").await;
        pause_ms(500, "Approving permit message").await;

        let signature = self.signer.sign_typed_data(&typed).await?;
        let part = self.submit_permit(&signature).await?;

        tracing::info!("permit granted");
        Ok(&*self.permit.insert(Permit { part, signature }))
    }

    /// Wraps a contract call with the owner and the current permit, the
    /// params shape every authorized `call` uses.
    ///
    /// # Errors
    /// - [`SessionError::PermitFlow`] — no permit has been obtained yet
    pub fn permitted_call(&self, call: &Value) -> Result<Value, SessionError> {
        let permit = self.permit.as_ref().ok_or_else(|| {
            SessionError::PermitFlow("no permit yet, authorize first".to_string())
        })?;
        Ok(json!({
            "call": call,
            "owner": self.owner(),
            "part": permit.part,
            "permit": permit.signature,
        }))
    }

    async fn request_typed_message(&mut self) -> Result<Value, SessionError> {
        pause_ms(1000, "Try to permit Sonic Arcade contract").await;

        let params = json!({ "owner": self.owner() });
        let response = match self.rpc.call(RpcMethod::PermitTypedMessage, params).await {
            Ok(response) => response,
            Err(e) if e.status() == Some(ANTI_BOT_STATUS) => {
                pause_ms(
                    4000,
                    "Failed to permit Sonic Arcade contract, maybe anti-bot protection, \
                     try to play the games on the website first",
                )
                .await;
                if let Err(nonce) = self.create_nonce().await {
                    tracing::warn!(error = %nonce, "nonce retry after anti-bot challenge failed");
                }
                return Err(SessionError::PermitFlow(e.to_string()));
            }
            Err(e) => return Err(SessionError::PermitFlow(e.to_string())),
        };

        if let Some(message) = response.error_message() {
            return Err(SessionError::PermitFlow(message.to_string()));
        }
        typed_document(&response)
    }

    async fn submit_permit(&mut self, signature: &str) -> Result<String, SessionError> {
        pause_ms(500, "Submitting contract permit").await;

        let params = json!({
            "owner": self.owner(),
            "signature": signature,
        });
        let response = self
            .rpc
            .call(RpcMethod::Permit, params)
            .await
            .map_err(|e| SessionError::PermitSubmission(e.to_string()))?;

        if let Some(message) = response.error_message() {
            return Err(SessionError::PermitSubmission(message.to_string()));
        }
        let part = match response.result_field("hashKey") {
            Some(Value::String(key)) => key.clone(),
            Some(other) => other.to_string(),
            None => {
                return Err(SessionError::PermitSubmission(
                    "response carried no hashKey".to_string(),
                ));
            }
        };

        pause_ms(500, "Permit submitted successfully").await;
        Ok(part)
    }
}

/// Extracts the EIP-712 document from a `permitTypedMessage` result.
///
/// `result.typedMessage` is a JSON *string*; the document itself sits
/// under its `json` member.
fn typed_document(response: &RpcResponse) -> Result<Value, SessionError> {
    let raw = response
        .result_field("typedMessage")
        .and_then(Value::as_str)
        .ok_or_else(|| SessionError::PermitFlow("response carried no typedMessage".to_string()))?;

    let mut parsed: Value = serde_json::from_str(raw)
        .map_err(|e| SessionError::PermitFlow(format!("typedMessage is not JSON: {e}")))?;

    match parsed.get_mut("json").map(Value::take) {
        Some(doc) if doc.is_object() => Ok(doc),
        _ => Err(SessionError::PermitFlow(
            "typedMessage has no json document".to_string(),
        )),
    }
}
