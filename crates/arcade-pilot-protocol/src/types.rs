//! Core protocol types for the backend's JSON-RPC wire format.
//!
//! Every call to the hub endpoint is a JSON-RPC 2.0 envelope:
//!
//! ```text
//! → {"jsonrpc":"2.0","id":3,"method":"createNonce","params":{"owner":"0x…"}}
//! ← {"jsonrpc":"2.0","id":3,"result":{…}}              (success)
//! ← {"jsonrpc":"2.0","id":3,"error":{"message":"…"}}   (failure)
//! ```
//!
//! Failures are free text. Some "successful" `call` results still carry a
//! domain-level failure under `result.hash.errorTypes`; see
//! [`RpcResponse::domain_failure`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON-RPC version string every request carries.
pub const JSONRPC_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// RpcMethod
// ---------------------------------------------------------------------------

/// Methods the hub endpoint understands.
///
/// An enum instead of loose strings means a typo is a compile error, and
/// `match` forces every caller to think about every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    CreateSession,
    CreateNonce,
    PermitTypedMessage,
    Permit,
    /// Generic contract invocation: every game play goes through this.
    Call,
    Refund,
    ReIterate,
}

impl RpcMethod {
    /// The method name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSession => "createSession",
            Self::CreateNonce => "createNonce",
            Self::PermitTypedMessage => "permitTypedMessage",
            Self::Permit => "permit",
            Self::Call => "call",
            Self::Refund => "refund",
            Self::ReIterate => "reIterate",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RpcRequest
// ---------------------------------------------------------------------------

/// An outbound JSON-RPC envelope.
///
/// `params` stays a `serde_json::Value` because every method has its own
/// parameter shape, and several of them are passed through opaquely
/// (game call payloads come straight from configuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: RpcMethod, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.as_str().to_string(),
            params,
        }
    }
}

// ---------------------------------------------------------------------------
// RpcResponse
// ---------------------------------------------------------------------------

/// The `error` member of a failed response.
///
/// Only `message` matters to callers: the backend's codes are not
/// stable, its messages are what recovery decisions key off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// An inbound JSON-RPC envelope.
///
/// Every field is optional on purpose. `#[serde(default)]` makes a missing
/// member deserialize as `None`, and an explicit `"error": null` does the
/// same, so `{"error": null}` counts as success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

/// A domain-level failure reported inside a successful `call` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    /// `result.hash.actualError.details`, rendered as text.
    pub details: String,
}

impl RpcResponse {
    /// A response with the given `result` and no error.
    pub fn ok(result: Value) -> Self {
        Self {
            id: None,
            result: Some(result),
            error: None,
        }
    }

    /// A response carrying an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            result: None,
            error: Some(RpcErrorBody {
                message: message.into(),
                ..RpcErrorBody::default()
            }),
        }
    }

    /// `true` when the envelope carries no `error` member.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The backend's error text, if the call failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Looks up a member of `result`.
    pub fn result_field(&self, key: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.get(key))
    }

    /// Reports `result.hash.errorTypes`, the backend's way of saying
    /// "the transaction went through but the game action failed".
    ///
    /// A `null` `errorTypes` counts as absent.
    pub fn domain_failure(&self) -> Option<DomainFailure> {
        let hash = self.result_field("hash")?;
        match hash.get("errorTypes") {
            None | Some(Value::Null) => None,
            Some(_) => {
                let details = hash
                    .get("actualError")
                    .and_then(|e| e.get("details"))
                    .map(|d| match d {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                Some(DomainFailure { details })
            }
        }
    }
}
