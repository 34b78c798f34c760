//! Local wallet: key detection and alloy-backed signing.

use std::collections::HashSet;

use alloy::dyn_abi::TypedData;
use alloy::primitives::hex;
use alloy::signers::Signer as AlloySigner;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use serde_json::Value;

use arcade_pilot_session::{SessionError, Signer};

use crate::PilotError;

/// What kind of secret an account was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    PrivateKey,
    Mnemonic,
}

/// Tells a private key from a mnemonic.
///
/// A private key is exactly 64 hex digits, with or without `0x`. A
/// mnemonic is 12 or 24 whitespace-separated words.
///
/// # Errors
/// - [`PilotError::InvalidKey`] — neither shape matches
pub fn detect_key(secret: &str) -> Result<KeyKind, PilotError> {
    let secret = secret.trim();
    let hex_part = secret.strip_prefix("0x").unwrap_or(secret);
    if hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(KeyKind::PrivateKey);
    }

    let words = secret.split_whitespace().count();
    if (words == 12 || words == 24)
        && secret
            .split_whitespace()
            .all(|w| w.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Ok(KeyKind::Mnemonic);
    }

    Err(PilotError::InvalidKey(redact(secret)))
}

/// Keeps a hint of the secret for logs without leaking it.
fn redact(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    format!("{head}… ({} chars)", secret.chars().count())
}

/// A wallet whose key lives in this process.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    address: String,
    kind: KeyKind,
}

impl LocalWallet {
    /// Builds a wallet from a private key or a mnemonic (first account of
    /// the default derivation path).
    ///
    /// # Errors
    /// - [`PilotError::InvalidKey`] — unrecognised shape, or a key the
    ///   curve rejects
    pub fn from_secret(secret: &str) -> Result<Self, PilotError> {
        let kind = detect_key(secret)?;
        let secret = secret.trim();
        let signer = match kind {
            KeyKind::PrivateKey => {
                let hex_part = secret.strip_prefix("0x").unwrap_or(secret);
                hex_part
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| PilotError::InvalidKey(e.to_string()))?
            }
            KeyKind::Mnemonic => MnemonicBuilder::<English>::default()
                .phrase(secret)
                .index(0)
                .map_err(|e| PilotError::InvalidKey(e.to_string()))?
                .build()
                .map_err(|e| PilotError::InvalidKey(e.to_string()))?,
        };
        let address = signer.address().to_checksum(None);
        Ok(Self {
            signer,
            address,
            kind,
        })
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }
}

impl Signer for LocalWallet {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, SessionError> {
        let signature = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }

    async fn sign_typed_data(&self, typed: &Value) -> Result<String, SessionError> {
        let typed = parse_typed_data(typed)?;
        let signature = self
            .signer
            .sign_dynamic_typed_data(&typed)
            .await
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }
}

/// Reads an EIP-712 document, inferring `primaryType` when the backend
/// leaves it out: the one struct no other struct refers to.
fn parse_typed_data(doc: &Value) -> Result<TypedData, SessionError> {
    let mut doc = doc.clone();
    if doc.get("primaryType").is_none() {
        let primary = infer_primary_type(&doc)
            .ok_or_else(|| SessionError::Signing("cannot infer primaryType".to_string()))?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("primaryType".to_string(), Value::String(primary));
        }
    }
    serde_json::from_value(doc).map_err(|e| SessionError::Signing(format!("bad typed data: {e}")))
}

fn infer_primary_type(doc: &Value) -> Option<String> {
    let types = doc.get("types")?.as_object()?;
    let referenced: HashSet<&str> = types
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|field| field.get("type").and_then(Value::as_str))
        .map(|ty| ty.trim_end_matches("[]"))
        .collect();

    let mut roots = types
        .keys()
        .filter(|name| name.as_str() != "EIP712Domain" && !referenced.contains(name.as_str()));
    let primary = roots.next()?;
    roots.next().is_none().then(|| primary.clone())
}
