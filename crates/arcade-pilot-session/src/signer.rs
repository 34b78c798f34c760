//! Signing hook for the wallet behind an account.
//!
//! This crate doesn't derive keys or sign anything itself. Instead it
//! defines the [`Signer`] trait: an address plus two async signing
//! methods. The binary implements it with a local key; tests implement
//! it with canned signatures.
//!
//! # Why a trait?
//!
//! The permit flow only needs "give me a signature for this document".
//! Keeping that behind a trait lets us:
//! - sign with a local private key or mnemonic in production
//! - return fixed strings in tests, without any cryptography
//!
//! All without changing the session or permit code.

use std::future::Future;

use serde_json::Value;

use crate::SessionError;

/// Signs on behalf of one wallet.
///
/// # Trait bounds
///
/// - `Send + Sync` → the signer lives inside an account worker that
///   Tokio may poll from any thread.
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the account.
///
/// # Example
///
/// ```rust
/// use arcade_pilot_session::{SessionError, Signer};
/// use serde_json::Value;
///
/// /// Returns the same signature for everything. Tests only!
/// struct FixedSigner;
///
/// impl Signer for FixedSigner {
///     fn address(&self) -> &str {
///         "0x00000000000000000000000000000000000000aa"
///     }
///
///     async fn sign_message(&self, _message: &[u8]) -> Result<String, SessionError> {
///         Ok("0xmessage".into())
///     }
///
///     async fn sign_typed_data(&self, _typed: &Value) -> Result<String, SessionError> {
///         Ok("0xtyped".into())
///     }
/// }
/// ```
pub trait Signer: Send + Sync + 'static {
    /// The checksummed wallet address.
    fn address(&self) -> &str;

    /// EIP-191 personal-sign of raw bytes. Returns a `0x`-prefixed
    /// 65-byte hex signature.
    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<String, SessionError>> + Send;

    /// EIP-712 signature over a typed-data document
    /// (`{domain, types, message[, primaryType]}`).
    ///
    /// # Errors
    /// - `Err(SessionError::Signing)` — the document is not valid typed data
    fn sign_typed_data(
        &self,
        typed: &Value,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;
}
