//! Codec trait and implementations for serializing/deserializing envelopes.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The RPC client doesn't care how envelopes are serialized; it just
//! needs something that implements the [`Codec`] trait.
//!
//! The backend only speaks JSON, so [`JsonCodec`] is the one
//! implementation. Tests use the same seam to inspect request bodies.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads (each account worker
///   may be polled on any thread of the Tokio pool).
/// - `'static` → the codec doesn't borrow temporary data.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the response buffer can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use arcade_pilot_protocol::{Codec, JsonCodec, RpcMethod, RpcRequest};
///
/// let codec = JsonCodec;
/// let request = RpcRequest::new(7, RpcMethod::CreateNonce, serde_json::json!({"owner": "0xabc"}));
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: RpcRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.id, 7);
/// assert_eq!(decoded.method, "createNonce");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
