//! Wire protocol for arcade-pilot.
//!
//! This crate defines the "language" spoken with the game hub:
//!
//! - **Types** ([`RpcRequest`], [`RpcResponse`], [`RpcMethod`]) —
//!   the JSON-RPC envelopes that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   converted to/from bytes.
//! - **Client** ([`RpcClient`]) — endpoint, owner headers, and the
//!   per-account [`RequestIds`] sequence.
//! - **Errors** ([`ProtocolError`]) — what can go wrong on the way.
//!
//! # Architecture
//!
//! ```text
//! Transport (HTTP) → Protocol (RpcResponse) → Session / Games (decisions)
//! ```

mod client;
mod codec;
mod error;
mod ids;
mod types;

pub use client::{NETWORK, RpcClient};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use ids::RequestIds;
pub use types::{
    DomainFailure, JSONRPC_VERSION, RpcErrorBody, RpcMethod, RpcRequest,
    RpcResponse,
};
