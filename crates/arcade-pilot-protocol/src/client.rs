//! The JSON-RPC client every backend call goes through.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use arcade_pilot_transport::{HttpRequest, HttpResponse, Transport};

use crate::{Codec, JsonCodec, ProtocolError, RequestIds, RpcMethod, RpcRequest, RpcResponse};

/// Value of the `network` header the hub expects.
pub const NETWORK: &str = "SONIC";

/// Sends JSON-RPC envelopes to the hub on behalf of one wallet.
///
/// Owns the account's [`RequestIds`]: every [`call`](Self::call) takes
/// the next id before anything touches the network, so failed calls
/// advance the sequence too. Plain GET/POST helpers for the non-RPC
/// endpoints (points, user lookup) do not consume ids.
pub struct RpcClient<T: Transport, C: Codec = JsonCodec> {
    transport: T,
    codec: C,
    endpoint: String,
    owner: String,
    ids: RequestIds,
}

impl<T: Transport> RpcClient<T> {
    /// Creates a client using [`JsonCodec`].
    pub fn new(
        transport: T,
        endpoint: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self::with_codec(transport, JsonCodec, endpoint, owner)
    }
}

impl<T: Transport, C: Codec> RpcClient<T, C> {
    pub fn with_codec(
        transport: T,
        codec: C,
        endpoint: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            codec,
            endpoint: endpoint.into(),
            owner: owner.into(),
            ids: RequestIds::new(),
        }
    }

    /// The wallet address sent as `X-Owner`.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn ids(&self) -> &RequestIds {
        &self.ids
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues one JSON-RPC call.
    ///
    /// A 2xx answer without a JSON body decodes as an empty success,
    /// which is how the hub behaves for some acknowledgements.
    ///
    /// # Errors
    /// - [`ProtocolError::Transport`] — non-2xx or no response
    /// - [`ProtocolError::Decode`] — JSON that is not an envelope
    pub async fn call(
        &mut self,
        method: RpcMethod,
        params: Value,
    ) -> Result<RpcResponse, ProtocolError> {
        let id = self.ids.next_id();
        let request = RpcRequest::new(id, method, params);
        let body = self.codec.encode(&request)?;

        tracing::debug!(%method, id, "rpc call");
        let http = HttpRequest::post(&self.endpoint, body)
            .header("network", NETWORK)
            .header("pragma", "no-cache")
            .header("priority", "u=1, i")
            .header("X-Owner", &self.owner);

        let response = self.transport.send(http).await?;
        if !response.is_json() {
            tracing::debug!(
                %method,
                id,
                body = %response.text(),
                "non-JSON rpc response treated as empty success"
            );
            return Ok(RpcResponse::default());
        }
        self.codec.decode(&response.body)
    }

    /// GETs a JSON document from a non-RPC endpoint.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<R, ProtocolError> {
        let response = self.transport.send(HttpRequest::get(url)).await?;
        self.expect_json(response)
    }

    /// POSTs a JSON document to a non-RPC endpoint.
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, ProtocolError> {
        let body = self.codec.encode(body)?;
        let response = self.transport.send(HttpRequest::post(url, body)).await?;
        self.expect_json(response)
    }

    fn expect_json<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<R, ProtocolError> {
        if !response.is_json() {
            return Err(ProtocolError::InvalidMessage(format!(
                "expected a JSON body, got: {}",
                response.text()
            )));
        }
        self.codec.decode(&response.body)
    }
}
