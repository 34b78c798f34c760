//! Wallet profile outside the arcade: balance, airdrop user, referral.

use alloy::primitives::U256;
use alloy::primitives::utils::format_ether;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use arcade_pilot_protocol::RpcClient;
use arcade_pilot_transport::{HttpRequest, Transport};

use crate::PilotError;

/// An airdrop dashboard user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub invited_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct BatchItem<T> {
    result: BatchResult<T>,
}

#[derive(Deserialize)]
struct BatchResult<T> {
    data: BatchData<T>,
}

#[derive(Deserialize)]
struct BatchData<T> {
    json: T,
}

/// The message a wallet signs to join the airdrop through a referral.
pub fn referral_message(referrer_code: &str, address: &str) -> String {
    format!(
        "I'm joining Sonic Airdrop Dashboard with my wallet, have been referred by \
         {referrer_code}, and I agree to the terms and conditions.\nWallet address:\n{address}\n"
    )
}

/// Native balance of `address`, formatted in ether.
///
/// Issues `eth_getBalance` against the chain RPC at `rpc_url`.
///
/// # Errors
/// - [`PilotError::Balance`] — transport failure, RPC error, or a
///   result that is not a hex quantity
pub async fn get_balance<T: Transport>(
    transport: &T,
    rpc_url: &str,
    address: &str,
) -> Result<String, PilotError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_getBalance",
        "params": [address, "latest"],
    });
    let request = HttpRequest::post(rpc_url, body.to_string().into_bytes());
    let response = transport
        .send(request)
        .await
        .map_err(|e| PilotError::Balance(e.to_string()))?;

    let payload: Value =
        serde_json::from_slice(&response.body).map_err(|e| PilotError::Balance(e.to_string()))?;
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        return Err(PilotError::Balance(error.to_string()));
    }
    let quantity = payload
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| PilotError::Balance("missing result".to_string()))?;

    let wei = U256::from_str_radix(quantity.trim_start_matches("0x"), 16)
        .map_err(|e| PilotError::Balance(e.to_string()))?;
    Ok(format_ether(wei))
}

/// Looks up (or lazily creates) the airdrop user for `address`.
///
/// # Errors
/// - [`PilotError::UserLookup`] — request failed or the batch was empty
pub async fn find_user<T: Transport>(
    rpc: &RpcClient<T>,
    airdrop_url: &str,
    address: &str,
) -> Result<User, PilotError> {
    let input = json!({"0": {"json": {"address": address}}}).to_string();
    let url = Url::parse_with_params(
        &format!("{}/api/trpc/user.findOrCreate", airdrop_url.trim_end_matches('/')),
        &[("batch", "1"), ("input", input.as_str())],
    )
    .map_err(|e| PilotError::UserLookup(e.to_string()))?;

    let batch: Vec<BatchItem<User>> = rpc
        .get_json(url.as_str())
        .await
        .map_err(|e| PilotError::UserLookup(e.to_string()))?;

    batch
        .into_iter()
        .next()
        .map(|item| item.result.data.json)
        .ok_or_else(|| PilotError::UserLookup("empty batch response".to_string()))
}

/// Attaches `referrer_code` to the user at `address`.
///
/// # Errors
/// Any transport or decode failure, as [`PilotError::Protocol`].
pub async fn set_invited<T: Transport>(
    rpc: &RpcClient<T>,
    airdrop_url: &str,
    address: &str,
    referrer_code: &str,
    signature: &str,
) -> Result<(), PilotError> {
    let url = format!(
        "{}/api/trpc/user.setInvited?batch=1",
        airdrop_url.trim_end_matches('/')
    );
    let body = json!({
        "json": {
            "address": address,
            "invitedCode": referrer_code,
            "signature": signature,
        }
    });
    let _: Value = rpc.post_json(&url, &body).await?;
    Ok(())
}
