//! JSON-RPC implementation of the ledger client.
//!
//! Covers the four read-side calls the pipeline needs: balance,
//! latest blockhash, current block height, and signature status.
//! Confirmation is a poll loop bounded by the checkpoint's expiry
//! height; a transaction the network dropped resolves to `Expired`
//! instead of hanging the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep;
use tracing::debug;

use crate::address::Address;
use crate::client::{ClientError, LedgerClient};
use crate::types::{Checkpoint, ConfirmStatus, SignatureId};

/// Default pause between signature-status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const COMMITMENT: &str = "finalized";

#[derive(Serialize)]
struct RpcRequest<P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Most read calls wrap their payload in a slot context.
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<String>,
    err: Option<serde_json::Value>,
}

/// What one status poll concluded; `None` means keep polling.
fn classify_status(
    status: Option<&SignatureStatus>,
    chain_height: u64,
    expiry_height: u64,
) -> Option<Result<ConfirmStatus, ClientError>> {
    if let Some(status) = status {
        if let Some(err) = &status.err {
            return Some(Err(ClientError::TransactionFailed(err.to_string())));
        }
        if status.confirmation_status.as_deref() == Some(COMMITMENT) {
            return Some(Ok(ConfirmStatus::Finalized));
        }
    }
    // Unknown or not-yet-final signature: once the chain passes the
    // checkpoint's validity window it can no longer land.
    if chain_height > expiry_height {
        return Some(Ok(ConfirmStatus::Expired));
    }
    None
}

/// `LedgerClient` over a JSON-RPC node endpoint.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    endpoint: String,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<T, ClientError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| ClientError::Network(format!("{method}: empty rpc result")))
    }

    async fn block_height(&self) -> Result<u64, ClientError> {
        self.call("getBlockHeight", json!([{ "commitment": COMMITMENT }]))
            .await
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn balance(&self, address: &Address) -> Result<u64, ClientError> {
        let result: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": COMMITMENT }]),
            )
            .await?;
        Ok(result.value)
    }

    async fn recent_checkpoint(&self) -> Result<Checkpoint, ClientError> {
        let result: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": COMMITMENT }]),
            )
            .await?;
        Ok(Checkpoint {
            blockhash: result.value.blockhash,
            last_valid_height: result.value.last_valid_block_height,
        })
    }

    async fn confirm(
        &self,
        signature: &SignatureId,
        expiry_height: u64,
    ) -> Result<ConfirmStatus, ClientError> {
        loop {
            let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
                .call(
                    "getSignatureStatuses",
                    json!([[signature.to_string()], { "searchTransactionHistory": false }]),
                )
                .await?;
            let status = statuses.value.first().and_then(|s| s.as_ref());

            let chain_height = self.block_height().await?;
            debug!(
                %signature,
                chain_height,
                expiry_height,
                status = ?status,
                "confirmation poll"
            );

            if let Some(outcome) = classify_status(status, chain_height, expiry_height) {
                return outcome;
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(confirmation: Option<&str>, err: Option<serde_json::Value>) -> SignatureStatus {
        SignatureStatus {
            confirmation_status: confirmation.map(str::to_string),
            err,
        }
    }

    // ==================== classify_status tests ====================

    #[test]
    fn test_classify_finalized() {
        let s = status(Some("finalized"), None);
        assert_eq!(
            classify_status(Some(&s), 10, 100),
            Some(Ok(ConfirmStatus::Finalized))
        );
    }

    #[test]
    fn test_classify_pending_keeps_polling() {
        let s = status(Some("confirmed"), None);
        assert_eq!(classify_status(Some(&s), 10, 100), None);
        assert_eq!(classify_status(None, 10, 100), None);
    }

    #[test]
    fn test_classify_expired_when_height_passes_window() {
        assert_eq!(classify_status(None, 101, 100), Some(Ok(ConfirmStatus::Expired)));
        // boundary: the expiry height itself is still inside the window
        assert_eq!(classify_status(None, 100, 100), None);
    }

    #[test]
    fn test_classify_onchain_error_is_terminal() {
        let s = status(Some("finalized"), Some(json!({"InstructionError": [0, "Custom"]})));
        assert!(matches!(
            classify_status(Some(&s), 10, 100),
            Some(Err(ClientError::TransactionFailed(_)))
        ));
    }

    // ==================== wire shape tests ====================

    #[test]
    fn test_latest_blockhash_deserializes() {
        let body = r#"{
            "result": {
                "context": { "slot": 2792 },
                "value": {
                    "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                    "lastValidBlockHeight": 3090
                }
            }
        }"#;
        let envelope: RpcEnvelope<WithContext<LatestBlockhash>> =
            serde_json::from_str(body).unwrap();
        let value = envelope.result.unwrap().value;
        assert_eq!(value.blockhash, "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N");
        assert_eq!(value.last_valid_block_height, 3090);
    }

    #[test]
    fn test_signature_statuses_deserialize_with_null_slot() {
        let body = r#"{
            "result": {
                "context": { "slot": 82 },
                "value": [
                    { "slot": 72, "confirmations": null, "err": null,
                      "confirmationStatus": "finalized" },
                    null
                ]
            }
        }"#;
        let envelope: RpcEnvelope<WithContext<Vec<Option<SignatureStatus>>>> =
            serde_json::from_str(body).unwrap();
        let value = envelope.result.unwrap().value;
        assert_eq!(value.len(), 2);
        assert_eq!(
            value[0].as_ref().unwrap().confirmation_status.as_deref(),
            Some("finalized")
        );
        assert!(value[1].is_none());
    }

    #[test]
    fn test_rpc_error_body_deserializes() {
        let body = r#"{
            "error": { "code": -32602, "message": "Invalid param" }
        }"#;
        let envelope: RpcEnvelope<WithContext<u64>> = serde_json::from_str(body).unwrap();
        let err = envelope.error.unwrap();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Invalid param");
    }
}
