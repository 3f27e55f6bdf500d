//! Wallet JSON-RPC client
//!
//! Talks to a wallet that exposes the EIP-1193 request interface as
//! JSON-RPC 2.0 over HTTP (Frame serves this on port 1248, a dev node on
//! 8545). The wallet prompts the user for account access and signatures;
//! this client never sees a key.

use async_trait::async_trait;
use flowstream::{
    parse_address, Address, Receipt, StreamError, TransactionRequest, TransactionSigner,
    WalletProvider,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// EIP-1193 provider error codes.
const USER_REJECTED: i64 = 4001;
const UNAUTHORIZED: i64 = 4100;
const DISCONNECTED: i64 = 4900;
const CHAIN_DISCONNECTED: i64 = 4901;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },
}

impl ClientError {
    pub fn http(status: u16) -> Self {
        let message = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown Error",
        };
        Self::Http(status, message.to_string())
    }
}

impl From<ClientError> for StreamError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rpc { code, .. } if code == USER_REJECTED => StreamError::UserRejected,
            ClientError::Rpc { code, message, .. }
                if matches!(code, UNAUTHORIZED | DISCONNECTED | CHAIN_DISCONNECTED) =>
            {
                StreamError::WalletUnavailable(message)
            }
            ClientError::Rpc {
                code,
                message,
                data,
            } => StreamError::Rpc {
                code,
                message,
                data,
            },
            other => StreamError::WalletUnavailable(other.to_string()),
        }
    }
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[allow(dead_code)]
    id: Option<serde_json::Value>,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Revert data arrives either as a bare hex string or nested as
/// `{"data": "0x..."}` depending on the node.
fn revert_data(data: Option<serde_json::Value>) -> Option<String> {
    match data? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(map) => map
            .get("data")
            .and_then(|d| d.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Parse a hex quantity like `"0x2a"`.
fn parse_quantity(value: &serde_json::Value) -> Result<u64, ClientError> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::InvalidResponse(format!("expected hex quantity, got {}", value)))?;
    let digits = s.trim_start_matches("0x");
    u64::from_str_radix(digits, 16)
        .map_err(|_| ClientError::InvalidResponse(format!("bad hex quantity {}", s)))
}

fn parse_accounts(value: serde_json::Value) -> Result<Vec<Address>, ClientError> {
    let raw: Vec<String> = serde_json::from_value(value)
        .map_err(|e| ClientError::InvalidResponse(format!("accounts: {}", e)))?;
    raw.iter()
        .map(|a| parse_address(a).map_err(|e| ClientError::InvalidResponse(e.to_string())))
        .collect()
}

/// `None` while the transaction is still pending.
fn parse_receipt(value: serde_json::Value) -> Result<Option<Receipt>, ClientError> {
    if value.is_null() {
        return Ok(None);
    }

    let transaction_hash = value
        .get("transactionHash")
        .and_then(|h| h.as_str())
        .ok_or_else(|| ClientError::InvalidResponse("receipt without transactionHash".into()))?
        .to_string();
    let block_number = value
        .get("blockNumber")
        .filter(|b| !b.is_null())
        .map(parse_quantity)
        .transpose()?;
    // Pre-Byzantium receipts carry no status; treat as success.
    let success = match value.get("status") {
        Some(status) if !status.is_null() => parse_quantity(status)? == 1,
        _ => true,
    };

    Ok(Some(Receipt {
        transaction_hash,
        block_number,
        success,
    }))
}

#[derive(Debug, Clone)]
pub struct RpcWallet {
    rpc_endpoint: String,
    client: Client,
    poll_interval: Duration,
}

impl RpcWallet {
    /// `endpoint` is a full `http(s)://` URL, as produced by
    /// `Config::wallet_endpoint`.
    pub fn new(endpoint: &str, poll_interval: Duration) -> Result<Self, ClientError> {
        let rpc_endpoint = endpoint.to_string();

        // No overall request timeout: account and signature requests wait on
        // the user.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        log::info!("📡 Wallet JSON-RPC client initialized: {}", rpc_endpoint);

        Ok(Self {
            rpc_endpoint,
            client,
            poll_interval,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.rpc_endpoint
    }

    /// Send a JSON-RPC 2.0 request and return the result
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method: method.to_string(),
            params,
        };

        log::debug!("→ RPC {}: {}", method, request.params);

        let response = self
            .client
            .post(&self.rpc_endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse JSON-RPC response: {}", e))
        })?;

        if let Some(error) = rpc_response.error {
            log::debug!("← RPC {} error {}: {}", method, error.code, error.message);
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
                data: revert_data(error.data),
            });
        }

        // `eth_getTransactionReceipt` legitimately answers `null`
        Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
    }

    async fn broadcast(&self, tx: &TransactionRequest) -> Result<String, ClientError> {
        let result = self
            .rpc_call(
                "eth_sendTransaction",
                serde_json::json!([{
                    "from": tx.from,
                    "to": tx.to,
                    "data": tx.data_hex(),
                }]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidResponse("eth_sendTransaction: no hash".into()))
    }

    async fn wait_for_receipt(&self, hash: &str) -> Result<Receipt, ClientError> {
        loop {
            let result = self
                .rpc_call("eth_getTransactionReceipt", serde_json::json!([hash]))
                .await?;
            if let Some(receipt) = parse_receipt(result)? {
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, StreamError> {
        let result = self
            .rpc_call("eth_requestAccounts", serde_json::json!([]))
            .await?;
        Ok(parse_accounts(result)?)
    }

    async fn chain_id(&self) -> Result<u64, StreamError> {
        let result = self.rpc_call("eth_chainId", serde_json::json!([])).await?;
        Ok(parse_quantity(&result)?)
    }

    fn signer(&self) -> Arc<dyn TransactionSigner> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl TransactionSigner for RpcWallet {
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<Receipt, StreamError> {
        let hash = self.broadcast(tx).await?;
        log::info!("📤 Transaction sent: {}", hash);
        let receipt = self.wait_for_receipt(&hash).await?;
        log::info!(
            "⛏️ Transaction {} mined in block {:?}",
            receipt.transaction_hash,
            receipt.block_number
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_client_creation() {
        let wallet = RpcWallet::new("http://127.0.0.1:1248", Duration::from_secs(1)).unwrap();
        assert_eq!(wallet.endpoint(), "http://127.0.0.1:1248");
    }

    #[test]
    fn test_error_mapping() {
        let rejected = ClientError::Rpc {
            code: 4001,
            message: "User rejected the request.".into(),
            data: None,
        };
        assert_eq!(StreamError::from(rejected), StreamError::UserRejected);

        let disconnected = ClientError::Rpc {
            code: 4900,
            message: "Disconnected".into(),
            data: None,
        };
        assert!(matches!(
            StreamError::from(disconnected),
            StreamError::WalletUnavailable(_)
        ));

        let reverted = ClientError::Rpc {
            code: 3,
            message: "execution reverted".into(),
            data: Some("0x5a32bf24".into()),
        };
        assert_eq!(
            StreamError::from(reverted),
            StreamError::Rpc {
                code: 3,
                message: "execution reverted".into(),
                data: Some("0x5a32bf24".into()),
            }
        );

        assert!(matches!(
            StreamError::from(ClientError::http(503)),
            StreamError::WalletUnavailable(_)
        ));
    }

    #[test]
    fn test_revert_data_shapes() {
        assert_eq!(revert_data(Some(json!("0xabcd"))), Some("0xabcd".to_string()));
        assert_eq!(
            revert_data(Some(json!({"data": "0x1234", "message": "reverted"}))),
            Some("0x1234".to_string())
        );
        assert_eq!(revert_data(Some(json!(42))), None);
        assert_eq!(revert_data(None), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("0x2a")).unwrap(), 42);
        assert_eq!(parse_quantity(&json!("0x1")).unwrap(), 1);
        assert!(parse_quantity(&json!(42)).is_err());
        assert!(parse_quantity(&json!("0xzz")).is_err());
    }

    #[test]
    fn test_parse_accounts() {
        let accounts = parse_accounts(json!([
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
        ]))
        .unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0], Address::repeat_byte(0xaa));

        assert!(parse_accounts(json!(["not-an-address"])).is_err());
        assert!(parse_accounts(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_receipt() {
        assert_eq!(parse_receipt(json!(null)).unwrap(), None);

        let mined = parse_receipt(json!({
            "transactionHash": "0xfeed",
            "blockNumber": "0x10",
            "status": "0x1"
        }))
        .unwrap()
        .unwrap();
        assert_eq!(mined.transaction_hash, "0xfeed");
        assert_eq!(mined.block_number, Some(16));
        assert!(mined.success);

        let failed = parse_receipt(json!({
            "transactionHash": "0xbad",
            "blockNumber": "0x11",
            "status": "0x0"
        }))
        .unwrap()
        .unwrap();
        assert!(!failed.success);

        assert!(parse_receipt(json!({"status": "0x1"})).is_err());
    }
}
