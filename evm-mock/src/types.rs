/// Ethereum JSON-RPC wire types
///
/// Field names match what wallets and nodes put on the wire so clients can
/// consume them transparently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn default_version() -> String {
    "2.0".to_string()
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Transaction object of `eth_sendTransaction` / `eth_call`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionCall {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    /// Newer clients send calldata as `input`
    #[serde(default)]
    pub input: Option<String>,
}

impl TransactionCall {
    pub fn calldata(&self) -> Option<&str> {
        self.input.as_deref().or(self.data.as_deref())
    }
}

/// Receipt from `eth_getTransactionReceipt`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub transaction_hash: String,
    pub from: String,
    pub to: Option<String>,
    pub block_number: String,
    pub cumulative_gas_used: String,
    pub gas_used: String,
    /// `0x1` success, `0x0` reverted
    pub status: String,
}

// ============================================================================
// Mock control endpoints (not part of the Ethereum JSON-RPC API)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SwitchChainRequest {
    pub chain_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MockStatus {
    pub chain_id: u64,
    pub block_number: u64,
    pub authorized: bool,
}
