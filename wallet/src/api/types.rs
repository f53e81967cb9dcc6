use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vl_dapp::{Network, SubmitterState, TransactionReceipt};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub connected: bool,
    pub loading: bool,
    pub address: Option<String>,
    pub short_address: Option<String>,
    pub network: Option<Network>,
    pub network_name: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub balances: BTreeMap<String, String>,
    pub whitelisted: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidateRequest {
    pub token_symbol: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SendRequest {
    pub token_symbol: String,
    pub destination: String,
    pub amount: String,
}

/// Mint / whitelist body; the configured token when omitted
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TokenActionRequest {
    #[serde(default)]
    pub token_symbol: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub receipt: TransactionReceiptView,
    pub explorer_url: String,
}

/// Wire form of [`TransactionReceipt`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceiptView {
    pub from: String,
    pub to: String,
    pub block_number: u64,
    pub cumulative_gas_used: String,
    pub transaction_hash: String,
    pub value: String,
}

impl From<TransactionReceipt> for TransactionReceiptView {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            from: receipt.from.to_string(),
            to: receipt.to.to_string(),
            block_number: receipt.block_number,
            cumulative_gas_used: receipt.cumulative_gas_used,
            transaction_hash: receipt.transaction_hash,
            value: receipt.value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestTransactionResponse {
    pub state: SubmitterState,
    pub receipt: Option<TransactionReceiptView>,
    pub explorer_url: Option<String>,
    pub error: Option<String>,
}
