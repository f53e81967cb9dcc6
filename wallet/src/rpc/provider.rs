use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use vl_dapp::abi;
use vl_dapp::{
    Address, DappError, Network, ProviderEvent, RawReceipt, TransactionRequest, TxHash,
    WalletProvider, U256,
};

use super::client::RpcClient;

const USER_REJECTED: i64 = 4001;
const METHOD_NOT_FOUND: i64 = -32601;
const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    from: String,
    to: Option<String>,
    block_number: String,
    cumulative_gas_used: String,
    /// Absent on pre-Byzantium receipts
    status: Option<String>,
}

impl RpcReceipt {
    fn into_raw(self) -> Result<RawReceipt, DappError> {
        Ok(RawReceipt {
            transaction_hash: parse_tx_hash(&self.transaction_hash)?,
            from: node_address(&self.from)?,
            to: self.to.as_deref().map(node_address).transpose()?,
            block_number: abi::parse_u64_quantity(&self.block_number)?,
            cumulative_gas_used: abi::parse_u64_quantity(&self.cumulative_gas_used)?,
            success: self.status.as_deref() != Some("0x0"),
        })
    }
}

/// Nodes commonly return lowercase addresses, so no checksum is enforced
fn node_address(value: &str) -> Result<Address, DappError> {
    value
        .parse()
        .map_err(|_| DappError::invalid_response(format!("bad address from node: {}", value)))
}

fn node_addresses(values: Vec<String>) -> Result<Vec<Address>, DappError> {
    values.iter().map(|v| node_address(v)).collect()
}

fn parse_tx_hash(value: &str) -> Result<TxHash, DappError> {
    value
        .parse()
        .map_err(|e| DappError::invalid_response(format!("bad tx hash {}: {}", value, e)))
}

/// Wallet provider backed by an Ethereum node's JSON-RPC interface
///
/// Accounts are whatever the node exposes through `eth_accounts`; signing
/// happens node-side via `eth_sendTransaction`.
pub struct JsonRpcProvider {
    rpc: RpcClient,
    poll_interval: Duration,
    events: broadcast::Sender<ProviderEvent>,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            rpc: RpcClient::new(url),
            poll_interval,
            events,
        }
    }

    pub fn url(&self) -> &str {
        self.rpc.url()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn emit(&self, event: ProviderEvent) {
        log::debug!("Provider event: {:?}", event);
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<RawReceipt>, DappError> {
        let receipt: Option<RpcReceipt> = self
            .rpc
            .request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;
        receipt.map(RpcReceipt::into_raw).transpose()
    }
}

fn tx_object(tx: &TransactionRequest) -> Value {
    let mut object = json!({
        "to": tx.to.to_checksum(None),
    });
    if let Some(from) = tx.from {
        object["from"] = json!(from.to_checksum(None));
    }
    if !tx.value.is_zero() {
        object["value"] = json!(abi::to_quantity(tx.value));
    }
    if !tx.data.is_empty() {
        object["data"] = json!(abi::to_hex_data(&tx.data));
    }
    object
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        let accounts: Vec<String> = match self.rpc.request("eth_requestAccounts", json!([])).await {
            Ok(accounts) => accounts,
            // plain nodes expose unlocked accounts without a permission prompt
            Err(DappError::Rpc { code: METHOD_NOT_FOUND, .. }) => {
                self.rpc.request("eth_accounts", json!([])).await?
            }
            Err(DappError::Rpc { code: USER_REJECTED, message }) => {
                return Err(DappError::AccessRejected(message));
            }
            Err(e) => return Err(e),
        };
        node_addresses(accounts)
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, DappError> {
        let accounts: Vec<String> = self.rpc.request("eth_accounts", json!([])).await?;
        node_addresses(accounts)
    }

    async fn signer_address(&self) -> Result<Address, DappError> {
        self.list_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(DappError::NotConnected)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, DappError> {
        let balance: String = self
            .rpc
            .request("eth_getBalance", json!([address.to_checksum(None), "latest"]))
            .await?;
        abi::parse_quantity(&balance)
    }

    async fn get_network(&self) -> Result<Network, DappError> {
        let chain_id: String = self.rpc.request("eth_chainId", json!([])).await?;
        Ok(Network::from_chain_id(abi::parse_u64_quantity(&chain_id)?))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DappError> {
        let hash: String = self
            .rpc
            .request("eth_sendTransaction", json!([tx_object(&tx)]))
            .await?;
        log::info!("📤 Broadcast {} to {}", hash, tx.to);
        parse_tx_hash(&hash)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Vec<u8>, DappError> {
        let output: String = self
            .rpc
            .request("eth_call", json!([tx_object(&tx), "latest"]))
            .await?;
        abi::parse_hex_data(&output)
    }

    /// Polls until the node reports a receipt; bounding the wait is the
    /// caller's job
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<RawReceipt, DappError> {
        loop {
            if let Some(receipt) = self.receipt(&tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Polls chain id and accounts, emitting provider events on change
///
/// The first successful chain id read emits `NetworkChanged` with no
/// previous network. Stops once the provider is dropped.
pub fn spawn_watcher(provider: &Arc<JsonRpcProvider>) -> JoinHandle<()> {
    let weak: Weak<JsonRpcProvider> = Arc::downgrade(provider);
    let interval = provider.poll_interval;

    tokio::spawn(async move {
        let mut network: Option<Network> = None;
        let mut accounts: Option<Vec<Address>> = None;

        loop {
            let Some(provider) = weak.upgrade() else {
                log::debug!("Provider dropped, stopping watcher");
                break;
            };

            match provider.get_network().await {
                Ok(current) if network.as_ref() != Some(&current) => {
                    log::info!("🌐 Network is now {}", current);
                    let old = network.replace(current.clone());
                    provider.emit(ProviderEvent::NetworkChanged { new: current, old });
                }
                Ok(_) => {}
                Err(e) => log::debug!("Watcher could not read chain id: {}", e),
            }

            match provider.list_accounts().await {
                Ok(current) => {
                    if accounts.as_ref().is_some_and(|known| *known != current) {
                        log::info!("👛 Accounts changed ({} exposed)", current.len());
                        provider.emit(ProviderEvent::AccountsChanged(current.clone()));
                    }
                    accounts = Some(current);
                }
                Err(e) => log::debug!("Watcher could not list accounts: {}", e),
            }

            drop(provider);
            tokio::time::sleep(interval).await;
        }
    })
}
