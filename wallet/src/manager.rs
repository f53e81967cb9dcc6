/// dApp Manager - Orchestration Layer
///
/// Wires the JSON-RPC provider, token contract and file storage into a
/// [`DappController`] and owns the background tasks feeding it.
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use vl_dapp::{
    BalanceSnapshot, DappController, Erc20Token, FormValidation, SubmitterState,
    TransactionIntent, TransactionReceipt, WalletProvider, WalletSession,
};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::rpc::{spawn_watcher, JsonRpcProvider};
use crate::storage::Storage;

/// Latest submission as shown by the receipt view
#[derive(Debug, Clone)]
pub struct LatestTransaction {
    pub state: SubmitterState,
    pub receipt: Option<TransactionReceipt>,
    pub explorer_url: Option<String>,
    pub error: Option<String>,
}

pub struct DappManager {
    pub config: WalletConfig,
    provider: Arc<JsonRpcProvider>,
    controller: Arc<DappController>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DappManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new() -> Self {
        // Load configuration from environment
        let config = WalletConfig::from_env();
        let storage = Storage::new_with_base_dir(config.storage_dir.clone());
        Self::with_config(config, storage)
    }

    /// Create DappManager with custom storage (for testing)
    pub fn new_with_storage(storage: Storage) -> Self {
        Self::with_config(WalletConfig::from_env(), storage)
    }

    pub fn with_config(config: WalletConfig, storage: Storage) -> Self {
        let provider = Arc::new(JsonRpcProvider::new(
            config.rpc_url.clone(),
            config.poll_interval,
        ));
        let token = Arc::new(Erc20Token::new(
            config.token_address,
            provider.clone() as Arc<dyn WalletProvider>,
        ));
        let controller = Arc::new(DappController::new(
            config.dapp_config(),
            provider.clone(),
            token,
            Arc::new(storage),
        ));

        Self {
            config,
            provider,
            controller,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn controller(&self) -> &Arc<DappController> {
        &self.controller
    }

    /// Restore the session and start watching the node
    pub async fn start(&self) -> WalletSession {
        let events = self.provider.subscribe();
        let controller = self.controller.clone();
        let event_loop = tokio::spawn(async move { controller.run_events(events).await });
        let watcher = spawn_watcher(&self.provider);

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(event_loop);
            tasks.push(watcher);
        }

        let session = self.controller.check_connection().await;
        log::info!(
            "Session restored: {}",
            session
                .short_address()
                .unwrap_or_else(|| "disconnected".to_string())
        );
        session
    }

    // ============================================================================
    // Session
    // ============================================================================

    pub fn session(&self) -> WalletSession {
        self.controller.session()
    }

    /// Re-reads the node instead of trusting the last watcher tick
    pub async fn check_connection(&self) -> WalletSession {
        self.controller.check_connection().await
    }

    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        Ok(self.controller.connect().await?)
    }

    pub async fn disconnect(&self) -> Result<WalletSession, WalletError> {
        Ok(self.controller.disconnect().await?)
    }

    pub fn explorer_address_url(&self) -> Option<String> {
        self.controller.explorer_address_url()
    }

    // ============================================================================
    // Balances
    // ============================================================================

    pub async fn balances(&self) -> BalanceSnapshot {
        self.controller.balances().await
    }

    pub async fn refresh_balances(&self) -> Result<BalanceSnapshot, WalletError> {
        if !self.session().is_connected() {
            return Err(WalletError::NotConnected);
        }
        Ok(self.controller.refresh_balances().await)
    }

    // ============================================================================
    // Transactions
    // ============================================================================

    pub async fn validate(
        &self,
        token_symbol: &str,
        destination: &str,
        amount: &str,
    ) -> FormValidation {
        self.controller
            .validate_form(token_symbol, destination, amount)
            .await
    }

    pub async fn submit(&self, intent: TransactionIntent) -> Result<TransactionReceipt, WalletError> {
        Ok(self.controller.submit(intent).await?)
    }

    /// Token symbol for mint / whitelist when the request names none
    pub fn token_symbol(&self) -> &str {
        &self.config.token_symbol
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        self.controller.explorer_tx_url(tx_hash)
    }

    pub async fn latest_transaction(&self) -> LatestTransaction {
        let receipt = self.controller.last_receipt().await;
        let explorer_url = receipt
            .as_ref()
            .map(|r| self.controller.explorer_tx_url(&r.transaction_hash));

        LatestTransaction {
            state: self.controller.submitter_state(),
            receipt,
            explorer_url,
            error: self.controller.last_error().await,
        }
    }
}

impl Default for DappManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DappManager {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.lock() {
            for task in tasks.iter() {
                task.abort();
            }
        }
    }
}
