//! dApp controller - orchestration layer
//!
//! Single owner of the session, balances and the latest transaction
//! outcome. Views read from it and route every user action through it.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};

use crate::balance::{BalanceBook, BalanceFetcher, BalanceSnapshot};
use crate::config::DappConfig;
use crate::error::DappError;
use crate::network::{Network, DEFAULT_EXPLORER};
use crate::provider::{ProviderEvent, WalletProvider};
use crate::session::{SessionTracker, WalletSession};
use crate::storage::KeyValueStore;
use crate::submitter::{
    SubmissionOutcome, SubmitterState, TransactionIntent, TransactionKind, TransactionReceipt,
    TransactionSubmitter,
};
use crate::token::TokenContract;
use crate::validation;
use crate::Result;

/// Whether the send form may be submitted, field by field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormValidation {
    pub destination_valid: bool,
    pub amount_valid: bool,
    pub can_submit: bool,
}

pub struct DappController {
    config: DappConfig,
    tracker: SessionTracker,
    fetcher: BalanceFetcher,
    balances: BalanceBook,
    submitter: TransactionSubmitter,
    last_receipt: RwLock<Option<TransactionReceipt>>,
    last_error: RwLock<Option<String>>,
}

impl DappController {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new(
        config: DappConfig,
        provider: Arc<dyn WalletProvider>,
        token: Arc<dyn TokenContract>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let fetcher = BalanceFetcher::new(
            provider.clone(),
            token.clone(),
            config.native.clone(),
            config.token.clone(),
        );
        let submitter = TransactionSubmitter::new(provider.clone(), token, config.clone());

        Self {
            tracker: SessionTracker::new(provider, store),
            fetcher,
            balances: BalanceBook::new(),
            submitter,
            last_receipt: RwLock::new(None),
            last_error: RwLock::new(None),
            config,
        }
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    // ============================================================================
    // Session (delegates to SessionTracker)
    // ============================================================================

    pub fn session(&self) -> WalletSession {
        self.tracker.current()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<WalletSession> {
        self.tracker.subscribe()
    }

    pub async fn check_connection(&self) -> WalletSession {
        let session = self.tracker.check_connection().await;
        self.sync_balances(&session).await;
        session
    }

    pub async fn connect(&self) -> Result<WalletSession> {
        let result = self.tracker.connect().await;
        self.sync_balances(&self.session()).await;
        result
    }

    pub async fn disconnect(&self) -> Result<WalletSession> {
        let session = self.tracker.disconnect().await?;
        self.sync_balances(&session).await;
        Ok(session)
    }

    pub async fn handle_event(&self, event: ProviderEvent) -> Option<WalletSession> {
        let session = self.tracker.handle_event(event).await?;
        self.sync_balances(&session).await;
        Some(session)
    }

    /// Applies provider events until the provider goes away
    pub async fn run_events(&self, mut events: broadcast::Receiver<ProviderEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_event(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Missed {} provider events, re-checking connection", missed);
                    self.check_connection().await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    log::info!("Provider event stream closed");
                    break;
                }
            }
        }
    }

    // ============================================================================
    // Balances (delegates to BalanceFetcher)
    // ============================================================================

    pub async fn balances(&self) -> BalanceSnapshot {
        self.balances.current().await
    }

    pub async fn refresh_balances(&self) -> BalanceSnapshot {
        let tagged = self.fetcher.fetch_tagged(&self.session()).await;
        self.balances.apply(tagged).await;
        self.balances.current().await
    }

    /// Refetches for a connected session, clears for a disconnected one
    async fn sync_balances(&self, session: &WalletSession) {
        if session.is_connected() {
            self.refresh_balances().await;
        } else {
            let tagged = self.fetcher.fetch_tagged(session).await;
            self.balances.apply(tagged).await;
        }
    }

    // ============================================================================
    // Validation
    // ============================================================================

    pub async fn validate_form(&self, symbol: &str, destination: &str, amount: &str) -> FormValidation {
        let session = self.session();
        let own = session.address().map(|a| a.to_string()).unwrap_or_default();
        let destination_valid = validation::is_valid_destination(destination, &own);

        let amount_valid = match self.config.asset(symbol) {
            Some(asset) => {
                let balances = self.balances().await;
                validation::is_valid_amount_with_decimals(
                    amount,
                    balances.amount(&asset.symbol),
                    asset.decimals,
                )
            }
            None => false,
        };

        let can_submit = destination_valid
            && amount_valid
            && session.is_connected()
            && self.submitter.state() != SubmitterState::Submitting
            && self.check_network(&session).is_ok();

        FormValidation {
            destination_valid,
            amount_valid,
            can_submit,
        }
    }

    fn check_network(&self, session: &WalletSession) -> Result<()> {
        let Some(expected) = self.config.expected_network.as_deref() else {
            return Ok(());
        };
        match session.network() {
            Some(network) if network.matches(expected) => Ok(()),
            other => Err(DappError::WrongNetwork {
                expected: expected.to_string(),
                actual: other
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    // ============================================================================
    // Transactions (delegates to TransactionSubmitter)
    // ============================================================================

    /// Gates, submits and records the outcome of `intent`
    ///
    /// Balances are refreshed only after a confirmed transaction.
    pub async fn submit(&self, intent: TransactionIntent) -> Result<TransactionReceipt> {
        let result = self.gated_submit(intent).await;

        match &result {
            Ok(receipt) => {
                *self.last_receipt.write().await = Some(receipt.clone());
                *self.last_error.write().await = None;
                self.refresh_balances().await;
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
            }
        }

        result
    }

    async fn gated_submit(&self, intent: TransactionIntent) -> Result<TransactionReceipt> {
        let session = self.session();
        let sender = session
            .address()
            .filter(|_| session.is_connected())
            .ok_or(DappError::NotConnected)?;
        self.check_network(&session)?;

        if intent.kind == TransactionKind::Send {
            let asset = self
                .config
                .asset(&intent.token_symbol)
                .ok_or_else(|| DappError::UnsupportedAsset(intent.token_symbol.clone()))?;

            if !validation::is_valid_destination(&intent.destination, &sender.to_string()) {
                return Err(DappError::InvalidAddress(intent.destination.clone()));
            }

            let balances = self.balances().await;
            let available = balances.amount(&asset.symbol);
            if !validation::is_valid_amount_with_decimals(&intent.amount, available, asset.decimals) {
                return Err(DappError::InvalidAmount(format!(
                    "{} {} (available {})",
                    intent.amount, asset.symbol, available
                )));
            }
        }

        self.submitter.submit(intent, sender).await
    }

    pub fn submitter_state(&self) -> SubmitterState {
        self.submitter.state()
    }

    pub async fn last_outcome(&self) -> Option<SubmissionOutcome> {
        self.submitter.last_outcome().await
    }

    pub async fn last_receipt(&self) -> Option<TransactionReceipt> {
        self.last_receipt.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    // ============================================================================
    // Explorer links
    // ============================================================================

    fn explorer(&self) -> &'static str {
        self.session()
            .network()
            .map(Network::explorer_base_url)
            .unwrap_or(DEFAULT_EXPLORER)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer(), tx_hash)
    }

    /// Link to the connected account, if any
    pub fn explorer_address_url(&self) -> Option<String> {
        let address = self.session().address()?;
        Some(format!("{}/address/{}", self.explorer(), address))
    }
}
