//! Wallet session tracking
//!
//! A session is connected only when the persisted intent says so **and**
//! the provider currently exposes at least one account. Anything else is
//! disconnected, which is how revoked access and stale intent recover.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::address::{truncate_address, Address};
use crate::error::DappError;
use crate::network::Network;
use crate::provider::{ProviderEvent, WalletProvider};
use crate::storage::{ConnectionIntent, KeyValueStore};
use crate::Result;

/// Connection state as seen by the views
///
/// Only [`WalletSession::connected`] produces a connected value, and it
/// needs an [`Address`], so a connected session always carries a valid one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    connected: bool,
    loading: bool,
    #[serde(with = "crate::address::checksummed_opt")]
    address: Option<Address>,
    network: Option<Network>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address, network: Option<Network>) -> Self {
        Self {
            connected: true,
            loading: false,
            address: Some(address),
            network,
        }
    }

    fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    /// `0x5aAe...eAed` style label for the connected account
    pub fn short_address(&self) -> Option<String> {
        self.address.map(|a| truncate_address(&a.to_string()))
    }
}

/// Owns the current [`WalletSession`] and notifies subscribers of changes
pub struct SessionTracker {
    provider: Arc<dyn WalletProvider>,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<WalletSession>,
}

impl SessionTracker {
    pub fn new(provider: Arc<dyn WalletProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(WalletSession::disconnected());
        Self {
            provider,
            store,
            state,
        }
    }

    pub fn current(&self) -> WalletSession {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.state.subscribe()
    }

    fn publish(&self, session: WalletSession) {
        self.state.send_replace(session);
    }

    /// Cross-checks persisted intent against the provider's accounts
    pub async fn check_connection(&self) -> WalletSession {
        self.publish(self.current().with_loading(true));

        let intent = ConnectionIntent::load(self.store.as_ref());
        let accounts = match self.provider.list_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                log::warn!("Could not list wallet accounts: {}", e);
                Vec::new()
            }
        };

        let session = match (intent, accounts.is_empty()) {
            (ConnectionIntent::Connected, false) => self.read_connected().await,
            (ConnectionIntent::Connected, true) => {
                log::info!("Stored intent is connected but the wallet exposes no accounts");
                WalletSession::disconnected()
            }
            (ConnectionIntent::Disconnected, _) => WalletSession::disconnected(),
        };

        if session.is_connected() != self.current().is_connected() {
            log::info!(
                "Wallet session {}",
                if session.is_connected() { "connected" } else { "disconnected" }
            );
        }

        self.publish(session.clone());
        session
    }

    async fn read_connected(&self) -> WalletSession {
        let address = match self.provider.signer_address().await {
            Ok(address) => address,
            Err(e) => {
                log::warn!("Wallet exposes accounts but no signer: {}", e);
                return WalletSession::disconnected();
            }
        };

        let network = match self.provider.get_network().await {
            Ok(network) => Some(network),
            Err(e) => {
                log::warn!("Could not read wallet network: {}", e);
                None
            }
        };

        WalletSession::connected(address, network)
    }

    /// Asks the wallet for account access and records the intent
    ///
    /// On refusal the intent is left untouched and the session stays
    /// disconnected; the error is returned for display.
    pub async fn connect(&self) -> Result<WalletSession> {
        match self.provider.request_accounts().await {
            Ok(accounts) if accounts.is_empty() => {
                self.check_connection().await;
                Err(DappError::AccessRejected("wallet exposed no accounts".to_string()))
            }
            Ok(_) => {
                ConnectionIntent::Connected.save(self.store.as_ref())?;
                Ok(self.check_connection().await)
            }
            Err(e) => {
                log::warn!("Wallet connection request failed: {}", e);
                self.check_connection().await;
                Err(e)
            }
        }
    }

    /// Records disconnected intent; provider access is not revoked
    pub async fn disconnect(&self) -> Result<WalletSession> {
        ConnectionIntent::Disconnected.save(self.store.as_ref())?;
        Ok(self.check_connection().await)
    }

    /// Re-checks on account changes and on network changes after the first
    pub async fn handle_event(&self, event: ProviderEvent) -> Option<WalletSession> {
        match event {
            ProviderEvent::NetworkChanged { old: None, new } => {
                log::debug!("Initial network {}", new);
                None
            }
            ProviderEvent::NetworkChanged { old: Some(old), new } => {
                log::info!("Network changed from {} to {}", old, new);
                Some(self.check_connection().await)
            }
            ProviderEvent::AccountsChanged(accounts) => {
                log::info!("Wallet accounts changed ({} exposed)", accounts.len());
                Some(self.check_connection().await)
            }
        }
    }
}
