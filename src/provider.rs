//! Wallet provider capability interface
//!
//! The core never talks to a concrete wallet library. Everything it needs
//! from the key holder (accounts, balances, signing and broadcasting,
//! change notifications) goes through [`WalletProvider`].

use alloy_primitives::U256;
use async_trait::async_trait;
use tokio::sync::broadcast;

pub use alloy_primitives::TxHash;

use crate::address::Address;
use crate::network::Network;
use crate::Result;

/// Transaction to be signed by the provider's account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Option<Address>,
    pub to: Address,
    /// Native value in wei
    pub value: U256,
    pub data: Vec<u8>,
}

impl TransactionRequest {
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            from: None,
            to,
            value,
            data: Vec::new(),
        }
    }

    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            from: None,
            to,
            value: U256::ZERO,
            data,
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// Receipt as reported by the provider, before normalisation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReceipt {
    pub transaction_hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    pub block_number: u64,
    pub cumulative_gas_used: u64,
    /// `false` when the transaction was mined but reverted
    pub success: bool,
}

/// Change notifications pushed by the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `old` is `None` for the first network the provider observes
    NetworkChanged {
        new: Network,
        old: Option<Network>,
    },
    AccountsChanged(Vec<Address>),
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the user to expose accounts (may prompt)
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts currently exposed, without prompting
    async fn list_accounts(&self) -> Result<Vec<Address>>;

    /// Address that signs outgoing transactions
    async fn signer_address(&self) -> Result<Address>;

    /// Native balance in wei
    async fn get_balance(&self, address: Address) -> Result<U256>;

    async fn get_network(&self) -> Result<Network>;

    /// Signs and broadcasts; returns once the node has accepted the transaction
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Read-only contract call against the latest block
    async fn call(&self, tx: TransactionRequest) -> Result<Vec<u8>>;

    /// Suspends until the transaction has one confirmation
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<RawReceipt>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
