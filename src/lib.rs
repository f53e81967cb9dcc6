//! VL dApp: wallet session, balances and transactions
//!
//! This crate holds the logic behind the VL token dApp: it tracks whether
//! the user's wallet is connected, reads native and token balances, and
//! submits sends, mints and whitelist registrations through an external
//! wallet provider.
//!
//! # Architecture
//!
//! - **Session Tracker**: persisted connect intent cross-checked with the wallet
//! - **Balance Fetcher**: partial-failure tolerant, sequence-tagged reads
//! - **Transaction Submitter**: send / mint / whitelist with receipt normalisation
//! - **Controller**: owns all of the above and is what views talk to
//!
//! The wallet and token are reached only through the [`WalletProvider`] and
//! [`TokenContract`] traits.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vl_dapp::{DappConfig, DappController, Erc20Token, MemoryStore, TransactionIntent};
//!
//! let token = Arc::new(Erc20Token::new(token_address, provider.clone()));
//! let controller = DappController::new(
//!     DappConfig::default(),
//!     provider,
//!     token,
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! controller.connect().await?;
//! let receipt = controller
//!     .submit(TransactionIntent::send("ETH", "0xfB69...d359", "1.5"))
//!     .await?;
//! println!("{}", controller.explorer_tx_url(&receipt.transaction_hash));
//! ```

// Public modules
pub mod abi;
pub mod address;
pub mod balance;
pub mod config;
pub mod controller;
pub mod error;
pub mod network;
pub mod provider;
pub mod session;
pub mod storage;
pub mod submitter;
pub mod token;
pub mod units;
pub mod validation;

// Re-exports for convenience
pub use address::{is_valid_address, parse_address, truncate_address, Address};
pub use alloy_primitives::U256;
pub use balance::{BalanceBook, BalanceFetcher, BalanceSnapshot, TaggedSnapshot};
pub use config::{AssetInfo, DappConfig};
pub use controller::{DappController, FormValidation};
pub use error::DappError;
pub use network::Network;
pub use provider::{ProviderEvent, RawReceipt, TransactionRequest, TxHash, WalletProvider};
pub use session::{SessionTracker, WalletSession};
pub use storage::{ConnectionIntent, KeyValueStore, MemoryStore, WALLET_STATUS_KEY};
pub use submitter::{
    SubmissionOutcome, SubmitterState, TransactionIntent, TransactionKind, TransactionReceipt,
    TransactionSubmitter,
};
pub use token::{Erc20Token, TokenContract};
pub use validation::{is_valid_amount, is_valid_destination, AmountInput};

// Common result type
pub type Result<T> = std::result::Result<T, DappError>;
