//! Ethereum JSON-RPC access
//!
//! - Raw JSON-RPC client
//! - Wallet provider backed by a node's unlocked accounts
//! - Chain and account watcher feeding provider events

mod client;
mod provider;

pub use client::RpcClient;
pub use provider::{spawn_watcher, JsonRpcProvider};
