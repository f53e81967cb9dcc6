//! Balance fetching
//!
//! Reads never fail past this module: a read that errors is logged and
//! replaced by zero (balances) or `false` (whitelist), so a wrong network
//! or a flaky node cannot block the views.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AssetInfo;
use crate::provider::WalletProvider;
use crate::session::WalletSession;
use crate::token::TokenContract;
use crate::units::{self, ZERO};

/// Balances keyed by asset symbol, as display decimals
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub amounts: BTreeMap<String, String>,
    pub whitelisted: bool,
}

impl BalanceSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Balance of `symbol`, or `"0"` when it was never fetched
    pub fn amount(&self, symbol: &str) -> &str {
        self.amounts
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, v)| v.as_str())
            .unwrap_or(ZERO)
    }
}

/// Snapshot tagged with the sequence number of the fetch that produced it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaggedSnapshot {
    pub seq: u64,
    pub snapshot: BalanceSnapshot,
}

pub struct BalanceFetcher {
    provider: Arc<dyn WalletProvider>,
    token: Arc<dyn TokenContract>,
    native: AssetInfo,
    token_info: AssetInfo,
    next_seq: AtomicU64,
}

impl BalanceFetcher {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        token: Arc<dyn TokenContract>,
        native: AssetInfo,
        token_info: AssetInfo,
    ) -> Self {
        Self {
            provider,
            token,
            native,
            token_info,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Reserves the next sequence number
    pub fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Fetch whose result can be checked against newer ones
    pub async fn fetch_tagged(&self, session: &WalletSession) -> TaggedSnapshot {
        let seq = self.next_seq();
        let snapshot = self.fetch(session).await;
        TaggedSnapshot { seq, snapshot }
    }

    /// Native balance, token balance and whitelist flag, in that order
    pub async fn fetch(&self, session: &WalletSession) -> BalanceSnapshot {
        let Some(address) = session.address().filter(|_| session.is_connected()) else {
            return BalanceSnapshot::empty();
        };

        let mut snapshot = BalanceSnapshot::empty();

        let native = match self.provider.get_balance(address).await {
            Ok(wei) => units::format_amount(wei, self.native.decimals),
            Err(e) => {
                log::warn!("Failed to read {} balance of {}: {}", self.native.symbol, address, e);
                ZERO.to_string()
            }
        };
        snapshot.amounts.insert(self.native.symbol.clone(), native);

        let token = match self.token.balance_of(address).await {
            Ok(amount) => units::format_amount(amount, self.token_info.decimals),
            Err(e) => {
                log::warn!("Failed to read {} balance of {}: {}", self.token_info.symbol, address, e);
                ZERO.to_string()
            }
        };
        snapshot.amounts.insert(self.token_info.symbol.clone(), token);

        snapshot.whitelisted = match self.token.verify_whitelist(address).await {
            Ok(flag) => flag,
            Err(e) => {
                log::warn!("Failed to read whitelist status of {}: {}", address, e);
                false
            }
        };

        snapshot
    }
}

/// Latest applied snapshot; results of superseded fetches are dropped
#[derive(Default)]
pub struct BalanceBook {
    inner: RwLock<TaggedSnapshot>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> BalanceSnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Stores `tagged` unless a newer fetch already landed
    pub async fn apply(&self, tagged: TaggedSnapshot) -> bool {
        let mut inner = self.inner.write().await;
        if tagged.seq <= inner.seq {
            log::debug!(
                "Discarding balance fetch #{} (already have #{})",
                tagged.seq,
                inner.seq
            );
            return false;
        }
        *inner = tagged;
        true
    }
}
