//! Transaction submission
//!
//! One submission at a time: `Idle -> Submitting -> {Confirmed, Failed}`,
//! and back to `Idle` once the outcome is recorded. Nothing about an
//! in-flight transaction is persisted; the chain is the source of truth.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::address::{self, Address};
use crate::config::DappConfig;
use crate::error::DappError;
use crate::provider::{TransactionRequest, TxHash, WalletProvider};
use crate::token::TokenContract;
use crate::units;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Mint,
    Whitelist,
}

/// What the user asked for, built from form input and consumed once
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub kind: TransactionKind,
    pub token_symbol: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub amount: String,
}

impl TransactionIntent {
    pub fn send(
        token_symbol: impl Into<String>,
        destination: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            kind: TransactionKind::Send,
            token_symbol: token_symbol.into(),
            destination: destination.into(),
            amount: amount.into(),
        }
    }

    pub fn mint(token_symbol: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Mint,
            token_symbol: token_symbol.into(),
            destination: String::new(),
            amount: String::new(),
        }
    }

    pub fn whitelist(token_symbol: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Whitelist,
            token_symbol: token_symbol.into(),
            destination: String::new(),
            amount: String::new(),
        }
    }
}

/// Display record of a confirmed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(with = "crate::address::checksummed")]
    pub from: Address,
    #[serde(with = "crate::address::checksummed")]
    pub to: Address,
    pub block_number: u64,
    pub cumulative_gas_used: String,
    pub transaction_hash: String,
    /// Base units moved: wei for native sends, token units for token sends
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitterState {
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Confirmed { transaction_hash: String },
    Failed { reason: String },
}

/// Broadcast result before the receipt wait
struct Broadcast {
    tx_hash: TxHash,
    to: Address,
    value: U256,
}

pub struct TransactionSubmitter {
    provider: Arc<dyn WalletProvider>,
    token: Arc<dyn TokenContract>,
    config: DappConfig,
    state: watch::Sender<SubmitterState>,
    last_outcome: Mutex<Option<SubmissionOutcome>>,
}

impl TransactionSubmitter {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        token: Arc<dyn TokenContract>,
        config: DappConfig,
    ) -> Self {
        let (state, _) = watch::channel(SubmitterState::Idle);
        Self {
            provider,
            token,
            config,
            state,
            last_outcome: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SubmitterState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmitterState> {
        self.state.subscribe()
    }

    pub async fn last_outcome(&self) -> Option<SubmissionOutcome> {
        self.last_outcome.lock().await.clone()
    }

    /// Broadcasts `intent` from `sender` and waits for its first confirmation
    pub async fn submit(
        &self,
        intent: TransactionIntent,
        sender: Address,
    ) -> Result<TransactionReceipt> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == SubmitterState::Submitting {
                false
            } else {
                *state = SubmitterState::Submitting;
                true
            }
        });
        if !claimed {
            return Err(DappError::SubmissionInProgress);
        }

        log::info!("Submitting {:?} transaction ({})", intent.kind, intent.token_symbol);
        let result = self.execute(&intent, sender).await;

        let (terminal, outcome) = match &result {
            Ok(receipt) => {
                log::info!(
                    "Transaction {} confirmed in block {}",
                    receipt.transaction_hash,
                    receipt.block_number
                );
                (
                    SubmitterState::Confirmed,
                    SubmissionOutcome::Confirmed {
                        transaction_hash: receipt.transaction_hash.clone(),
                    },
                )
            }
            Err(e) => {
                log::error!("{:?} transaction failed: {}", intent.kind, e);
                (
                    SubmitterState::Failed,
                    SubmissionOutcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        *self.last_outcome.lock().await = Some(outcome);
        self.state.send_replace(terminal);
        self.state.send_replace(SubmitterState::Idle);

        result
    }

    async fn execute(&self, intent: &TransactionIntent, sender: Address) -> Result<TransactionReceipt> {
        let broadcast = match intent.kind {
            TransactionKind::Send => self.broadcast_send(intent, sender).await?,
            TransactionKind::Mint => {
                self.require_token(&intent.token_symbol)?;
                let tx_hash = self.token.mint().await.map_err(broadcast_failed)?;
                Broadcast {
                    tx_hash,
                    to: self.token.address(),
                    value: U256::ZERO,
                }
            }
            TransactionKind::Whitelist => {
                self.require_token(&intent.token_symbol)?;
                let tx_hash = self
                    .token
                    .add_to_whitelist(sender)
                    .await
                    .map_err(broadcast_failed)?;
                Broadcast {
                    tx_hash,
                    to: self.token.address(),
                    value: U256::ZERO,
                }
            }
        };

        log::debug!("Broadcast {}, waiting for receipt", broadcast.tx_hash);
        let timeout = self.config.receipt_timeout;
        let raw = tokio::time::timeout(timeout, self.provider.wait_for_receipt(broadcast.tx_hash))
            .await
            .map_err(|_| DappError::ReceiptTimeout {
                tx_hash: broadcast.tx_hash.to_string(),
                secs: timeout.as_secs(),
            })?
            .map_err(broadcast_failed)?;

        if !raw.success {
            return Err(DappError::Reverted {
                tx_hash: raw.transaction_hash.to_string(),
            });
        }

        Ok(TransactionReceipt {
            from: raw.from,
            to: raw.to.unwrap_or(broadcast.to),
            block_number: raw.block_number,
            cumulative_gas_used: raw.cumulative_gas_used.to_string(),
            transaction_hash: raw.transaction_hash.to_string(),
            value: broadcast.value.to_string(),
        })
    }

    async fn broadcast_send(&self, intent: &TransactionIntent, sender: Address) -> Result<Broadcast> {
        let asset = self
            .config
            .asset(&intent.token_symbol)
            .ok_or_else(|| DappError::UnsupportedAsset(intent.token_symbol.clone()))?;
        let destination = address::parse_address(&intent.destination)?;
        let amount = units::parse_amount(&intent.amount, asset.decimals)?;

        if self.config.is_native(&intent.token_symbol) {
            let tx = TransactionRequest::transfer(destination, amount).from(sender);
            let tx_hash = self
                .provider
                .send_transaction(tx)
                .await
                .map_err(broadcast_failed)?;
            Ok(Broadcast {
                tx_hash,
                to: destination,
                value: amount,
            })
        } else {
            let tx_hash = self
                .token
                .transfer(destination, amount)
                .await
                .map_err(broadcast_failed)?;
            Ok(Broadcast {
                tx_hash,
                to: self.token.address(),
                value: amount,
            })
        }
    }

    fn require_token(&self, symbol: &str) -> Result<()> {
        if symbol.eq_ignore_ascii_case(&self.config.token.symbol) {
            Ok(())
        } else {
            Err(DappError::UnsupportedAsset(symbol.to_string()))
        }
    }
}

/// Input errors pass through; anything else becomes a submission failure
fn broadcast_failed(e: DappError) -> DappError {
    match e {
        e if e.is_input_error() => e,
        e @ DappError::SubmissionFailed(_) => e,
        other => DappError::SubmissionFailed(other.to_string()),
    }
}
