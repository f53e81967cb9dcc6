//! Error types for VL dApp operations
//!
//! Covers wallet connection, input validation, transaction submission and
//! the plumbing underneath (RPC, ABI decoding, intent storage).

use std::error::Error as StdError;
use std::fmt;

/// Core error type for dApp operations
///
/// Balance reads never produce one of these past the fetcher boundary;
/// everything else is returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DappError {
    /// Wallet provider could not be reached
    ProviderUnavailable(String),

    /// User (or the provider) refused account access
    AccessRejected(String),

    /// Operation needs a connected session
    NotConnected,

    /// Connected to a network other than the configured one
    WrongNetwork { expected: String, actual: String },

    /// Destination is not a usable address
    InvalidAddress(String),

    /// Amount is malformed or outside the available balance
    InvalidAmount(String),

    /// Asset symbol is neither the native asset nor the tracked token
    UnsupportedAsset(String),

    /// Another submission is still in flight
    SubmissionInProgress,

    /// Broadcast or signing failed
    SubmissionFailed(String),

    /// Transaction was mined but reverted
    Reverted { tx_hash: String },

    /// No receipt arrived within the configured window
    ReceiptTimeout { tx_hash: String, secs: u64 },

    /// JSON-RPC level failure
    Rpc { code: i64, message: String },

    /// Malformed response from the provider
    InvalidResponse(String),

    /// ABI encoding or decoding problem
    Abi(String),

    /// Intent storage failure
    Storage(String),
}

impl fmt::Display for DappError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable(msg) => write!(f, "Wallet provider unavailable: {}", msg),
            Self::AccessRejected(msg) => write!(f, "Account access rejected: {}", msg),
            Self::NotConnected => write!(f, "Wallet is not connected"),
            Self::WrongNetwork { expected, actual } => {
                write!(f, "Wrong network: expected {}, connected to {}", expected, actual)
            }
            Self::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            Self::UnsupportedAsset(symbol) => write!(f, "Unsupported asset: {}", symbol),
            Self::SubmissionInProgress => write!(f, "A transaction is already being submitted"),
            Self::SubmissionFailed(msg) => write!(f, "Transaction submission failed: {}", msg),
            Self::Reverted { tx_hash } => write!(f, "Transaction reverted: {}", tx_hash),
            Self::ReceiptTimeout { tx_hash, secs } => {
                write!(f, "No receipt for {} after {}s", tx_hash, secs)
            }
            Self::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            Self::InvalidResponse(msg) => write!(f, "Invalid provider response: {}", msg),
            Self::Abi(msg) => write!(f, "ABI error: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl StdError for DappError {}

// Helper functions for common error scenarios
impl DappError {
    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// True for the errors that mean the user has to fix the form input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_) | Self::InvalidAmount(_) | Self::UnsupportedAsset(_)
        )
    }
}
