use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vl_dapp::DappError;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wrong network: expected {expected}, connected to {actual}")]
    WrongNetwork { expected: String, actual: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A transaction is already being submitted")]
    SubmissionInProgress,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl From<DappError> for WalletError {
    fn from(err: DappError) -> Self {
        let message = err.to_string();
        match err {
            DappError::ProviderUnavailable(_) => WalletError::WalletUnavailable(message),
            DappError::AccessRejected(_) => WalletError::ConnectionRejected(message),
            DappError::NotConnected => WalletError::NotConnected,
            DappError::WrongNetwork { expected, actual } => {
                WalletError::WrongNetwork { expected, actual }
            }
            DappError::InvalidAddress(_)
            | DappError::InvalidAmount(_)
            | DappError::UnsupportedAsset(_) => WalletError::InvalidInput(message),
            DappError::SubmissionInProgress => WalletError::SubmissionInProgress,
            DappError::SubmissionFailed(_) | DappError::Reverted { .. } => {
                WalletError::TransactionFailed(message)
            }
            DappError::ReceiptTimeout { .. } => WalletError::Timeout(message),
            DappError::Rpc { .. } | DappError::InvalidResponse(_) | DappError::Abi(_) => {
                WalletError::Rpc(message)
            }
            DappError::Storage(_) => WalletError::Internal(message),
        }
    }
}

impl From<StorageError> for DappError {
    fn from(err: StorageError) -> Self {
        DappError::storage(err.to_string())
    }
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let status = match self {
            WalletError::WalletUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::ConnectionRejected(_) => StatusCode::FORBIDDEN,
            WalletError::NotConnected => StatusCode::CONFLICT,
            WalletError::WrongNetwork { .. } => StatusCode::CONFLICT,
            WalletError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WalletError::SubmissionInProgress => StatusCode::CONFLICT,
            WalletError::TransactionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WalletError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WalletError::Rpc(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
