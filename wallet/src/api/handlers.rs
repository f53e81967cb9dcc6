use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use vl_dapp::{FormValidation, TransactionIntent, TransactionReceipt, WalletSession};

use super::types::*;
use crate::error::WalletError;
use crate::manager::DappManager;

fn session_response(manager: &DappManager, session: WalletSession) -> SessionResponse {
    SessionResponse {
        connected: session.is_connected(),
        loading: session.is_loading(),
        address: session.address().map(|a| a.to_string()),
        short_address: session.short_address(),
        network_name: session.network().map(|n| n.display_name().to_string()),
        network: session.network().cloned(),
        explorer_url: manager.explorer_address_url(),
    }
}

fn transaction_response(manager: &DappManager, receipt: TransactionReceipt) -> TransactionResponse {
    TransactionResponse {
        explorer_url: manager.explorer_tx_url(&receipt.transaction_hash),
        receipt: receipt.into(),
    }
}

pub async fn health_handler(State(manager): State<Arc<DappManager>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "rpc_url": manager.config.rpc_url,
    }))
}

pub async fn get_session_handler(
    State(manager): State<Arc<DappManager>>,
) -> Json<SessionResponse> {
    let session = manager.check_connection().await;
    Json(session_response(&manager, session))
}

pub async fn connect_handler(
    State(manager): State<Arc<DappManager>>,
) -> Result<Json<SessionResponse>, WalletError> {
    let session = manager.connect().await?;
    Ok(Json(session_response(&manager, session)))
}

pub async fn disconnect_handler(
    State(manager): State<Arc<DappManager>>,
) -> Result<Json<SessionResponse>, WalletError> {
    let session = manager.disconnect().await?;
    Ok(Json(session_response(&manager, session)))
}

pub async fn get_balances_handler(
    State(manager): State<Arc<DappManager>>,
) -> Json<BalancesResponse> {
    let snapshot = manager.balances().await;
    Json(BalancesResponse {
        balances: snapshot.amounts,
        whitelisted: snapshot.whitelisted,
    })
}

pub async fn refresh_balances_handler(
    State(manager): State<Arc<DappManager>>,
) -> Result<Json<BalancesResponse>, WalletError> {
    let snapshot = manager.refresh_balances().await?;
    Ok(Json(BalancesResponse {
        balances: snapshot.amounts,
        whitelisted: snapshot.whitelisted,
    }))
}

pub async fn validate_handler(
    State(manager): State<Arc<DappManager>>,
    Json(req): Json<ValidateRequest>,
) -> Json<FormValidation> {
    let validation = manager
        .validate(&req.token_symbol, &req.destination, &req.amount)
        .await;
    Json(validation)
}

pub async fn send_handler(
    State(manager): State<Arc<DappManager>>,
    Json(req): Json<SendRequest>,
) -> Result<Json<TransactionResponse>, WalletError> {
    let intent = TransactionIntent::send(req.token_symbol, req.destination, req.amount);
    let receipt = manager.submit(intent).await?;
    Ok(Json(transaction_response(&manager, receipt)))
}

pub async fn mint_handler(
    State(manager): State<Arc<DappManager>>,
    body: Option<Json<TokenActionRequest>>,
) -> Result<Json<TransactionResponse>, WalletError> {
    let symbol = token_symbol(&manager, body);
    let receipt = manager.submit(TransactionIntent::mint(symbol)).await?;
    Ok(Json(transaction_response(&manager, receipt)))
}

pub async fn whitelist_handler(
    State(manager): State<Arc<DappManager>>,
    body: Option<Json<TokenActionRequest>>,
) -> Result<Json<TransactionResponse>, WalletError> {
    let symbol = token_symbol(&manager, body);
    let receipt = manager.submit(TransactionIntent::whitelist(symbol)).await?;
    Ok(Json(transaction_response(&manager, receipt)))
}

fn token_symbol(manager: &DappManager, body: Option<Json<TokenActionRequest>>) -> String {
    body.and_then(|Json(req)| req.token_symbol)
        .unwrap_or_else(|| manager.token_symbol().to_string())
}

pub async fn latest_transaction_handler(
    State(manager): State<Arc<DappManager>>,
) -> Json<LatestTransactionResponse> {
    let latest = manager.latest_transaction().await;
    Json(LatestTransactionResponse {
        state: latest.state,
        receipt: latest.receipt.map(Into::into),
        explorer_url: latest.explorer_url,
        error: latest.error,
    })
}
