/// Axum HTTP handlers for the JSON-RPC endpoint and mock controls

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use vl_dapp::abi;

use crate::chain::{parse_address, ChainError, ChainResult, MockChain, SharedChain};
use crate::types::*;

/// Shared application state
pub type AppState = SharedChain;

/// Errors of the control endpoints
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn lock(state: &AppState) -> Result<std::sync::MutexGuard<'_, MockChain>, ApiError> {
    state
        .lock()
        .map_err(|_| ApiError::Internal("chain state poisoned".to_string()))
}

/// POST /
/// Ethereum JSON-RPC 2.0 entry point
pub async fn json_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Result<Json<JsonRpcResponse>, ApiError> {
    log::debug!("→ {} {}", request.method, request.params);

    let result = {
        let mut chain = lock(&state)?;
        dispatch(&mut chain, &request.method, &request.params)
    };

    let response = match result {
        Ok(value) => JsonRpcResponse::success(request.id, value),
        Err(err) => {
            log::debug!("✗ {} failed: {}", request.method, err);
            JsonRpcResponse::failure(request.id, err.code(), err.to_string())
        }
    };
    Ok(Json(response))
}

fn param<T: DeserializeOwned>(params: &Value, index: usize) -> ChainResult<T> {
    let value = params
        .get(index)
        .cloned()
        .ok_or_else(|| ChainError::InvalidParams(format!("missing parameter {}", index)))?;
    serde_json::from_value(value).map_err(|e| ChainError::InvalidParams(e.to_string()))
}

fn addresses(list: Vec<vl_dapp::Address>) -> Value {
    json!(list.iter().map(|a| a.to_checksum(None)).collect::<Vec<_>>())
}

pub fn dispatch(chain: &mut MockChain, method: &str, params: &Value) -> ChainResult<Value> {
    match method {
        "eth_chainId" => Ok(json!(abi::u64_quantity(chain.chain_id))),
        "net_version" => Ok(json!(chain.chain_id.to_string())),
        "eth_blockNumber" => Ok(json!(abi::u64_quantity(chain.block_number))),
        "eth_accounts" => Ok(addresses(chain.visible_accounts())),
        "eth_requestAccounts" => chain.request_accounts().map(addresses),
        "eth_getBalance" => {
            let address: String = param(params, 0)?;
            let address = parse_address(&address)?;
            Ok(json!(abi::to_quantity(chain.balance(&address))))
        }
        "eth_call" => {
            let call: TransactionCall = param(params, 0)?;
            chain.call(&call).map(|out| json!(abi::to_hex_data(&out)))
        }
        "eth_sendTransaction" => {
            let call: TransactionCall = param(params, 0)?;
            chain.send_transaction(&call).map(|hash| json!(hash))
        }
        "eth_getTransactionReceipt" => {
            let hash: String = param(params, 0)?;
            Ok(chain
                .receipt(&hash)
                .map(|r| json!(r))
                .unwrap_or(Value::Null))
        }
        other => Err(ChainError::MethodNotFound(other.to_string())),
    }
}

/// POST /mock/revoke
/// Drops account authorisation as if the user disconnected the site
pub async fn revoke_access(State(state): State<AppState>) -> Result<Json<MockStatus>, ApiError> {
    let mut chain = lock(&state)?;
    chain.revoke();
    log::info!("🔒 Account access revoked");
    Ok(Json(status_of(&chain)))
}

/// POST /mock/chain
/// Switches the reported chain id
pub async fn switch_chain(
    State(state): State<AppState>,
    Json(request): Json<SwitchChainRequest>,
) -> Result<Json<MockStatus>, ApiError> {
    if request.chain_id == 0 {
        return Err(ApiError::BadRequest("chain_id must be positive".to_string()));
    }
    let mut chain = lock(&state)?;
    chain.switch_chain(request.chain_id);
    Ok(Json(status_of(&chain)))
}

/// POST /mock/reject-next
/// Makes the next account request or transaction fail as user-rejected
pub async fn reject_next(State(state): State<AppState>) -> Result<Json<MockStatus>, ApiError> {
    let mut chain = lock(&state)?;
    chain.reject_next = true;
    log::info!("🙅 Next wallet request will be rejected");
    Ok(Json(status_of(&chain)))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let chain = lock(&state)?;
    Ok(Json(json!({
        "status": "ok",
        "chain_id": chain.chain_id,
        "block_number": chain.block_number,
    })))
}

fn status_of(chain: &MockChain) -> MockStatus {
    MockStatus {
        chain_id: chain.chain_id,
        block_number: chain.block_number,
        authorized: chain.authorized,
    }
}
