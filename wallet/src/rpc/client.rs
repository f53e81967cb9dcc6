use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use vl_dapp::DappError;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Minimal JSON-RPC 2.0 client over HTTP
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue `method` and decode its `result`
    ///
    /// Transport failures map to `ProviderUnavailable`, JSON-RPC error
    /// objects to `Rpc`. A `null` result decodes into `Option` targets.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, DappError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        log::debug!("→ [{}] {} {}", id, method, body["params"]);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DappError::provider_unavailable(format!("{}: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(DappError::provider_unavailable(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| DappError::invalid_response(format!("{}: {}", method, e)))?;

        if let Some(error) = envelope.error {
            log::debug!("✗ [{}] {} -> {} {}", id, method, error.code, error.message);
            return Err(DappError::rpc(error.code, error.message));
        }

        let result = envelope.result.unwrap_or(Value::Null);
        log::debug!("← [{}] {}", id, result);
        serde_json::from_value(result)
            .map_err(|e| DappError::invalid_response(format!("{}: {}", method, e)))
    }
}
