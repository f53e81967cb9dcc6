//! Common test utilities for wallet server integration tests
//!
//! This module provides shared test infrastructure including:
//! - An in-process `evm-mock` node bound to an ephemeral port
//! - Test environment setup and cleanup
//! - JSON request helpers for the API router

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use evm_mock::{create_router as create_node_router, MockChain, SharedChain};
use vl_dapp::U256;
use wallet::api::server::create_router;
use wallet::config::WalletConfig;
use wallet::manager::DappManager;
use wallet::storage::Storage;

pub const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn wei(value: u128) -> U256 {
    U256::from(value)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Mock node served on 127.0.0.1 with a random port
pub struct MockNode {
    pub chain: SharedChain,
    pub url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl MockNode {
    pub async fn start() -> anyhow::Result<Self> {
        let chain = MockChain::with_defaults().shared();
        let app = create_node_router(chain.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        log::info!("🧪 Mock node at {}", url);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Mock node stopped: {}", e);
            }
        });

        Ok(Self { chain, url, handle })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockChain) -> R) -> R {
        let mut chain = self.chain.lock().unwrap();
        f(&mut chain)
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub node: MockNode,
    pub manager: Arc<DappManager>,
    pub router: Router,
}

impl TestEnvironment {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_poll_interval(Duration::from_millis(20)).await
    }

    /// A long interval keeps the watcher from ticking during a test
    pub async fn with_poll_interval(poll_interval: Duration) -> anyhow::Result<Self> {
        init_logger();
        let node = MockNode::start().await?;
        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let config = WalletConfig {
            poll_interval,
            ..Self::config(&node, &temp_dir)
        };
        let storage = Storage::new_with_base_dir(config.storage_dir.clone());
        let manager = Arc::new(DappManager::with_config(config, storage));
        manager.start().await;
        let router = create_router(manager.clone());

        Ok(Self {
            temp_dir,
            node,
            manager,
            router,
        })
    }

    pub fn config(node: &MockNode, temp_dir: &TempDir) -> WalletConfig {
        WalletConfig {
            rpc_url: node.url.clone(),
            storage_dir: temp_dir.path().to_path_buf(),
            poll_interval: Duration::from_millis(20),
            receipt_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    /// A second manager sharing the node and storage directory
    pub fn manager_for(node: &MockNode, temp_dir: &TempDir) -> DappManager {
        let config = Self::config(node, temp_dir);
        let storage = Storage::new_with_base_dir(config.storage_dir.clone());
        DappManager::with_config(config, storage)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call("POST", uri, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.call("POST", uri, None).await
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        log::info!("🧹 Cleaning up test environment (temp dir will auto-remove)");
    }
}

/// Waits until `check` holds or the timeout expires
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
