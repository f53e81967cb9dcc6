/// Wallet configuration from environment variables
///
/// Controls the JSON-RPC endpoint, the tracked token and storage location.
/// Defaults target a local `evm-mock` node.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use vl_dapp::{parse_address, Address, AssetInfo, DappConfig};

/// Token address of a freshly started `evm-mock`
pub const DEFAULT_TOKEN_ADDRESS: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// VL token contract
    pub token_address: Address,
    pub token_symbol: String,
    pub token_decimals: u8,
    /// Refuse submissions on any other network (name or chain id)
    pub expected_network: Option<String>,
    /// Where the connection intent is persisted
    pub storage_dir: PathBuf,
    pub receipt_timeout: Duration,
    /// Receipt polling and chain/account watching interval
    pub poll_interval: Duration,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RPC_URL`: JSON-RPC endpoint (default `http://localhost:8545`)
    /// - `TOKEN_ADDRESS`: VL token contract
    /// - `TOKEN_SYMBOL` / `TOKEN_DECIMALS`: `VL` / `18`
    /// - `EXPECTED_NETWORK`: e.g. `goerli` (optional)
    /// - `STORAGE_DIR`: `./dapp-data`
    /// - `RECEIPT_TIMEOUT_SECS`: `120`
    /// - `POLL_INTERVAL_MS`: `1000`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Against a local mock node
    /// cargo run -p evm-mock &
    /// RPC_URL=http://localhost:8545 cargo run -p wallet
    /// ```
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; invalid values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rpc_url = lookup("RPC_URL").unwrap_or(defaults.rpc_url);
        log::info!("📡 JSON-RPC URL: {}", rpc_url);

        let token_address = match lookup("TOKEN_ADDRESS") {
            Some(raw) => parse_address(raw.trim()).unwrap_or_else(|e| {
                log::warn!("⚠️  Invalid TOKEN_ADDRESS '{}' ({}), using default", raw, e);
                defaults.token_address
            }),
            None => defaults.token_address,
        };

        let token_symbol = lookup("TOKEN_SYMBOL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.token_symbol);
        log::info!("🪙 Token {} at {}", token_symbol, token_address);

        let token_decimals = parse_or(&lookup, "TOKEN_DECIMALS", defaults.token_decimals);

        let expected_network = lookup("EXPECTED_NETWORK").filter(|s| !s.trim().is_empty());
        if let Some(ref network) = expected_network {
            log::info!("🌐 Expected network: {}", network);
        }

        let storage_dir = lookup("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let receipt_timeout = Duration::from_secs(parse_or(
            &lookup,
            "RECEIPT_TIMEOUT_SECS",
            defaults.receipt_timeout.as_secs(),
        ));
        let poll_interval = Duration::from_millis(parse_or(
            &lookup,
            "POLL_INTERVAL_MS",
            defaults.poll_interval.as_millis() as u64,
        ));

        Self {
            rpc_url,
            token_address,
            token_symbol,
            token_decimals,
            expected_network,
            storage_dir,
            receipt_timeout,
            poll_interval,
        }
    }

    /// Core settings handed to the controller
    pub fn dapp_config(&self) -> DappConfig {
        DappConfig {
            token: AssetInfo::new(self.token_symbol.clone(), self.token_decimals),
            expected_network: self.expected_network.clone(),
            receipt_timeout: self.receipt_timeout,
            ..Default::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️  Invalid {} '{}', defaulting to {}", key, raw, default);
            default
        }),
        None => default,
    }
}

impl Default for WalletConfig {
    /// Local mock node defaults
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            token_address: parse_address(DEFAULT_TOKEN_ADDRESS).unwrap_or(Address::ZERO),
            token_symbol: "VL".to_string(),
            token_decimals: 18,
            expected_network: None,
            storage_dir: PathBuf::from("./dapp-data"),
            receipt_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1000),
        }
    }
}
