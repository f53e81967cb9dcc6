/// EVM Mock Node
///
/// A lightweight in-memory Ethereum JSON-RPC node with a single VL token
/// contract. Designed for local dApp development and testing.

use anyhow::{Context, Result};
use std::env;

use evm_mock::chain::{DEFAULT_ACCOUNTS, DEFAULT_CHAIN_ID, DEFAULT_TOKEN_ADDRESS};
use evm_mock::{run_server, MockChain};
use vl_dapp::Address;

#[derive(Debug)]
struct Config {
    // Chain
    chain_id: u64,
    accounts: Vec<Address>,
    token_address: Address,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let chain_id = env::var("CHAIN_ID")
            .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
            .parse()
            .context("Invalid CHAIN_ID")?;

        let accounts = env::var("MOCK_ACCOUNTS")
            .unwrap_or_else(|_| DEFAULT_ACCOUNTS.join(","))
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| a.parse().map_err(|e| anyhow::anyhow!("{}", e)))
            .collect::<Result<Vec<Address>>>()
            .context("Invalid MOCK_ACCOUNTS")?;

        let token_address = env::var("TOKEN_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_ADDRESS.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Invalid TOKEN_ADDRESS")?;

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8545".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            chain_id,
            accounts,
            token_address,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting EVM Mock Node...");

    // Load configuration
    let config = Config::from_env()
        .context("Failed to load configuration")?;

    log::info!("Chain id: {}", config.chain_id);
    log::info!("VL token at {}", config.token_address);
    for account in &config.accounts {
        log::info!("Account {}", account);
    }

    let chain = MockChain::new(config.chain_id, config.accounts, config.token_address).shared();

    // Run server
    run_server(chain, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
