//! Shared test doubles for the dApp core integration tests
//!
//! - `MockWallet`: scriptable `WalletProvider` holding native balances
//! - `MockToken`: `TokenContract` whose writes are mined by the mock wallet
//! - `TestEnvironment`: a controller wired to both plus an in-memory store

#![allow(dead_code)]

use alloy_primitives::{keccak256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use vl_dapp::{
    Address, DappConfig, DappController, DappError, MemoryStore, Network, ProviderEvent,
    RawReceipt, TokenContract, TransactionRequest, TxHash, WalletProvider,
};

pub const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const TOKEN: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

pub fn addr(s: &str) -> Address {
    s.parse().expect("test address")
}

pub fn wei(value: u128) -> U256 {
    U256::from(value)
}

/// Mutable knobs and chain state of the mock wallet
pub struct MockState {
    pub authorized: bool,
    pub reject_requests: bool,
    pub accounts: Vec<Address>,
    pub network: Network,
    pub balances: HashMap<Address, U256>,
    pub fail_balance: bool,
    /// Raw return data for `call`; `None` makes every call revert
    pub call_output: Option<Vec<u8>>,
    pub reject_sends: bool,
    pub revert_next: bool,
    pub receipt_delay: Option<Duration>,
    pub sent: Vec<TransactionRequest>,
    pub block_number: u64,
    pub receipts: HashMap<TxHash, RawReceipt>,
}

pub struct MockWallet {
    pub state: Mutex<MockState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        let mut balances = HashMap::new();
        balances.insert(addr(ALICE), wei(10 * ONE_ETHER));

        Arc::new(Self {
            state: Mutex::new(MockState {
                authorized: false,
                reject_requests: false,
                accounts: vec![addr(ALICE)],
                network: Network::from_chain_id(5),
                balances,
                fail_balance: false,
                call_output: None,
                reject_sends: false,
                revert_next: false,
                receipt_delay: None,
                sent: Vec::new(),
                block_number: 100,
                receipts: HashMap::new(),
            }),
            events,
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    pub fn native_balance(&self, address: Address) -> U256 {
        self.with(|s| s.balances.get(&address).copied().unwrap_or_default())
    }

    /// Mines `tx`; `effect` runs only when the transaction does not revert
    pub fn mine(
        &self,
        tx: TransactionRequest,
        effect: impl FnOnce(&mut MockState) -> bool,
    ) -> Result<TxHash, DappError> {
        let mut s = self.state.lock().unwrap();
        if s.reject_sends {
            return Err(DappError::AccessRejected("User denied transaction signature".into()));
        }
        let from = tx.from.unwrap_or(s.accounts[0]);

        s.block_number += 1;
        let nonce = s.sent.len() as u64;
        let mut preimage = from.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let tx_hash = keccak256(&preimage);

        let reverted = std::mem::take(&mut s.revert_next);
        let success = !reverted && effect(&mut s);

        let receipt = RawReceipt {
            transaction_hash: tx_hash,
            from,
            to: Some(tx.to),
            block_number: s.block_number,
            cumulative_gas_used: 21_000,
            success,
        };
        s.receipts.insert(tx_hash, receipt);
        s.sent.push(tx);
        Ok(tx_hash)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        self.with(|s| {
            if s.reject_requests {
                return Err(DappError::AccessRejected("User rejected the request".into()));
            }
            s.authorized = true;
            Ok(s.accounts.clone())
        })
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, DappError> {
        Ok(self.with(|s| if s.authorized { s.accounts.clone() } else { Vec::new() }))
    }

    async fn signer_address(&self) -> Result<Address, DappError> {
        self.with(|s| {
            if s.authorized {
                s.accounts.first().copied().ok_or(DappError::NotConnected)
            } else {
                Err(DappError::NotConnected)
            }
        })
    }

    async fn get_balance(&self, address: Address) -> Result<U256, DappError> {
        self.with(|s| {
            if s.fail_balance {
                return Err(DappError::provider_unavailable("balance read failed"));
            }
            Ok(s.balances.get(&address).copied().unwrap_or_default())
        })
    }

    async fn get_network(&self) -> Result<Network, DappError> {
        Ok(self.with(|s| s.network.clone()))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DappError> {
        let from = tx.from.unwrap_or_else(|| addr(ALICE));
        let (to, value) = (tx.to, tx.value);
        self.mine(tx, |s| {
            let available = s.balances.get(&from).copied().unwrap_or_default();
            if available < value {
                return false;
            }
            s.balances.insert(from, available - value);
            *s.balances.entry(to).or_default() += value;
            true
        })
    }

    async fn call(&self, _tx: TransactionRequest) -> Result<Vec<u8>, DappError> {
        self.with(|s| s.call_output.clone())
            .ok_or_else(|| DappError::rpc(-32000, "execution reverted"))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<RawReceipt, DappError> {
        if let Some(delay) = self.with(|s| s.receipt_delay) {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| s.receipts.get(&tx_hash).cloned())
            .ok_or_else(|| DappError::invalid_response("unknown transaction"))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Token state kept beside the wallet so writes share its receipts
pub struct MockTokenState {
    pub balances: HashMap<Address, U256>,
    pub whitelist: HashSet<Address>,
    pub fail_reads: bool,
    pub mint_amount: U256,
}

pub struct MockToken {
    wallet: Arc<MockWallet>,
    pub state: Arc<Mutex<MockTokenState>>,
}

impl MockToken {
    pub fn new(wallet: Arc<MockWallet>) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            state: Arc::new(Mutex::new(MockTokenState {
                balances: HashMap::new(),
                whitelist: HashSet::new(),
                fail_reads: false,
                mint_amount: wei(100 * ONE_ETHER),
            })),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockTokenState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn sender(&self) -> Address {
        self.wallet.with(|s| s.accounts[0])
    }
}

#[async_trait]
impl TokenContract for MockToken {
    fn address(&self) -> Address {
        addr(TOKEN)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, DappError> {
        self.with(|t| {
            if t.fail_reads {
                return Err(DappError::rpc(-32000, "call to non-contract"));
            }
            Ok(t.balances.get(&owner).copied().unwrap_or_default())
        })
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, DappError> {
        let from = self.sender();
        let state = self.state.clone();
        self.wallet
            .mine(TransactionRequest::call(addr(TOKEN), Vec::new()).from(from), move |_| {
                let mut t = state.lock().unwrap();
                let available = t.balances.get(&from).copied().unwrap_or_default();
                if available < amount {
                    return false;
                }
                t.balances.insert(from, available - amount);
                *t.balances.entry(to).or_default() += amount;
                true
            })
    }

    async fn mint(&self) -> Result<TxHash, DappError> {
        let from = self.sender();
        let state = self.state.clone();
        self.wallet
            .mine(TransactionRequest::call(addr(TOKEN), Vec::new()).from(from), move |_| {
                let mut t = state.lock().unwrap();
                if !t.whitelist.contains(&from) {
                    return false;
                }
                let minted = t.mint_amount;
                *t.balances.entry(from).or_default() += minted;
                true
            })
    }

    async fn add_to_whitelist(&self, account: Address) -> Result<TxHash, DappError> {
        let from = self.sender();
        let state = self.state.clone();
        self.wallet
            .mine(TransactionRequest::call(addr(TOKEN), Vec::new()).from(from), move |_| {
                state.lock().unwrap().whitelist.insert(account);
                true
            })
    }

    async fn verify_whitelist(&self, account: Address) -> Result<bool, DappError> {
        self.with(|t| {
            if t.fail_reads {
                return Err(DappError::rpc(-32000, "call to non-contract"));
            }
            Ok(t.whitelist.contains(&account))
        })
    }
}

/// Controller wired to a mock wallet, mock token and in-memory store
pub struct TestEnvironment {
    pub wallet: Arc<MockWallet>,
    pub token: Arc<MockToken>,
    pub store: Arc<MemoryStore>,
    pub controller: DappController,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_config(DappConfig::default())
    }

    pub fn with_config(config: DappConfig) -> Self {
        init_logger();
        let wallet = MockWallet::new();
        let token = MockToken::new(wallet.clone());
        let store = Arc::new(MemoryStore::new());
        let controller = DappController::new(config, wallet.clone(), token.clone(), store.clone());
        Self {
            wallet,
            token,
            store,
            controller,
        }
    }

    /// Connects and returns the environment ready for submissions
    pub async fn connected() -> Self {
        let env = Self::new();
        env.controller.connect().await.expect("connect");
        env
    }
}
