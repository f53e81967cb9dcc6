//! In-memory chain state
//!
//! Native balances, one VL token contract and a receipt log. Every accepted
//! transaction is mined into its own block immediately.

use alloy_primitives::{keccak256, uint, U256};
use alloy_sol_types::{SolCall, SolInterface};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use vl_dapp::abi::{self, IVlToken, IVlToken::IVlTokenCalls};
use vl_dapp::Address;

use crate::types::{ReceiptResponse, TransactionCall};

pub const ONE_ETHER: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Token contract address the mock deploys at
pub const DEFAULT_TOKEN_ADDRESS: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

/// Accounts exposed when `MOCK_ACCOUNTS` is not set
pub const DEFAULT_ACCOUNTS: [&str; 2] = [
    "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
    "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
];

pub const DEFAULT_CHAIN_ID: u64 = 5;

/// Native balance every mock account starts with (100 ETH)
pub const INITIAL_BALANCE: U256 = uint!(100_000_000_000_000_000_000_U256);

/// Amount credited by `mint()` (100 VL)
pub const MINT_AMOUNT: U256 = uint!(100_000_000_000_000_000_000_U256);

const TRANSFER_GAS: u64 = 21_000;
const CALL_GAS: u64 = 51_000;

pub type SharedChain = Arc<Mutex<MockChain>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("User rejected the request.")]
    UserRejected,

    #[error("The requested account has not been authorized by the user.")]
    Unauthorized,

    #[error("the method {0} does not exist/is not available")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    Execution(String),
}

impl ChainError {
    /// JSON-RPC error code
    pub fn code(&self) -> i64 {
        match self {
            ChainError::UserRejected => 4001,
            ChainError::Unauthorized => 4100,
            ChainError::MethodNotFound(_) => -32601,
            ChainError::InvalidParams(_) => -32602,
            ChainError::Execution(_) => -32000,
        }
    }
}

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Storage of the emulated VL token
#[derive(Debug)]
pub struct MockToken {
    pub address: Address,
    pub balances: HashMap<Address, U256>,
    pub whitelist: HashSet<Address>,
}

impl MockToken {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            whitelist: HashSet::new(),
        }
    }

    pub fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    /// Read-only entry points
    fn call(&self, data: &[u8]) -> ChainResult<Vec<u8>> {
        match decode_call(data)? {
            IVlTokenCalls::balanceOf(call) => Ok(IVlToken::balanceOfCall::abi_encode_returns(&(
                self.balance_of(&call.account),
            ))),
            IVlTokenCalls::verifyWhitelist(call) => {
                Ok(IVlToken::verifyWhitelistCall::abi_encode_returns(&(
                    self.whitelist.contains(&call.account),
                )))
            }
            _ => Err(ChainError::Execution("execution reverted".to_string())),
        }
    }

    /// State-changing entry points. `Err` is a revert reason.
    fn execute(&mut self, sender: Address, data: &[u8]) -> ChainResult<()> {
        match decode_call(data)? {
            IVlTokenCalls::transfer(call) => {
                let from_balance = self.balance_of(&sender);
                if from_balance < call.amount {
                    return Err(ChainError::Execution(
                        "ERC20: transfer amount exceeds balance".to_string(),
                    ));
                }
                self.balances.insert(sender, from_balance - call.amount);
                *self.balances.entry(call.to).or_default() += call.amount;
                Ok(())
            }
            IVlTokenCalls::mint(_) => {
                if !self.whitelist.contains(&sender) {
                    return Err(ChainError::Execution("address is not whitelisted".to_string()));
                }
                *self.balances.entry(sender).or_default() += MINT_AMOUNT;
                Ok(())
            }
            IVlTokenCalls::addToWhitelist(call) => {
                self.whitelist.insert(call.account);
                Ok(())
            }
            _ => Err(ChainError::Execution("execution reverted".to_string())),
        }
    }
}

fn decode_call(data: &[u8]) -> ChainResult<IVlTokenCalls> {
    IVlTokenCalls::abi_decode(data, true).map_err(|e| ChainError::Execution(e.to_string()))
}

pub fn parse_address(value: &str) -> ChainResult<Address> {
    value
        .parse()
        .map_err(|_| ChainError::InvalidParams(format!("invalid address: {}", value)))
}

#[derive(Debug)]
pub struct MockChain {
    pub chain_id: u64,
    pub block_number: u64,
    pub accounts: Vec<Address>,
    pub authorized: bool,
    pub reject_next: bool,
    pub balances: HashMap<Address, U256>,
    pub token: MockToken,
    nonce: u64,
    receipts: HashMap<String, ReceiptResponse>,
}

impl MockChain {
    /// Fund every account with [`INITIAL_BALANCE`]
    pub fn new(chain_id: u64, accounts: Vec<Address>, token_address: Address) -> Self {
        let balances = accounts.iter().map(|a| (*a, INITIAL_BALANCE)).collect();
        Self {
            chain_id,
            block_number: 0,
            accounts,
            authorized: false,
            reject_next: false,
            balances,
            token: MockToken::new(token_address),
            nonce: 0,
            receipts: HashMap::new(),
        }
    }

    /// Default accounts on chain 5 with the token at [`DEFAULT_TOKEN_ADDRESS`]
    pub fn with_defaults() -> Self {
        let accounts = DEFAULT_ACCOUNTS
            .iter()
            .filter_map(|a| a.parse().ok())
            .collect();
        let token = DEFAULT_TOKEN_ADDRESS.parse().unwrap_or(Address::ZERO);
        Self::new(DEFAULT_CHAIN_ID, accounts, token)
    }

    pub fn shared(self) -> SharedChain {
        Arc::new(Mutex::new(self))
    }

    pub fn balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    /// Accounts visible to the dApp; empty unless authorised
    pub fn visible_accounts(&self) -> Vec<Address> {
        if self.authorized {
            self.accounts.clone()
        } else {
            Vec::new()
        }
    }

    pub fn request_accounts(&mut self) -> ChainResult<Vec<Address>> {
        if std::mem::take(&mut self.reject_next) {
            log::info!("Account request rejected");
            return Err(ChainError::UserRejected);
        }
        self.authorized = true;
        Ok(self.accounts.clone())
    }

    pub fn revoke(&mut self) {
        self.authorized = false;
    }

    pub fn switch_chain(&mut self, chain_id: u64) {
        log::info!("Switching chain {} -> {}", self.chain_id, chain_id);
        self.chain_id = chain_id;
    }

    pub fn call(&self, call: &TransactionCall) -> ChainResult<Vec<u8>> {
        let to = match call.to.as_deref() {
            Some(to) => parse_address(to)?,
            None => return Err(ChainError::InvalidParams("missing to".to_string())),
        };
        if to != self.token.address {
            return Ok(Vec::new());
        }
        let data = decode_data(call.calldata())?;
        self.token.call(&data)
    }

    /// Mine a transaction into a new block and return its hash
    ///
    /// Native transfers without funds are refused outright; failing token
    /// calls are mined with a failed status.
    pub fn send_transaction(&mut self, call: &TransactionCall) -> ChainResult<String> {
        let from = match call.from.as_deref() {
            Some(from) => parse_address(from)?,
            None => return Err(ChainError::InvalidParams("missing from".to_string())),
        };
        if !self.authorized || !self.accounts.contains(&from) {
            return Err(ChainError::Unauthorized);
        }
        if std::mem::take(&mut self.reject_next) {
            log::info!("Transaction from {} rejected", from);
            return Err(ChainError::UserRejected);
        }

        let to = call.to.as_deref().map(parse_address).transpose()?;
        let value = match call.value.as_deref() {
            Some(v) => abi::parse_quantity(v).map_err(|e| ChainError::InvalidParams(e.to_string()))?,
            None => U256::ZERO,
        };
        let data = decode_data(call.calldata())?;

        let available = self.balance(&from);
        if available < value {
            return Err(ChainError::Execution("insufficient funds for transfer".to_string()));
        }

        let (success, gas) = match to {
            Some(to) if to == self.token.address => {
                let outcome = self.token.execute(from, &data);
                if let Err(ref reason) = outcome {
                    log::info!("Token call from {} reverted: {}", from, reason);
                }
                (outcome.is_ok(), CALL_GAS)
            }
            Some(_) => (true, TRANSFER_GAS),
            None => return Err(ChainError::InvalidParams("contract creation unsupported".to_string())),
        };

        if success && !value.is_zero() {
            if let Some(to) = to {
                self.balances.insert(from, available - value);
                *self.balances.entry(to).or_default() += value;
            }
        }

        let hash = self.next_hash(&from);
        self.block_number += 1;
        let receipt = ReceiptResponse {
            transaction_hash: hash.clone(),
            from: from.to_checksum(None),
            to: to.map(|a| a.to_checksum(None)),
            block_number: abi::u64_quantity(self.block_number),
            cumulative_gas_used: abi::u64_quantity(gas),
            gas_used: abi::u64_quantity(gas),
            status: if success { "0x1" } else { "0x0" }.to_string(),
        };
        log::info!("⛏️  Mined {} in block {}", hash, self.block_number);
        self.receipts.insert(hash.clone(), receipt);
        Ok(hash)
    }

    pub fn receipt(&self, hash: &str) -> Option<ReceiptResponse> {
        self.receipts.get(&hash.to_lowercase()).cloned()
    }

    fn next_hash(&mut self, from: &Address) -> String {
        self.nonce += 1;
        let mut preimage = Vec::with_capacity(36);
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(&self.chain_id.to_be_bytes());
        abi::to_hex_data(keccak256(&preimage).as_slice())
    }
}

fn decode_data(data: Option<&str>) -> ChainResult<Vec<u8>> {
    match data {
        Some(d) => abi::parse_hex_data(d).map_err(|e| ChainError::InvalidParams(e.to_string())),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vl_dapp::abi::IVlToken::{
        addToWhitelistCall, balanceOfCall, mintCall, transferCall,
    };

    fn alice() -> Address {
        DEFAULT_ACCOUNTS[0].parse().unwrap()
    }

    fn bob() -> Address {
        DEFAULT_ACCOUNTS[1].parse().unwrap()
    }

    fn token_call(chain: &MockChain, data: Vec<u8>) -> TransactionCall {
        TransactionCall {
            from: Some(alice().to_string()),
            to: Some(chain.token.address.to_string()),
            data: Some(abi::to_hex_data(&data)),
            ..Default::default()
        }
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * ONE_ETHER
    }

    fn status(chain: &MockChain, hash: &str) -> String {
        chain.receipt(hash).unwrap().status
    }

    #[test]
    fn test_send_requires_authorisation() {
        let mut chain = MockChain::with_defaults();
        let call = TransactionCall {
            from: Some(alice().to_string()),
            to: Some(bob().to_string()),
            value: Some(abi::to_quantity(ONE_ETHER)),
            ..Default::default()
        };
        assert_eq!(chain.send_transaction(&call), Err(ChainError::Unauthorized));

        chain.request_accounts().unwrap();
        let hash = chain.send_transaction(&call).unwrap();
        assert_eq!(status(&chain, &hash), "0x1");
        assert_eq!(chain.balance(&bob()), INITIAL_BALANCE + ONE_ETHER);
        assert_eq!(chain.block_number, 1);
    }

    #[test]
    fn test_reject_next_applies_once() {
        let mut chain = MockChain::with_defaults();
        chain.reject_next = true;
        assert_eq!(chain.request_accounts(), Err(ChainError::UserRejected));
        assert!(!chain.authorized);
        assert_eq!(chain.request_accounts().unwrap().len(), 2);
    }

    #[test]
    fn test_mint_is_whitelist_gated() {
        let mut chain = MockChain::with_defaults();
        chain.request_accounts().unwrap();

        let mint = token_call(&chain, mintCall {}.abi_encode());
        let hash = chain.send_transaction(&mint).unwrap();
        assert_eq!(status(&chain, &hash), "0x0");
        assert_eq!(chain.token.balance_of(&alice()), U256::ZERO);

        let whitelist = token_call(&chain, addToWhitelistCall { account: alice() }.abi_encode());
        chain.send_transaction(&whitelist).unwrap();
        let hash = chain.send_transaction(&mint).unwrap();
        assert_eq!(status(&chain, &hash), "0x1");
        assert_eq!(chain.token.balance_of(&alice()), MINT_AMOUNT);
    }

    #[test]
    fn test_token_transfer_and_reads() {
        let mut chain = MockChain::with_defaults();
        chain.request_accounts().unwrap();
        chain.token.balances.insert(alice(), ether(5));

        let transfer = token_call(&chain, transferCall { to: bob(), amount: ether(2) }.abi_encode());
        chain.send_transaction(&transfer).unwrap();

        let read = token_call(&chain, balanceOfCall { account: bob() }.abi_encode());
        let out = chain.call(&read).unwrap();
        assert_eq!(balanceOfCall::abi_decode_returns(&out, true).unwrap()._0, ether(2));

        // overdraft reverts without moving funds
        let overdraft = token_call(&chain, transferCall { to: bob(), amount: ether(10) }.abi_encode());
        let hash = chain.send_transaction(&overdraft).unwrap();
        assert_eq!(status(&chain, &hash), "0x0");
        assert_eq!(chain.token.balance_of(&alice()), ether(3));
    }

    #[test]
    fn test_hashes_are_unique() {
        let mut chain = MockChain::with_defaults();
        chain.request_accounts().unwrap();
        let call = TransactionCall {
            from: Some(alice().to_string()),
            to: Some(bob().to_string()),
            ..Default::default()
        };
        let first = chain.send_transaction(&call).unwrap();
        let second = chain.send_transaction(&call).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 66);
    }
}
