//! VL token contract capability and its ERC-20 call encoding

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;

use crate::abi::IVlToken;
use crate::address::Address;
use crate::error::DappError;
use crate::provider::{TransactionRequest, TxHash, WalletProvider};
use crate::Result;

/// Entry points of the token contract
///
/// Write methods return as soon as the transaction is broadcast; waiting
/// for the receipt is up to the caller.
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    async fn balance_of(&self, owner: Address) -> Result<U256>;

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash>;

    /// Fixed-size mint to the caller
    async fn mint(&self) -> Result<TxHash>;

    async fn add_to_whitelist(&self, account: Address) -> Result<TxHash>;

    async fn verify_whitelist(&self, account: Address) -> Result<bool>;
}

/// Token contract reached through a wallet provider's signer
pub struct Erc20Token {
    address: Address,
    provider: Arc<dyn WalletProvider>,
}

impl Erc20Token {
    pub fn new(address: Address, provider: Arc<dyn WalletProvider>) -> Self {
        Self { address, provider }
    }

    async fn read<C: SolCall + Send + Sync>(&self, call: C) -> Result<C::Return> {
        let output = self
            .provider
            .call(TransactionRequest::call(self.address, call.abi_encode()))
            .await?;
        C::abi_decode_returns(&output, true)
            .map_err(|e| DappError::Abi(format!("{} returned bad data: {}", C::SIGNATURE, e)))
    }

    async fn write<C: SolCall + Send + Sync>(&self, call: C) -> Result<TxHash> {
        let from = self.provider.signer_address().await?;
        log::debug!("Sending {} to token {} from {}", C::SIGNATURE, self.address, from);
        self.provider
            .send_transaction(TransactionRequest::call(self.address, call.abi_encode()).from(from))
            .await
    }
}

#[async_trait]
impl TokenContract for Erc20Token {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let output = self.read(IVlToken::balanceOfCall { account: owner }).await?;
        Ok(output._0)
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash> {
        self.write(IVlToken::transferCall { to, amount }).await
    }

    async fn mint(&self) -> Result<TxHash> {
        self.write(IVlToken::mintCall {}).await
    }

    async fn add_to_whitelist(&self, account: Address) -> Result<TxHash> {
        self.write(IVlToken::addToWhitelistCall { account }).await
    }

    async fn verify_whitelist(&self, account: Address) -> Result<bool> {
        let output = self.read(IVlToken::verifyWhitelistCall { account }).await?;
        Ok(output._0)
    }
}
