//! JSON-RPC Provider Integration Tests
//!
//! Runs `JsonRpcProvider` against an in-process mock node.
//!
//! Run with: cargo test -p wallet --test rpc_provider_test -- --nocapture

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use vl_dapp::{
    Address, DappError, Erc20Token, ProviderEvent, TokenContract, TransactionRequest,
    WalletProvider,
};
use wallet::rpc::{spawn_watcher, JsonRpcProvider};

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

async fn provider() -> anyhow::Result<(MockNode, Arc<JsonRpcProvider>)> {
    init_logger();
    let node = MockNode::start().await?;
    let provider = Arc::new(JsonRpcProvider::new(node.url.clone(), Duration::from_millis(20)));
    Ok((node, provider))
}

#[tokio::test]
async fn test_accounts_and_network() -> anyhow::Result<()> {
    let (_node, provider) = provider().await?;

    assert!(provider.list_accounts().await?.is_empty());
    assert_eq!(provider.request_accounts().await?[0], addr(ALICE));
    assert_eq!(provider.signer_address().await?, addr(ALICE));

    let network = provider.get_network().await?;
    assert_eq!(network.chain_id, 5);
    assert_eq!(network.name, "goerli");

    assert_eq!(provider.get_balance(addr(ALICE)).await?, wei(100 * ONE_ETHER));
    Ok(())
}

#[tokio::test]
async fn test_rejected_request_maps_to_access_rejected() -> anyhow::Result<()> {
    let (node, provider) = provider().await?;
    node.with(|chain| chain.reject_next = true);

    let err = provider.request_accounts().await.unwrap_err();
    assert!(matches!(err, DappError::AccessRejected(_)));
    assert!(provider.list_accounts().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_send_and_wait_for_receipt() -> anyhow::Result<()> {
    let (node, provider) = provider().await?;
    provider.request_accounts().await?;

    let tx = TransactionRequest::transfer(addr(BOB), wei(ONE_ETHER)).from(addr(ALICE));
    let hash = provider.send_transaction(tx).await?;
    let receipt = provider.wait_for_receipt(hash).await?;

    assert!(receipt.success);
    assert_eq!(receipt.transaction_hash, hash);
    assert_eq!(receipt.from, addr(ALICE));
    assert_eq!(receipt.to, Some(addr(BOB)));
    assert_eq!(receipt.block_number, 1);
    assert_eq!(receipt.cumulative_gas_used, 21_000);
    assert_eq!(node.with(|chain| chain.balance(&addr(BOB))), wei(101 * ONE_ETHER));
    Ok(())
}

#[tokio::test]
async fn test_token_calls_through_provider() -> anyhow::Result<()> {
    let (node, provider) = provider().await?;
    provider.request_accounts().await?;
    let token_address = node.with(|chain| chain.token.address);
    let token = Erc20Token::new(token_address, provider.clone());

    assert!(!token.verify_whitelist(addr(ALICE)).await?);

    let hash = token.add_to_whitelist(addr(ALICE)).await?;
    assert!(provider.wait_for_receipt(hash).await?.success);
    assert!(token.verify_whitelist(addr(ALICE)).await?);

    let hash = token.mint().await?;
    assert!(provider.wait_for_receipt(hash).await?.success);
    assert_eq!(token.balance_of(addr(ALICE)).await?, wei(100 * ONE_ETHER));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_node() {
    init_logger();
    // port 9 (discard) is not listening on test machines
    let provider = JsonRpcProvider::new("http://127.0.0.1:9", Duration::from_millis(20));
    let err = provider.get_network().await.unwrap_err();
    assert!(matches!(err, DappError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn test_watcher_emits_network_and_account_changes() -> anyhow::Result<()> {
    let (node, provider) = provider().await?;
    let mut events = provider.subscribe();
    let watcher = spawn_watcher(&provider);

    let first = tokio::time::timeout(Duration::from_secs(2), events.recv()).await??;
    assert_eq!(
        first,
        ProviderEvent::NetworkChanged {
            new: vl_dapp::Network::from_chain_id(5),
            old: None,
        }
    );

    node.with(|chain| chain.switch_chain(11155111));
    let second = tokio::time::timeout(Duration::from_secs(2), events.recv()).await??;
    match second {
        ProviderEvent::NetworkChanged { new, old } => {
            assert_eq!(new.name, "sepolia");
            assert_eq!(old.map(|n| n.chain_id), Some(5));
        }
        other => panic!("unexpected event {:?}", other),
    }

    provider.request_accounts().await?;
    let third = tokio::time::timeout(Duration::from_secs(2), events.recv()).await??;
    assert_eq!(
        third,
        ProviderEvent::AccountsChanged(vec![addr(ALICE), addr(BOB)])
    );

    watcher.abort();
    Ok(())
}
