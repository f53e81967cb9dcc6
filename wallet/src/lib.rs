//! VL dApp wallet server
//!
//! Hosts a [`vl_dapp::DappController`] behind a JSON HTTP API and talks to
//! an Ethereum node over JSON-RPC.

pub mod api;
pub mod config;
pub mod error;
pub mod manager;
pub mod rpc;
pub mod storage;
