/// EVM Mock Node Library
///
/// This crate provides both a standalone binary and library components
/// for an in-memory Ethereum JSON-RPC node hosting the VL token.

pub mod chain;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use chain::{ChainError, MockChain, MockToken, SharedChain};
pub use server::{create_router, run_server};
pub use types::*;
