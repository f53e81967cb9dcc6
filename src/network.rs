//! Chain identification and block explorer links

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

/// Explorer used when a network has no entry of its own
pub const DEFAULT_EXPLORER: &str = "https://etherscan.io";

/// Network name to block explorer base URL
pub const EXPLORERS: [(&str, &str); 3] = [
    ("homestead", "https://etherscan.io"),
    ("goerli", "https://goerli.etherscan.io"),
    ("sepolia", "https://sepolia.etherscan.io"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

impl Network {
    /// Names follow the ethers convention; anything unlisted is `unknown`
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = match chain_id {
            1 => "homestead",
            5 => "goerli",
            11155111 => "sepolia",
            _ => "unknown",
        };
        Self {
            chain_id,
            name: name.to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name == "homestead" {
            "Ethereum Mainnet"
        } else {
            &self.name
        }
    }

    /// Matches either the network name or its decimal chain id
    pub fn matches(&self, expected: &str) -> bool {
        self.name.eq_ignore_ascii_case(expected) || self.chain_id.to_string() == expected
    }

    pub fn explorer_base_url(&self) -> &'static str {
        explorer_base_url(&self.name)
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_base_url(), tx_hash)
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer_base_url(), address)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

pub fn explorer_base_url(network_name: &str) -> &'static str {
    EXPLORERS
        .iter()
        .find(|(name, _)| *name == network_name)
        .map(|(_, url)| *url)
        .unwrap_or(DEFAULT_EXPLORER)
}
