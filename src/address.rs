//! Account addresses
//!
//! [`Address`] is alloy's 20-byte address. User input goes through
//! [`parse_address`], which applies the EIP-55 rules wallets use: a
//! single-case string is taken as is, mixed case must match the checksum.

pub use alloy_primitives::Address;

use crate::error::DappError;
use crate::Result;

/// Parses a `0x`-prefixed or bare 40-hex-digit address
pub fn parse_address(s: &str) -> Result<Address> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DappError::InvalidAddress(s.to_string()));
    }

    let address: Address = digits
        .parse()
        .map_err(|e| DappError::InvalidAddress(format!("{}: {}", s, e)))?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *digits {
        return Err(DappError::InvalidAddress(format!("bad checksum: {}", s)));
    }

    Ok(address)
}

pub fn is_valid_address(candidate: &str) -> bool {
    parse_address(candidate).is_ok()
}

/// Shortens an address for display: `0x5aAe...eAed`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Serde adapter writing addresses in EIP-55 form
pub mod checksummed {
    use super::{parse_address, Address};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&address.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(serde::de::Error::custom)
    }
}

/// [`checksummed`] for optional fields
pub mod checksummed_opt {
    use super::{parse_address, Address};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        address: &Option<Address>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match address {
            Some(address) => serializer.serialize_some(&address.to_checksum(None)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Address>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_address(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
