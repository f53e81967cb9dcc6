//! Token contract ABI and JSON-RPC hex encoding

use alloy_primitives::{hex, U256};
use alloy_sol_types::sol;

use crate::error::DappError;

sol! {
    /// Entry points of the VL token contract
    interface IVlToken {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function mint() external;
        function addToWhitelist(address account) external;
        function verifyWhitelist(address account) external view returns (bool);
    }
}

// ============================================================================
// JSON-RPC hex encoding
// ============================================================================

/// `0x`-prefixed quantity without leading zeros (`0x0` for zero)
pub fn to_quantity(value: U256) -> String {
    if value.is_zero() {
        "0x0".to_string()
    } else {
        format!("0x{:x}", value)
    }
}

pub fn u64_quantity(value: u64) -> String {
    format!("{:#x}", value)
}

fn quantity_digits(value: &str) -> Result<&str, DappError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| DappError::invalid_response(format!("quantity without 0x: {}", value)))?;
    if digits.is_empty() {
        return Err(DappError::invalid_response("empty quantity"));
    }
    Ok(digits)
}

pub fn parse_quantity(value: &str) -> Result<U256, DappError> {
    U256::from_str_radix(quantity_digits(value)?, 16)
        .map_err(|e| DappError::invalid_response(format!("bad quantity {}: {}", value, e)))
}

/// Block numbers, chain ids and gas counters
pub fn parse_u64_quantity(value: &str) -> Result<u64, DappError> {
    u64::from_str_radix(quantity_digits(value)?, 16)
        .map_err(|e| DappError::invalid_response(format!("bad quantity {}: {}", value, e)))
}

pub fn to_hex_data(data: &[u8]) -> String {
    hex::encode_prefixed(data)
}

pub fn parse_hex_data(value: &str) -> Result<Vec<u8>, DappError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| DappError::invalid_response(format!("bad hex data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::IVlToken::{balanceOfCall, mintCall, transferCall, verifyWhitelistCall};
    use super::*;
    use alloy_primitives::Address;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(transferCall::SELECTOR), "a9059cbb");
        assert_eq!(hex::encode(balanceOfCall::SELECTOR), "70a08231");
        assert_eq!(hex::encode(mintCall::SELECTOR), "1249c58b");
    }

    #[test]
    fn test_transfer_calldata_layout() {
        let to: Address = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".parse().unwrap();
        let data = transferCall { to, amount: U256::from(1000) }.abi_encode();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[..4], transferCall::SELECTOR);

        let decoded = transferCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.amount, U256::from(1000));
    }

    #[test]
    fn test_balance_word_above_u128() {
        // high 16 bytes of the word set
        let mut word = [0u8; 32];
        word[0] = 0x01;
        word[15] = 0x01;
        let balance = balanceOfCall::abi_decode_returns(&word, true).unwrap()._0;
        assert!(balance > U256::from(u128::MAX));
        assert_eq!(balance, U256::from_be_bytes(word));
    }

    #[test]
    fn test_bool_returns() {
        let yes = verifyWhitelistCall::abi_encode_returns(&(true,));
        let no = verifyWhitelistCall::abi_encode_returns(&(false,));
        assert!(verifyWhitelistCall::abi_decode_returns(&yes, true).unwrap()._0);
        assert!(!verifyWhitelistCall::abi_decode_returns(&no, true).unwrap()._0);
    }

    #[test]
    fn test_quantities() {
        assert_eq!(to_quantity(U256::ZERO), "0x0");
        assert_eq!(to_quantity(U256::from(255)), "0xff");
        assert_eq!(u64_quantity(0), "0x0");
        assert_eq!(u64_quantity(21_000), "0x5208");
        assert_eq!(
            parse_quantity("0x1bc16d674ec80000").unwrap(),
            U256::from(2_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_u64_quantity("0x5208").unwrap(), 21_000);
        assert!(parse_quantity("12").is_err());
        assert!(parse_quantity("0x").is_err());
        assert_eq!(parse_hex_data("0x").unwrap(), Vec::<u8>::new());
    }
}
