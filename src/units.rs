//! Decimal <-> base-unit conversion
//!
//! Amounts are exact [`U256`] base units (wei for the native asset, token
//! units for ERC-20). The arithmetic is alloy's `parse_units` /
//! `format_units`; this module adds the input rules the send form needs.

use alloy_primitives::utils;
use alloy_primitives::U256;

use crate::error::DappError;
use crate::Result;

/// Canonical zero used when a balance cannot be read
pub const ZERO: &str = "0";

/// Decimals of the native asset
pub const ETHER_DECIMALS: u8 = 18;

/// Largest decimal digit count that always fits in a `uint256`
const MAX_DIGITS: usize = 77;

/// True when `value` matches `^\d*\.?\d*$` (the empty string included)
pub fn is_unsigned_decimal(value: &str) -> bool {
    let mut seen_dot = false;
    for c in value.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    true
}

/// Parses a non-negative decimal string into base units
///
/// `"1.5"` with 18 decimals gives `1.5e18`. Rejects signs, exponents,
/// empty input, a lone `.`, more fractional digits than `decimals` and
/// values that do not fit in 256 bits.
pub fn parse_amount(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() || !is_unsigned_decimal(value) {
        return Err(DappError::InvalidAmount(value.to_string()));
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(DappError::InvalidAmount(value.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(DappError::InvalidAmount(format!(
            "{} has more than {} fractional digits",
            value, decimals
        )));
    }
    if whole.trim_start_matches('0').len() + decimals as usize > MAX_DIGITS {
        return Err(DappError::InvalidAmount(format!("{} is too large", value)));
    }

    utils::parse_units(value, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| DappError::InvalidAmount(format!("{}: {}", value, e)))
}

/// Formats base units as a decimal string without trailing zeros
///
/// `1.5e18` with 18 decimals gives `"1.5"`, zero gives `"0"`.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    match utils::format_units(amount, decimals) {
        Ok(formatted) if formatted.contains('.') => formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Ok(formatted) => formatted,
        Err(e) => {
            log::warn!("Cannot format {} with {} decimals: {}", amount, decimals, e);
            amount.to_string()
        }
    }
}
