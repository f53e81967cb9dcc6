//! Form input validation
//!
//! Pure checks used to decide whether the send form may be submitted.

use crate::address::parse_address;
use crate::units::{self, ETHER_DECIMALS};

/// Destination must be a valid address and not the caller's own
///
/// Comparison is on the parsed address, so a self-send written in a
/// different letter case is still rejected.
pub fn is_valid_destination(candidate: &str, self_address: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let Ok(destination) = parse_address(candidate) else {
        return false;
    };
    match parse_address(self_address) {
        Ok(own) => destination != own,
        Err(_) => candidate != self_address,
    }
}

/// Amount must be strictly positive and no larger than `balance`
///
/// Both values are compared as exact base units with 18 fractional digits.
pub fn is_valid_amount(candidate: &str, balance: &str) -> bool {
    is_valid_amount_with_decimals(candidate, balance, ETHER_DECIMALS)
}

/// Same as [`is_valid_amount`] for an asset with `decimals` fractional digits
pub fn is_valid_amount_with_decimals(candidate: &str, balance: &str, decimals: u8) -> bool {
    let Ok(amount) = units::parse_amount(candidate, decimals) else {
        return false;
    };
    let Ok(available) = units::parse_amount(balance, decimals) else {
        return false;
    };
    !amount.is_zero() && amount <= available
}

/// Amount text field state
///
/// Only values matching an unsigned decimal are stored; anything else is
/// dropped without an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmountInput {
    value: String,
}

impl AmountInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Applies one keystroke; returns whether it was kept
    pub fn push(&mut self, c: char) -> bool {
        let mut next = self.value.clone();
        next.push(c);
        self.replace(&next)
    }

    /// Applies a burst of keystrokes (typed ahead or pasted)
    ///
    /// Characters are applied in order until one is rejected; that one and
    /// everything after it in the burst are dropped.
    pub fn feed<I: IntoIterator<Item = char>>(&mut self, keystrokes: I) -> &str {
        for c in keystrokes {
            if !self.push(c) {
                break;
            }
        }
        &self.value
    }

    /// Applies a whole new field value (paste, programmatic set)
    pub fn replace(&mut self, next: &str) -> bool {
        if units::is_unsigned_decimal(next) {
            self.value = next.to_string();
            true
        } else {
            false
        }
    }

    /// Removes the last character
    pub fn backspace(&mut self) {
        self.value.pop();
    }
}
