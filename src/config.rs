//! Core settings shared by the controller and its components

use std::time::Duration;

use crate::units::ETHER_DECIMALS;

/// Symbol and decimals of a tracked asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl AssetInfo {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DappConfig {
    /// Chain's base asset (`ETH`)
    pub native: AssetInfo,
    /// The ERC-20 token tracked alongside it (`VL`)
    pub token: AssetInfo,
    /// When set, submissions are refused on any other network
    pub expected_network: Option<String>,
    /// Upper bound on broadcast + first confirmation
    pub receipt_timeout: Duration,
}

impl DappConfig {
    /// Which asset a form symbol refers to; `None` for unknown symbols
    pub fn asset(&self, symbol: &str) -> Option<&AssetInfo> {
        if symbol.eq_ignore_ascii_case(&self.native.symbol) {
            Some(&self.native)
        } else if symbol.eq_ignore_ascii_case(&self.token.symbol) {
            Some(&self.token)
        } else {
            None
        }
    }

    pub fn is_native(&self, symbol: &str) -> bool {
        symbol.eq_ignore_ascii_case(&self.native.symbol)
    }
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            native: AssetInfo::new("ETH", ETHER_DECIMALS),
            token: AssetInfo::new("VL", 18),
            expected_network: None,
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_lookup() {
        let config = DappConfig::default();
        assert_eq!(config.asset("eth").unwrap().symbol, "ETH");
        assert_eq!(config.asset("VL").unwrap().decimals, 18);
        assert!(config.asset("DAI").is_none());
        assert!(config.is_native("ETH"));
        assert!(!config.is_native("VL"));
    }
}
