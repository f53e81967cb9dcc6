//! Persisted connection intent
//!
//! The only state the dApp keeps across restarts is whether the user last
//! chose to be connected. It lives in a plain string key-value store.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::DappError;
use crate::Result;

/// Storage key of the connection intent flag
pub const WALLET_STATUS_KEY: &str = "wallet_status";

/// String key-value storage that survives restarts
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionIntent {
    Connected,
    Disconnected,
}

impl ConnectionIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }

    /// Missing or unreadable values count as disconnected
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(WALLET_STATUS_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or(Self::Disconnected),
            Ok(None) => Self::Disconnected,
            Err(e) => {
                log::warn!("Failed to read connection intent: {}", e);
                Self::Disconnected
            }
        }
    }

    pub fn save(self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(WALLET_STATUS_KEY, self.as_str())
    }
}

impl FromStr for ConnectionIntent {
    type Err = DappError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            other => Err(DappError::storage(format!("unknown wallet status: {}", other))),
        }
    }
}

impl fmt::Display for ConnectionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-process store, for tests and embedders without a disk
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DappError::storage("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DappError::storage("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_defaults_to_disconnected() {
        let store = MemoryStore::new();
        assert_eq!(ConnectionIntent::load(&store), ConnectionIntent::Disconnected);

        store.set(WALLET_STATUS_KEY, "garbage").unwrap();
        assert_eq!(ConnectionIntent::load(&store), ConnectionIntent::Disconnected);
    }

    #[test]
    fn test_intent_last_writer_wins() {
        let store = MemoryStore::new();
        ConnectionIntent::Connected.save(&store).unwrap();
        assert_eq!(ConnectionIntent::load(&store), ConnectionIntent::Connected);
        ConnectionIntent::Disconnected.save(&store).unwrap();
        assert_eq!(
            store.get(WALLET_STATUS_KEY).unwrap().as_deref(),
            Some("disconnected")
        );
    }
}
