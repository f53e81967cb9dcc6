use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use vl_dapp::{DappError, KeyValueStore};

use super::models::StoredState;
use crate::error::StorageError;

const STATE_FILE: &str = "state.json";

/// Key-value store backed by a single JSON file
pub struct Storage {
    base_path: PathBuf,
    // serialises read-modify-write of the state file
    lock: Mutex<()>,
}

impl Storage {
    /// Create a new storage instance with the default base directory ("./dapp-data")
    pub fn new() -> Self {
        Self::new_with_base_dir(PathBuf::from("./dapp-data"))
    }

    /// Create storage with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self {
            base_path,
            lock: Mutex::new(()),
        }
    }

    /// Get the base directory path
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn state_path(&self) -> PathBuf {
        self.base_path.join(STATE_FILE)
    }

    /// Load the state file; a missing file is an empty state
    pub fn load_state(&self) -> Result<StoredState, StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(StoredState::default());
        }
        let contents = fs::read_to_string(path)?;
        let state = serde_json::from_str(&contents)?;
        Ok(state)
    }

    /// Save the state file, creating the base directory if needed
    ///
    /// The new contents are written beside the old file and renamed over
    /// it, so readers see either the previous or the next state in full.
    pub fn save_state(&self, state: &StoredState) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;
        let json = serde_json::to_string_pretty(state)?;

        let mut file = NamedTempFile::new_in(&self.base_path)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.state_path()).map_err(|e| e.error)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut StoredState),
    {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut state = self.load_state()?;
        f(&mut state);
        self.save_state(&state)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>, DappError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let state = self.load_state()?;
        Ok(state.get(key).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DappError> {
        self.update(|state| state.set(key, value))?;
        log::debug!("Stored {} = {}", key, value);
        Ok(())
    }
}
