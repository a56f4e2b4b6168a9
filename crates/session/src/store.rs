//! Persistence seam between the engine and the hosting shell.
//!
//! The engine never touches the disk; it hands opaque blobs across this
//! trait. Shells back it with whatever key-value storage the platform
//! offers.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::snapshot::Snapshot;

const SNAPSHOT_KEY: &str = "session:snapshot";

/// Key-value persistence provided by the hosting shell.
pub trait SnapshotStore {
    /// Reads the raw blob stored at `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes the raw blob at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Serializes an engine snapshot into the store.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub fn save_snapshot(store: &mut impl SnapshotStore, snapshot: &Snapshot) -> Result<()> {
    let bytes = serde_json::to_vec(snapshot).context("serializing snapshot")?;
    store.set(SNAPSHOT_KEY, &bytes)
}

/// Loads the stored snapshot, if one exists.
///
/// # Errors
///
/// Returns an error when the store read or deserialization fails.
pub fn load_snapshot(store: &impl SnapshotStore) -> Result<Option<Snapshot>> {
    let Some(bytes) = store.get(SNAPSHOT_KEY)? else {
        return Ok(None);
    };
    let snapshot = serde_json::from_slice(&bytes).context("deserializing snapshot")?;
    Ok(Some(snapshot))
}

/// In-memory store for tests and desktop shells.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
