//! Collection ↔ durable blob storage.
//!
//! The store is a save file: read once on boot, overwritten after every
//! mutation. It is never queried at runtime; the World is the runtime truth.
//! The whole collection is one JSON array under a single key.

use crate::world::Task;
use redb::{Database, TableDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(feature = "profile")]
use std::time::Instant;

/// The one key the collection lives under.
pub const COLLECTION_KEY: &str = "todos";

const BLOBS: TableDefinition<&str, &str> = TableDefinition::new("blobs");

// ── Store contract ─────────────────────────────────────────────

/// Key-value blob storage that outlives the process.
///
/// `read` returns `Ok(None)` for a key that was never written.
/// `write` replaces whatever was stored under `key`.
pub trait DurableStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

impl<S: DurableStore + ?Sized> DurableStore for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        (**self).write(key, blob)
    }
}

impl<S: DurableStore + ?Sized> DurableStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        (**self).write(key, blob)
    }
}

// ── redb ───────────────────────────────────────────────────────

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct SaveFile {
    db: Arc<Database>,
}

impl SaveFile {
    /// Open (or create) the save file at the given path.
    /// Creates the blob table if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(BLOBS)?;
        }
        txn.commit()?;

        Ok(SaveFile { db: Arc::new(db) })
    }
}

impl DurableStore for SaveFile {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BLOBS)?;
        let blob = table.get(key)?.map(|value| value.value().to_string());
        Ok(blob)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        #[cfg(feature = "profile")]
        let total_start = Instant::now();
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BLOBS)?;
            table.insert(key, blob)?;
        }
        txn.commit()?;
        #[cfg(feature = "profile")]
        tracing::debug!(
            key,
            bytes = blob.len(),
            total_us = total_start.elapsed().as_micros() as u64,
            "save file write committed"
        );
        Ok(())
    }
}

// ── In-memory ──────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart; handy for tests and
/// throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `blob` under `key`.
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.into());
        store
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

// ── Codec ──────────────────────────────────────────────────────

pub fn encode_tasks(tasks: &[Task]) -> Result<String, StoreError> {
    serde_json::to_string(tasks).map_err(|e| StoreError::Encode(e.to_string()))
}

pub fn decode_tasks(blob: &str) -> Result<Vec<Task>, StoreError> {
    serde_json::from_str(blob).map_err(|e| StoreError::Decode(e.to_string()))
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Redb(e) => write!(f, "redb: {e}"),
            StoreError::Decode(e) => write!(f, "decode: {e}"),
            StoreError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ── Tests ──────────────────────────────────────────────────────
