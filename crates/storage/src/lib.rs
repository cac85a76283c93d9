//! Snapshot Storage
//!
//! Read-only access to the latest soil reading published by the field
//! sensor node, either from a Firestore document or from memory.

mod firestore;
mod memory;

pub use firestore::{FirestoreConfig, FirestoreSource};
pub use memory::InMemorySource;

use chrono::{DateTime, Utc};
use feature_engine::SensorSnapshot;
use serde::Serialize;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Document store returned HTTP {0}")]
    Http(u16),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Latest snapshot plus document metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDocument {
    pub snapshot: SensorSnapshot,
    /// Last write time reported by the store
    pub update_time: Option<DateTime<Utc>>,
}

/// Where the latest snapshot is read from
pub enum SnapshotStore {
    Firestore(FirestoreSource),
    Memory(InMemorySource),
}

impl SnapshotStore {
    /// Fetch the latest snapshot; `Ok(None)` when nothing has been published
    pub async fn fetch_latest(&self) -> Result<Option<SnapshotDocument>, StorageError> {
        match self {
            SnapshotStore::Firestore(source) => source.fetch_latest().await,
            SnapshotStore::Memory(source) => source.fetch_latest(),
        }
    }

    /// Backend name for health reporting
    pub fn kind(&self) -> &'static str {
        match self {
            SnapshotStore::Firestore(_) => "firestore",
            SnapshotStore::Memory(_) => "memory",
        }
    }
}
