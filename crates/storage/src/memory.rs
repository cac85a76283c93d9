//! In-Memory Snapshot Source

use crate::{SnapshotDocument, StorageError};
use chrono::Utc;
use feature_engine::SensorSnapshot;
use std::sync::RwLock;
use tracing::{debug, info};

/// Holds at most one snapshot; used for local runs and tests
pub struct InMemorySource {
    latest: RwLock<Option<SnapshotDocument>>,
}

impl InMemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        info!("Creating in-memory snapshot source");
        Self {
            latest: RwLock::new(None),
        }
    }

    /// Create a source that already holds a snapshot
    pub fn with_snapshot(snapshot: SensorSnapshot) -> Self {
        let source = Self::new();
        *source.latest.write().unwrap_or_else(|e| e.into_inner()) = Some(SnapshotDocument {
            snapshot,
            update_time: Some(Utc::now()),
        });
        source
    }

    /// Replace the latest snapshot
    pub fn publish(&self, snapshot: SensorSnapshot) -> Result<(), StorageError> {
        let mut latest = self
            .latest
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        debug!("Publishing snapshot {:?}", snapshot);
        *latest = Some(SnapshotDocument {
            snapshot,
            update_time: Some(Utc::now()),
        });
        Ok(())
    }

    /// Drop the latest snapshot
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut latest = self
            .latest
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        *latest = None;
        Ok(())
    }

    pub fn fetch_latest(&self) -> Result<Option<SnapshotDocument>, StorageError> {
        let latest = self
            .latest
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(latest.clone())
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}
