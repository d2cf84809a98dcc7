//! # In-Memory Stores
//!
//! Test/development implementations of [`TargetStore`] and
//! [`ConfirmationStore`]. The target store performs the conditional
//! channel-state merge under its lock, so interleaved writers observe the
//! same first-write-wins semantics a production conditional update would
//! enforce. Both stores support injected failures for exercising the
//! session's post-anchor error path.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use evanchor_core::{ChannelState, TargetRef};

use crate::confirmation::{Confirmation, ConfirmationRecord, ConfirmationStore};
use crate::error::StoreError;
use crate::target::{Target, TargetStore};

/// In-memory target store. Cheap to clone; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTargetStore {
    inner: Arc<Mutex<TargetStoreInner>>,
}

#[derive(Debug, Default)]
struct TargetStoreInner {
    targets: HashMap<(String, String), Target>,
    fail_next_update: bool,
}

fn key(target: &TargetRef) -> (String, String) {
    (target.kind.as_str().to_string(), target.id.as_str().to_string())
}

impl MemoryTargetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a target (test setup).
    pub fn insert(&self, target: Target) {
        self.inner
            .lock()
            .targets
            .insert(key(&target.target_ref()), target);
    }

    /// Fetch a target synchronously (test assertions).
    pub fn get(&self, target: &TargetRef) -> Option<Target> {
        self.inner.lock().targets.get(&key(target)).cloned()
    }

    /// Make the next `merge_channel_state` call fail with a backend error.
    pub fn fail_next_update(&self) {
        self.inner.lock().fail_next_update = true;
    }
}

impl TargetStore for MemoryTargetStore {
    async fn read(&self, target: &TargetRef) -> Result<Target, StoreError> {
        self.inner
            .lock()
            .targets
            .get(&key(target))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: target.kind,
                id: target.id.clone(),
            })
    }

    async fn merge_channel_state(
        &self,
        target: &TargetRef,
        state: &ChannelState,
    ) -> Result<Target, StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_update {
            inner.fail_next_update = false;
            return Err(StoreError::Backend(
                "injected target update failure".to_string(),
            ));
        }
        let stored = inner
            .targets
            .get_mut(&key(target))
            .ok_or_else(|| StoreError::NotFound {
                kind: target.kind,
                id: target.id.clone(),
            })?;
        // Merge against the record as stored right now, not as the caller
        // last read it.
        let existing = stored.channel_state()?.unwrap_or_default();
        let merged = state.merged_over(&existing);
        stored.set_channel_state(&merged)?;
        Ok(stored.clone())
    }
}

/// In-memory confirmation store. Cheap to clone; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfirmationStore {
    inner: Arc<Mutex<ConfirmationStoreInner>>,
}

#[derive(Debug, Default)]
struct ConfirmationStoreInner {
    records: Vec<ConfirmationRecord>,
    fail_next_create: bool,
}

impl MemoryConfirmationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All confirmations created so far, in creation order.
    pub fn created(&self) -> Vec<ConfirmationRecord> {
        self.inner.lock().records.clone()
    }

    /// Make the next `create` call fail with a backend error.
    pub fn fail_next_create(&self) {
        self.inner.lock().fail_next_create = true;
    }
}

impl ConfirmationStore for MemoryConfirmationStore {
    async fn create(&self, confirmation: Confirmation) -> Result<ConfirmationRecord, StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_create {
            inner.fail_next_create = false;
            return Err(StoreError::Backend(
                "injected confirmation create failure".to_string(),
            ));
        }
        let record = ConfirmationRecord {
            id: format!("conf-{}", inner.records.len() + 1),
            confirmation,
        };
        inner.records.push(record.clone());
        Ok(record)
    }
}
