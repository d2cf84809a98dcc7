//! # Target Records and the Target Store
//!
//! A target is the mutable business entity an anchored event pertains to.
//! It owns a bag of custom metadata fields; the anchoring channel state
//! lives under one well-known key in that bag
//! ([`ChannelState::CUSTOM_FIELD`]) and everything else belongs to other
//! consumers and must be preserved untouched.
//!
//! ## Design Decision
//!
//! The store update is not a plain last-write `update(partial)` — it is
//! [`TargetStore::merge_channel_state`], a conditional merge the
//! implementation applies atomically against its *current* stored record
//! using [`ChannelState::merged_over`]. Two invocations racing on the same
//! target therefore cannot replace the channel identity or the root
//! reference; only the next anchorage is last-write-wins. Serializing
//! invocations per target (to also protect the ledger-side chain
//! continuity) remains the calling framework's responsibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use evanchor_core::{ChannelState, TargetId, TargetKind, TargetRef};

use crate::error::StoreError;

/// A target entity: id, kind, and its custom metadata bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// The entity's identifier.
    pub id: TargetId,
    /// The entity's kind.
    pub kind: TargetKind,
    /// Custom metadata fields. The anchoring sub-record occupies the
    /// [`ChannelState::CUSTOM_FIELD`] key; all other keys are foreign and
    /// must survive updates unchanged.
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, Value>,
}

impl Target {
    /// Build a target with an empty metadata bag.
    pub fn new(kind: TargetKind, id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            kind,
            custom_fields: serde_json::Map::new(),
        }
    }

    /// Builder-style addition of a custom field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.custom_fields.insert(key.into(), value);
        self
    }

    /// A `(kind, id)` reference to this target.
    pub fn target_ref(&self) -> TargetRef {
        TargetRef {
            kind: self.kind,
            id: self.id.clone(),
        }
    }

    /// Decode the anchoring channel sub-record, if present.
    ///
    /// # Errors
    ///
    /// [`StoreError::MalformedChannelState`] if the stored value under the
    /// channel key does not decode. A malformed record is never treated as
    /// "no channel" — that would silently create a second channel for a
    /// target that already has one.
    pub fn channel_state(&self) -> Result<Option<ChannelState>, StoreError> {
        match self.custom_fields.get(ChannelState::CUSTOM_FIELD) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| StoreError::MalformedChannelState {
                    kind: self.kind,
                    id: self.id.clone(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Write the anchoring channel sub-record into the metadata bag,
    /// leaving all other fields untouched.
    pub fn set_channel_state(&mut self, state: &ChannelState) -> Result<(), StoreError> {
        let value = serde_json::to_value(state).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.custom_fields
            .insert(ChannelState::CUSTOM_FIELD.to_string(), value);
        Ok(())
    }
}

/// Read/merge-update access to target entities.
///
/// Implementations must be `Send + Sync` for sharing behind an `Arc`
/// across concurrently triggered invocations.
pub trait TargetStore: Send + Sync {
    /// Read a target by kind and id.
    async fn read(&self, target: &TargetRef) -> Result<Target, StoreError>;

    /// Conditionally merge `state` into the target's stored channel
    /// sub-record and return the updated target.
    ///
    /// Implementations apply [`ChannelState::merged_over`] against the
    /// record as currently stored (not as the caller last read it) in one
    /// atomic step, and preserve every unrelated custom field.
    async fn merge_channel_state(
        &self,
        target: &TargetRef,
        state: &ChannelState,
    ) -> Result<Target, StoreError>;
}
