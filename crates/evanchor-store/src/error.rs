//! Store error taxonomy.

use evanchor_core::{TargetId, TargetKind};
use thiserror::Error;

/// Errors from the external target/confirmation stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No entity of the given kind exists under the given id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The entity kind that was requested.
        kind: TargetKind,
        /// The entity id that was requested.
        id: TargetId,
    },

    /// A stored channel-state sub-record could not be decoded.
    #[error("stored channel state on {kind} {id} is malformed: {reason}")]
    MalformedChannelState {
        /// The entity kind holding the record.
        kind: TargetKind,
        /// The entity id holding the record.
        id: TargetId,
        /// Decode failure description.
        reason: String,
    },

    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(String),
}
