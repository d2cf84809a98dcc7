//! Ledger error taxonomy.
//!
//! Every variant carries enough context to diagnose which channel or
//! anchorage was involved without consulting the ledger itself.

use evanchor_core::{ChannelId, LinkRef};
use thiserror::Error;

/// Errors from ledger channel operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No channel exists under the given identifier.
    #[error("channel not found: {channel_id}")]
    ChannelNotFound {
        /// The channel that was requested.
        channel_id: ChannelId,
    },

    /// The secret presented on bind does not authorize the channel.
    #[error("secret rejected for channel {channel_id}")]
    BadSecret {
        /// The channel the bind was attempted against.
        channel_id: ChannelId,
    },

    /// The anchorage reference is unknown or already consumed.
    ///
    /// Typically a stale `next_link_reference` — a concurrent invocation
    /// appended at this position first.
    #[error("unknown or consumed anchorage: {anchorage}")]
    UnknownAnchorage {
        /// The anchorage the submission targeted.
        anchorage: LinkRef,
    },

    /// The ledger network is unreachable.
    #[error("ledger unreachable: {reason}")]
    Unreachable {
        /// Transport-level failure description.
        reason: String,
    },

    /// The ledger rejected the operation.
    #[error("ledger rejected the operation: {reason}")]
    Rejected {
        /// Rejection description from the ledger.
        reason: String,
    },
}
