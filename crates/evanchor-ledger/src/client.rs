//! # Ledger Client Traits
//!
//! The interface the anchoring session needs from a ledger network client:
//! create a channel, rebind an existing one from persisted identity
//! material, and submit a fingerprint as the next link.
//!
//! ## Architecture
//!
//! Implementations wrap whatever network client the deployment uses. They
//! must be `Send + Sync` so a single client can be shared behind an `Arc`
//! across concurrently triggered invocations. The associated `Handle` type
//! carries the per-channel connection state produced by `create_channel`
//! or `bind_channel`; submission goes through the handle, never through
//! the client directly.

use evanchor_core::{ChannelId, ChannelSecret, LinkRef, PublicIdentifier};

use crate::error::LedgerError;

/// Connection options for channel operations.
///
/// `node` overrides the network endpoint; `None` means the client's
/// default network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Optional network endpoint override.
    pub node: Option<String>,
}

impl ChannelOptions {
    /// Options targeting the client's default network.
    pub fn default_network() -> Self {
        Self { node: None }
    }

    /// Options targeting a specific node endpoint.
    pub fn with_node(node: impl Into<String>) -> Self {
        Self {
            node: Some(node.into()),
        }
    }
}

/// A freshly created channel: the bound handle plus the identity material
/// the caller must persist to resume the channel later.
#[derive(Debug)]
pub struct NewChannel<H> {
    /// Handle bound to the new channel, ready for submission.
    pub handle: H,
    /// The channel's identifier.
    pub channel_id: ChannelId,
    /// Authentication material for future binds. Persist verbatim.
    pub secret: ChannelSecret,
    /// The channel's public identifier. Immutable after creation.
    pub public_identifier: PublicIdentifier,
    /// The anchorage for the channel's very first link.
    pub initial_link_ref: LinkRef,
}

/// A bound channel, ready to accept appends.
pub trait ChannelHandle: Send + Sync {
    /// Submit `digest_bytes` as the next link at anchorage `at`.
    ///
    /// Returns the anchorage to use for the *next* append. A returned `Ok`
    /// means the link is durably recorded on the ledger and cannot be
    /// rolled back.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownAnchorage`] when `at` is stale or already
    /// consumed; transport and rejection errors otherwise.
    async fn submit(&self, digest_bytes: &[u8], at: &LinkRef) -> Result<LinkRef, LedgerError>;
}

/// A ledger network client capable of creating and rebinding channels.
pub trait LedgerClient: Send + Sync {
    /// The per-channel handle type produced by this client.
    type Handle: ChannelHandle;

    /// Create a brand-new channel, yielding fresh identity material and
    /// the initial anchorage.
    async fn create_channel(
        &self,
        options: &ChannelOptions,
    ) -> Result<NewChannel<Self::Handle>, LedgerError>;

    /// Rebind an existing channel from its persisted id and secret.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ChannelNotFound`] or [`LedgerError::BadSecret`] for
    /// stale/invalid persisted material; [`LedgerError::Unreachable`] for
    /// network failures.
    async fn bind_channel(
        &self,
        channel_id: &ChannelId,
        secret: &ChannelSecret,
        options: &ChannelOptions,
    ) -> Result<Self::Handle, LedgerError>;
}
