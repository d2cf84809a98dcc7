//! # Channel State — The Persisted Anchoring Sub-Record
//!
//! `ChannelState` is the sub-record stored inside a target's custom metadata
//! that lets a later invocation append to the *same* ledger channel instead
//! of creating a fresh one per event.
//!
//! ## Invariants
//!
//! - `root_ref` is written once (by the first successful anchor) and is
//!   immutable afterwards.
//! - `channel_id`, `secret`, and `public_identifier` are set at channel
//!   creation and never replaced. A target that has a `channel_id` must
//!   never have it swapped for a freshly created channel.
//! - `next_link_ref` is overwritten after every successful append.
//!
//! [`ChannelState::merged_over()`] is the single implementation of these
//! rules. Store implementations apply it atomically against their current
//! stored sub-record, so two racing invocations cannot clobber the channel
//! identity or the root — only the next anchorage is last-write-wins.

use serde::{Deserialize, Serialize};

use crate::identity::{ChannelId, ChannelSecret, LinkRef, PublicIdentifier};

/// The anchoring channel sub-record persisted on a target.
///
/// All fields are optional in the stored form: a target that has never been
/// anchored has none of them. Once `channel_id` is present, `secret` must
/// be present too — a violation is a corrupt record and fails the
/// invocation rather than silently recreating the channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    /// Opaque identifier of the bound ledger channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    /// Opaque authentication material for appending to the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<ChannelSecret>,
    /// Public key/identifier of the channel, set once at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_identifier: Option<PublicIdentifier>,
    /// Anchorage at which the next append must occur.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link_reference: Option<LinkRef>,
    /// The channel's first-ever anchorage. Written once, never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_reference: Option<LinkRef>,
}

impl ChannelState {
    /// The well-known custom-field key under which this sub-record is
    /// stored in a target's metadata bag.
    pub const CUSTOM_FIELD: &'static str = "anchoringChannel";

    /// Whether this state is bound to an existing channel.
    pub fn is_bound(&self) -> bool {
        self.channel_id.is_some()
    }

    /// Merge this state over an existing stored state.
    ///
    /// Field rules:
    ///
    /// - `channel_id`, `secret`, `public_identifier`: first-write-wins —
    ///   an existing value is kept, `self`'s value only fills an absence.
    /// - `root_reference`: first-write-wins. If a concurrent invocation
    ///   already recorded the root, it is preserved.
    /// - `next_link_reference`: last-write-wins — `self`'s value replaces
    ///   the stored one when present.
    ///
    /// The merge is pure; atomicity against the live stored record is the
    /// store implementation's responsibility.
    pub fn merged_over(&self, existing: &ChannelState) -> ChannelState {
        ChannelState {
            channel_id: existing
                .channel_id
                .clone()
                .or_else(|| self.channel_id.clone()),
            secret: existing.secret.clone().or_else(|| self.secret.clone()),
            public_identifier: existing
                .public_identifier
                .clone()
                .or_else(|| self.public_identifier.clone()),
            next_link_reference: self
                .next_link_reference
                .clone()
                .or_else(|| existing.next_link_reference.clone()),
            root_reference: existing
                .root_reference
                .clone()
                .or_else(|| self.root_reference.clone()),
        }
    }
}
