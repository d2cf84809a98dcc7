//! # Channel State Resolver
//!
//! Decides, from a target's stored metadata, whether to resume the
//! target's existing anchoring channel or create a brand-new one, and
//! produces everything the orchestrator needs for the upcoming append:
//! a bound channel handle, the channel state to persist afterwards, and
//! the anchorage at which the append must occur.
//!
//! ## Design Decision
//!
//! The outcome is an explicit two-variant enum. A target with a stored
//! `channel_id` but missing secret or next anchorage is a *corrupt*
//! record: the resolver fails rather than falling through to channel
//! creation, because replacing an existing channel would orphan every
//! previously anchored link.

use thiserror::Error;

use evanchor_core::{ChannelState, LinkRef, TargetId};
use evanchor_ledger::{ChannelOptions, LedgerClient, LedgerError};
use evanchor_store::{StoreError, Target};

/// Errors from channel state resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The stored channel sub-record exists but is unusable.
    #[error("stored channel state for target {target} is unusable: {reason}")]
    CorruptState {
        /// The target holding the record.
        target: TargetId,
        /// What is missing or undecodable.
        reason: String,
    },

    /// The ledger client failed to create or bind the channel.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// The resolver's decision, with everything needed for the append.
#[derive(Debug)]
pub enum ResolvedChannel<H> {
    /// The target already owns a channel; it was rebound from persisted
    /// identity material.
    Resumed {
        /// Handle bound to the existing channel.
        handle: H,
        /// The stored channel state (identity fields all present).
        state: ChannelState,
        /// The stored `next_link_reference` — where the append occurs.
        anchorage: LinkRef,
    },
    /// A brand-new channel was created for the target.
    Created {
        /// Handle bound to the new channel.
        handle: H,
        /// Fresh channel state: identity material set, no root or next
        /// reference yet (the first append establishes them).
        state: ChannelState,
        /// The channel's initial link reference — where the first append
        /// occurs, and the future `root_reference`.
        anchorage: LinkRef,
    },
}

impl<H> ResolvedChannel<H> {
    /// Whether this resolution created a new channel.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// The anchorage the upcoming append must target.
    pub fn anchorage(&self) -> &LinkRef {
        match self {
            Self::Resumed { anchorage, .. } | Self::Created { anchorage, .. } => anchorage,
        }
    }

    /// Decompose into (handle, state, anchorage, created).
    pub fn into_parts(self) -> (H, ChannelState, LinkRef, bool) {
        match self {
            Self::Resumed {
                handle,
                state,
                anchorage,
            } => (handle, state, anchorage, false),
            Self::Created {
                handle,
                state,
                anchorage,
            } => (handle, state, anchorage, true),
        }
    }
}

/// Resolve a target's anchoring channel: resume if bound, create otherwise.
///
/// Performs no mutation. Failures here leave the target, the ledger, and
/// the confirmation store untouched.
pub async fn resolve_channel<L: LedgerClient>(
    ledger: &L,
    target: &Target,
    options: &ChannelOptions,
) -> Result<ResolvedChannel<L::Handle>, ResolveError> {
    let stored = target.channel_state().map_err(|e| corrupt(target, &e))?;

    match stored {
        Some(state) if state.is_bound() => {
            // channel_id presence is guaranteed by is_bound().
            let channel_id = state.channel_id.clone().ok_or_else(|| {
                ResolveError::CorruptState {
                    target: target.id.clone(),
                    reason: "channel id vanished during resolution".to_string(),
                }
            })?;
            let secret = state
                .secret
                .as_ref()
                .ok_or_else(|| ResolveError::CorruptState {
                    target: target.id.clone(),
                    reason: "channel id present but secret missing".to_string(),
                })?;
            if state.public_identifier.is_none() {
                return Err(ResolveError::CorruptState {
                    target: target.id.clone(),
                    reason: "channel id present but public identifier missing".to_string(),
                });
            }
            let anchorage =
                state
                    .next_link_reference
                    .clone()
                    .ok_or_else(|| ResolveError::CorruptState {
                        target: target.id.clone(),
                        reason: "channel id present but next anchorage missing".to_string(),
                    })?;

            let handle = ledger.bind_channel(&channel_id, secret, options).await?;
            tracing::info!(
                target_id = %target.id,
                channel_id = %channel_id,
                anchorage = %anchorage,
                "resumed anchoring channel"
            );
            Ok(ResolvedChannel::Resumed {
                handle,
                state,
                anchorage,
            })
        }
        _ => {
            let new = ledger.create_channel(options).await?;
            tracing::info!(
                target_id = %target.id,
                channel_id = %new.channel_id,
                "created anchoring channel"
            );
            let state = ChannelState {
                channel_id: Some(new.channel_id),
                secret: Some(new.secret),
                public_identifier: Some(new.public_identifier),
                next_link_reference: None,
                root_reference: None,
            };
            Ok(ResolvedChannel::Created {
                handle: new.handle,
                state,
                anchorage: new.initial_link_ref,
            })
        }
    }
}

fn corrupt(target: &Target, source: &StoreError) -> ResolveError {
    ResolveError::CorruptState {
        target: target.id.clone(),
        reason: source.to_string(),
    }
}
