//! # Anchoring Error Taxonomy
//!
//! One variant per failing pipeline step, each carrying the identifiers
//! needed to diagnose the invocation from a log line alone. Errors before
//! submission are retry-safe (nothing was committed anywhere); a
//! [`AnchorError::PostAnchorPersist`] is not — the ledger append already
//! happened and cannot be rolled back, so retrying the invocation would
//! anchor the same fingerprint twice.

use thiserror::Error;

use evanchor_core::{CanonicalError, EventId, LinkRef, TargetRef};
use evanchor_store::StoreError;

use crate::resolver::ResolveError;

/// Which post-anchor persistence step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    /// Merging the advanced channel state onto the target.
    TargetUpdate,
    /// Creating the confirmation record.
    Confirmation,
}

impl std::fmt::Display for PersistStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetUpdate => f.write_str("target update"),
            Self::Confirmation => f.write_str("confirmation creation"),
        }
    }
}

/// Errors from one anchoring invocation.
#[derive(Error, Debug)]
pub enum AnchorError {
    /// The event references no recognized target kind.
    #[error("event {event_id} references no target")]
    NoTarget {
        /// The offending event.
        event_id: EventId,
    },

    /// The event could not be canonicalized for fingerprinting.
    #[error("event {event_id} cannot be fingerprinted: {source}")]
    Serialization {
        /// The offending event.
        event_id: EventId,
        /// The canonicalization failure.
        #[source]
        source: CanonicalError,
    },

    /// Reading the event's target failed.
    #[error("reading target {target} for event {event_id} failed: {source}")]
    TargetRead {
        /// The event being processed.
        event_id: EventId,
        /// The target that could not be read.
        target: TargetRef,
        /// The store failure.
        #[source]
        source: StoreError,
    },

    /// Resolving or binding the anchoring channel failed. No mutation has
    /// been performed at this point.
    #[error("channel resolution for target {target} (event {event_id}) failed: {source}")]
    ChannelBind {
        /// The event being processed.
        event_id: EventId,
        /// The target whose channel was being resolved.
        target: TargetRef,
        /// The resolution failure.
        #[source]
        source: ResolveError,
    },

    /// The ledger append itself failed. Nothing was committed; the whole
    /// invocation is safe to retry later.
    #[error("ledger submission for event {event_id} on target {target} failed: {source}")]
    Submission {
        /// The event being processed.
        event_id: EventId,
        /// The target whose channel was appended to.
        target: TargetRef,
        /// The ledger failure.
        #[source]
        source: evanchor_ledger::LedgerError,
    },

    /// The ledger append succeeded but local persistence did not.
    ///
    /// The link at `submitted_link` is durably on the ledger and cannot be
    /// rolled back; retrying the invocation would anchor a duplicate.
    /// Surfaced distinctly so operators can reconcile by hand.
    #[error(
        "anchor for event {event_id} on target {target} is committed at {submitted_link}, \
         but {stage} failed: {source}; retrying would anchor a duplicate link"
    )]
    PostAnchorPersist {
        /// The event being processed.
        event_id: EventId,
        /// The target involved.
        target: TargetRef,
        /// Which persistence step failed.
        stage: PersistStage,
        /// The anchorage the fingerprint was committed at.
        submitted_link: LinkRef,
        /// The store failure.
        #[source]
        source: StoreError,
    },
}

impl AnchorError {
    /// Short name of the failing pipeline step, for boundary logging.
    pub fn step(&self) -> &'static str {
        match self {
            Self::NoTarget { .. } => "resolve-target",
            Self::Serialization { .. } => "fingerprint",
            Self::TargetRead { .. } => "read-target",
            Self::ChannelBind { .. } => "resolve-channel",
            Self::Submission { .. } => "submit",
            Self::PostAnchorPersist {
                stage: PersistStage::TargetUpdate,
                ..
            } => "persist-channel-state",
            Self::PostAnchorPersist {
                stage: PersistStage::Confirmation,
                ..
            } => "create-confirmation",
        }
    }

    /// Whether the invocation can be retried without risking a duplicate
    /// anchor. False only after a confirmed ledger append.
    pub fn retry_safe(&self) -> bool {
        !matches!(self, Self::PostAnchorPersist { .. })
    }
}
