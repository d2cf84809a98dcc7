//! # Confirmation Records
//!
//! A confirmation is the immutable record emitted exactly once per
//! successfully anchored event. It carries enough provenance to trace the
//! anchor later: which event, which target, which channel, and where in
//! the channel the fingerprint landed.
//!
//! The original event's payload is deliberately not embedded — type, id,
//! and the anchored digest are sufficient to reconstruct provenance, and
//! the payload already lives with the event itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evanchor_core::{EventId, LinkRef, PublicIdentifier, TargetRef};

use crate::error::StoreError;

/// Provenance of the anchored event, embedded in the confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProvenance {
    /// The original event's identifier.
    pub id: EventId,
    /// The original event's type tag.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Hex rendering of the fingerprint that was anchored.
    pub digest: String,
}

/// An immutable confirmation of one successful anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// The confirmation's type tag (deployment-configurable).
    #[serde(rename = "type")]
    pub confirmation_type: String,
    /// The target the anchored event pertains to.
    pub target: TargetRef,
    /// Provenance of the original event.
    pub original_event: EventProvenance,
    /// The channel's public identifier.
    pub public_identifier: PublicIdentifier,
    /// The channel's root anchorage.
    pub root_reference: LinkRef,
    /// The anchorage at which this event's fingerprint was appended.
    pub link_reference: LinkRef,
    /// When the confirmation was created.
    pub created_at: DateTime<Utc>,
}

/// A confirmation as persisted: the record plus its store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// The confirmation content.
    #[serde(flatten)]
    pub confirmation: Confirmation,
}

/// Creation access for confirmation records.
///
/// The store owns the record after creation; this stack never mutates or
/// deletes confirmations.
pub trait ConfirmationStore: Send + Sync {
    /// Persist a confirmation, returning it with its assigned id.
    async fn create(&self, confirmation: Confirmation) -> Result<ConfirmationRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use evanchor_core::{TargetId, TargetKind};

    #[test]
    fn wire_form_uses_camel_case_and_type_tags() {
        let confirmation = Confirmation {
            confirmation_type: "_anchored".to_string(),
            target: TargetRef::new(TargetKind::Thing, TargetId::new("t1")),
            original_event: EventProvenance {
                id: EventId::new("e1"),
                event_type: "scans".to_string(),
                digest: "ab".repeat(32),
            },
            public_identifier: PublicIdentifier::from("pk1"),
            root_reference: LinkRef::from("R1"),
            link_reference: LinkRef::from("R1"),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&confirmation).unwrap();
        assert_eq!(value["type"], "_anchored");
        assert_eq!(value["originalEvent"]["type"], "scans");
        assert_eq!(value["originalEvent"]["id"], "e1");
        assert_eq!(value["publicIdentifier"], "pk1");
        assert_eq!(value["rootReference"], "R1");
    }
}
