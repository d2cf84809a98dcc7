//! End-to-end anchoring pipeline test.
//!
//! Drives business events through the full stack — core fingerprinting,
//! mock ledger, in-memory stores, session orchestration — and verifies the
//! complete lifecycle:
//!
//! 1. First event for a target creates a channel, anchors at the initial
//!    link, persists the full channel state, and emits one confirmation.
//! 2. A later event for the same target resumes the persisted channel and
//!    extends the chain at the stored anchorage.
//! 3. Resumption works across session instances, proving the persisted
//!    state alone is sufficient to continue the chain.
//! 4. What lands on the ledger is exactly the hex SHA-256 of the canonical
//!    payload, independently recomputable.

use sha2::{Digest, Sha256};

use evanchor_core::{ChannelState, Event, EventId, TargetKind, TargetRef};
use evanchor_ledger::MockLedger;
use evanchor_session::{AnchoringSession, SessionConfig};
use evanchor_store::{MemoryConfirmationStore, MemoryTargetStore, Target};

fn scan_event(id: &str, thing: &str, payload: serde_json::Value) -> Event {
    Event {
        id: EventId::new(id),
        event_type: "scans".to_string(),
        thing: Some(thing.into()),
        product: None,
        collection: None,
        payload,
    }
}

fn hex_sha256(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[tokio::test]
async fn first_event_establishes_channel_root_and_confirmation() {
    let ledger = MockLedger::new();
    let targets = MemoryTargetStore::new();
    let confirmations = MemoryConfirmationStore::new();
    targets.insert(Target::new(TargetKind::Thing, "t1"));

    let session = AnchoringSession::new(
        ledger.clone(),
        targets.clone(),
        confirmations.clone(),
        SessionConfig::default(),
    );

    let payload = serde_json::json!({"location": "dock-3", "operator": "op-7"});
    let outcome = session
        .on_event_ready(&scan_event("e1", "t1", payload.clone()))
        .await
        .unwrap();

    assert!(outcome.created_channel);
    assert_eq!(outcome.root_reference, outcome.anchored_at);

    // The anchored bytes are the hex SHA-256 of the canonical payload,
    // recomputed here without going through the core crate.
    let canonical = r#"{"location":"dock-3","operator":"op-7"}"#;
    let expected_hex = hex_sha256(canonical.as_bytes());
    assert_eq!(outcome.digest.to_hex(), expected_hex);
    let links = ledger.links(&outcome.channel_id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].1, expected_hex.as_bytes());

    // Persisted channel state is complete and resumable.
    let state = targets
        .get(&outcome.target)
        .unwrap()
        .channel_state()
        .unwrap()
        .unwrap();
    assert_eq!(state.channel_id, Some(outcome.channel_id.clone()));
    assert!(state.secret.is_some());
    assert_eq!(state.public_identifier, Some(outcome.public_identifier.clone()));
    assert_eq!(state.root_reference, Some(outcome.root_reference.clone()));
    assert_eq!(
        state.next_link_reference,
        Some(outcome.next_link_reference.clone())
    );

    // Exactly one confirmation with full provenance.
    let records = confirmations.created();
    assert_eq!(records.len(), 1);
    let c = &records[0].confirmation;
    assert_eq!(c.confirmation_type, "_anchored");
    assert_eq!(c.target, outcome.target);
    assert_eq!(c.original_event.id, EventId::new("e1"));
    assert_eq!(c.original_event.event_type, "scans");
    assert_eq!(c.original_event.digest, expected_hex);
    assert_eq!(c.root_reference, outcome.root_reference);
    assert_eq!(c.link_reference, outcome.anchored_at);
}

#[tokio::test]
async fn chain_extends_across_events_and_session_instances() {
    let ledger = MockLedger::new();
    let targets = MemoryTargetStore::new();
    targets.insert(Target::new(TargetKind::Thing, "t1"));

    let first_outcome = {
        let session = AnchoringSession::new(
            ledger.clone(),
            targets.clone(),
            MemoryConfirmationStore::new(),
            SessionConfig::default(),
        );
        session
            .on_event_ready(&scan_event("e1", "t1", serde_json::json!({"n": 1})))
            .await
            .unwrap()
    };

    // A brand-new session, rebuilt only from what the stores hold.
    let session = AnchoringSession::new(
        ledger.clone(),
        targets.clone(),
        MemoryConfirmationStore::new(),
        SessionConfig::default(),
    );
    let second = session
        .on_event_ready(&scan_event("e2", "t1", serde_json::json!({"n": 2})))
        .await
        .unwrap();
    let third = session
        .on_event_ready(&scan_event("e3", "t1", serde_json::json!({"n": 3})))
        .await
        .unwrap();

    assert_eq!(ledger.channel_count(), 1);
    assert!(!second.created_channel);
    assert!(!third.created_channel);
    // Each anchor lands where the previous one pointed.
    assert_eq!(second.anchored_at, first_outcome.next_link_reference);
    assert_eq!(third.anchored_at, second.next_link_reference);
    // The root never moves.
    assert_eq!(second.root_reference, first_outcome.root_reference);
    assert_eq!(third.root_reference, first_outcome.root_reference);
    assert_eq!(ledger.links(&first_outcome.channel_id).unwrap().len(), 3);
}

#[tokio::test]
async fn distinct_targets_get_distinct_channels() {
    let ledger = MockLedger::new();
    let targets = MemoryTargetStore::new();
    targets.insert(Target::new(TargetKind::Thing, "t1"));
    targets.insert(Target::new(TargetKind::Product, "p1"));
    let session = AnchoringSession::new(
        ledger.clone(),
        targets,
        MemoryConfirmationStore::new(),
        SessionConfig::default(),
    );

    let a = session
        .on_event_ready(&scan_event("e1", "t1", serde_json::json!({"n": 1})))
        .await
        .unwrap();
    let product_event = Event {
        id: EventId::new("e2"),
        event_type: "commissions".to_string(),
        thing: None,
        product: Some("p1".into()),
        collection: None,
        payload: serde_json::json!({"n": 2}),
    };
    let b = session.on_event_ready(&product_event).await.unwrap();

    assert_ne!(a.channel_id, b.channel_id);
    assert_eq!(ledger.channel_count(), 2);
    assert_eq!(b.target, TargetRef::new(TargetKind::Product, "p1"));
}

#[tokio::test]
async fn payload_key_order_does_not_change_the_anchor() {
    let ledger = MockLedger::new();
    let targets = MemoryTargetStore::new();
    targets.insert(Target::new(TargetKind::Thing, "t1"));
    let session = AnchoringSession::new(
        ledger,
        targets,
        MemoryConfirmationStore::new(),
        SessionConfig::default(),
    );

    let a = session
        .on_event_ready(&scan_event(
            "e1",
            "t1",
            serde_json::json!({"a": 1, "b": {"y": 2, "x": 1}}),
        ))
        .await
        .unwrap();
    let b = session
        .on_event_ready(&scan_event(
            "e2",
            "t1",
            serde_json::json!({"b": {"x": 1, "y": 2}, "a": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(a.digest, b.digest);
}

#[tokio::test]
async fn anchoring_preserves_foreign_metadata_and_stored_wire_shape() {
    let targets = MemoryTargetStore::new();
    targets.insert(
        Target::new(TargetKind::Thing, "t1")
            .with_field("serial", serde_json::json!("SN-0042"))
            .with_field("firmware", serde_json::json!({"version": "2.1.0"})),
    );
    let session = AnchoringSession::new(
        MockLedger::new(),
        targets.clone(),
        MemoryConfirmationStore::new(),
        SessionConfig::default(),
    );

    let outcome = session
        .on_event_ready(&scan_event("e1", "t1", serde_json::json!({})))
        .await
        .unwrap();

    let stored = targets.get(&outcome.target).unwrap();
    assert_eq!(stored.custom_fields["serial"], "SN-0042");
    assert_eq!(stored.custom_fields["firmware"]["version"], "2.1.0");

    // The channel sub-record sits under its well-known key with camelCase
    // field names, alongside the foreign fields.
    let sub = &stored.custom_fields[ChannelState::CUSTOM_FIELD];
    assert_eq!(sub["channelId"], outcome.channel_id.as_str());
    assert_eq!(sub["rootReference"], outcome.root_reference.as_str());
    assert_eq!(
        sub["nextLinkReference"],
        outcome.next_link_reference.as_str()
    );
}
