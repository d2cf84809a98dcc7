//! # evanchor-core — Foundational Types for the Event Anchoring Stack
//!
//! This crate is the leaf of the workspace dependency DAG. It defines the
//! type-system primitives every other crate builds on:
//!
//! 1. **Newtype wrappers for domain identifiers.** `EventId`, `TargetId`,
//!    `ChannelId`, `LinkRef`, `PublicIdentifier`, `ChannelSecret` — no bare
//!    strings for identifiers, and the channel secret never appears in
//!    `Debug` output.
//!
//! 2. **`CanonicalBytes` newtype.** ALL fingerprint computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!    Two semantically-identical payloads always hash to the same value
//!    regardless of key order.
//!
//! 3. **`fingerprint()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every digest path flows through canonicalization.
//!
//! 4. **Tagged target references.** The polymorphic "which entity kind does
//!    this event point at" question is answered exactly once, producing a
//!    `TargetRef`, never re-derived by presence checks downstream.
//!
//! 5. **`ChannelState` with a pure merge.** The stored channel sub-record
//!    and the field-wise merge rules (first-write-wins on channel identity
//!    and root, last-write on the next anchorage) live here so every store
//!    implementation applies the same rules.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evanchor-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a wire or a store.

pub mod canonical;
pub mod channel;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use channel::ChannelState;
pub use error::CanonicalError;
pub use event::{Event, NoTargetError, TargetKind, TargetRef};
pub use fingerprint::{fingerprint, Fingerprint};
pub use identity::{ChannelId, ChannelSecret, EventId, LinkRef, PublicIdentifier, TargetId};
