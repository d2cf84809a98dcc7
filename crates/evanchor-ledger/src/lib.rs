//! # evanchor-ledger — Ledger Channel Client Interface
//!
//! The seam between the anchoring session and the external append-only
//! ledger network:
//!
//! - **Client** (`client.rs`): the [`LedgerClient`] and [`ChannelHandle`]
//!   traits — channel creation, rebinding with persisted secret material,
//!   and fingerprint submission at a chosen anchorage.
//!
//! - **Mock** (`mock.rs`): a deterministic in-memory ledger for development
//!   and testing. Verifies secrets on bind and rejects stale anchorages on
//!   submit, so tests exercise the same failure surface a real network
//!   client exposes.
//!
//! ## Crate Policy
//!
//! - Depends only on `evanchor-core` internally.
//! - The traits expose native `async fn`; one submission is one awaited
//!   network round trip, never a blocked thread.
//! - A successful `submit` is irreversible — callers own that guarantee's
//!   consequences (no automatic retry after an `Ok`).

#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod mock;

pub use client::{ChannelHandle, ChannelOptions, LedgerClient, NewChannel};
pub use error::LedgerError;
pub use mock::{MockChannelHandle, MockLedger};
