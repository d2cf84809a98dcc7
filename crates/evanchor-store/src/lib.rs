//! # evanchor-store — External Store Interfaces
//!
//! The anchoring session reads events' targets from, and persists channel
//! state and confirmations to, an external CRUD platform. This crate
//! defines that seam:
//!
//! - **Target** (`target.rs`): the [`Target`] record, channel-state
//!   accessors over its custom metadata bag, and the [`TargetStore`] trait
//!   with the conditional `merge_channel_state` update.
//!
//! - **Confirmation** (`confirmation.rs`): the immutable [`Confirmation`]
//!   record created once per successful anchor, and the
//!   [`ConfirmationStore`] trait.
//!
//! - **Memory** (`memory.rs`): in-memory implementations for testing, with
//!   injectable failures for exercising post-anchor persistence errors.
//!
//! ## Crate Policy
//!
//! - Depends only on `evanchor-core` internally.
//! - Store traits expose native `async fn`; implementations wrap whatever
//!   platform client the deployment uses.

#![allow(async_fn_in_trait)]

pub mod confirmation;
pub mod error;
pub mod memory;
pub mod target;

pub use confirmation::{Confirmation, ConfirmationRecord, ConfirmationStore, EventProvenance};
pub use error::StoreError;
pub use memory::{MemoryConfirmationStore, MemoryTargetStore};
pub use target::{Target, TargetStore};
