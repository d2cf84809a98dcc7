//! # evanchor-session — The Anchoring Session State Machine
//!
//! Drives one business event from trigger to anchored fingerprint:
//!
//! - **Resolver** (`resolver.rs`): decides whether the event's target
//!   already owns an anchoring channel (resume: rebind from persisted id +
//!   secret, append at the stored anchorage) or needs a brand-new one
//!   (create: fresh identity material, append at the initial anchorage).
//!   The decision is an explicit two-variant [`ResolvedChannel`], never a
//!   scatter of null checks.
//!
//! - **Session** (`session.rs`): [`AnchoringSession::on_event_ready`], the
//!   strictly sequential pipeline — resolve target, read it, fingerprint
//!   the event, resolve the channel, submit, merge-persist the advanced
//!   channel state, create exactly one confirmation.
//!
//! - **Signal** (`signal.rs`): the [`CompletionSignal`] contract with the
//!   invoking framework — notified exactly once per invocation on both the
//!   success and failure path.
//!
//! - **Errors** (`error.rs`): the [`AnchorError`] taxonomy. The one variant
//!   that demands special operator attention is
//!   [`AnchorError::PostAnchorPersist`]: the ledger append already
//!   happened irreversibly, local persistence did not — blind retry would
//!   anchor a duplicate link, so this stack never retries on its own.
//!
//! ## Concurrency
//!
//! One invocation is one short-lived task; each step's output gates the
//! next and only network round trips suspend. Two invocations for the
//! *same* target may still race in the window between reading the target
//! and merging the channel state back; the store-side conditional merge
//! keeps the channel identity and root intact, but chain continuity
//! requires the calling framework to serialize invocations per target.

pub mod config;
pub mod error;
pub mod resolver;
pub mod session;
pub mod signal;

pub use config::{FingerprintScope, SessionConfig};
pub use error::{AnchorError, PersistStage};
pub use resolver::{resolve_channel, ResolveError, ResolvedChannel};
pub use session::{AnchorOutcome, AnchoringSession};
pub use signal::CompletionSignal;
