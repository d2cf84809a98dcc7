//! # Core Error Types
//!
//! Errors for canonicalization and fingerprinting. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//! Higher-level taxonomies (ledger, store, anchoring session) live in
//! their own crates and wrap these where appropriate.

use thiserror::Error;

/// Error during canonical serialization.
///
/// Fingerprinting has no other failure mode: for any value that can be
/// represented as JSON, canonicalization and hashing always succeed.
#[derive(Error, Debug)]
pub enum CanonicalError {
    /// The value could not be serialized to JSON.
    #[error("payload cannot be canonicalized: {0}")]
    Serialization(#[from] serde_json::Error),
}
