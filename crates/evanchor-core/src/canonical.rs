//! # Canonical Serialization — Deterministic Byte Production
//!
//! Defines `CanonicalBytes`, the sole construction path for the bytes that
//! feed fingerprint computation.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is `CanonicalBytes::new()`, which serializes through RFC 8785
//! (JSON Canonicalization Scheme): object keys sorted lexicographically at
//! every nesting level, compact separators, deterministic number rendering.
//! Any function that hashes must accept `&CanonicalBytes`, so a digest over
//! non-canonical bytes is unrepresentable.
//!
//! Event payloads are arbitrary JSON, not monetary canonical forms, so float
//! values are admitted; JCS number serialization keeps their byte rendering
//! deterministic across platforms.

use serde::Serialize;

use crate::error::CanonicalError;

/// Bytes produced exclusively by JCS canonicalization (RFC 8785).
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted at every nesting level.
/// - Serialization uses compact separators and UTF-8 output.
///
/// Downstream code cannot violate these invariants because the inner
/// `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// Two values that are semantically identical (same keys and values,
    /// any key order, at any nesting depth) produce identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::Serialization`] if the value cannot be
    /// represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for fingerprint computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
