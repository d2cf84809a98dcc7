//! # Event Fingerprints
//!
//! SHA-256 fingerprints over canonical bytes. The fingerprint is what gets
//! anchored to the ledger channel: a fixed-length, deterministic digest of
//! the event content.
//!
//! ## Security Invariant
//!
//! [`fingerprint()`] accepts only `&CanonicalBytes`, not raw `&[u8]`. This
//! compile-time constraint prevents any code path from hashing bytes that
//! did not flow through the canonicalization pipeline.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A 256-bit event fingerprint.
///
/// Produced exclusively from `CanonicalBytes` via [`fingerprint()`]. Pure
/// and deterministic: the same canonical input yields the same fingerprint
/// across process restarts and platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the fingerprint as a lowercase 64-character hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The hex rendering as bytes — the form submitted to the ledger.
    ///
    /// Ledger links carry the ASCII hex string rather than the raw digest,
    /// so an anchored link is directly comparable against a recomputed
    /// fingerprint without decoding.
    pub fn hex_bytes(&self) -> Vec<u8> {
        self.to_hex().into_bytes()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the SHA-256 fingerprint of canonical bytes.
///
/// No side effects, no failure modes: canonicalization is the only fallible
/// step and it has already happened by the time this is called.
pub fn fingerprint(data: &CanonicalBytes) -> Fingerprint {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Fingerprint(bytes)
}
