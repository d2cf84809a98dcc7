//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the anchoring stack. These
//! prevent accidental identifier confusion — you cannot pass a `ChannelId`
//! where a `LinkRef` is expected.
//!
//! All identifiers are opaque strings issued by external systems (the event
//! platform mints event and target ids; the ledger client mints channel
//! ids, secrets, and link references). This crate never interprets their
//! contents.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Unique identifier of a business event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Unique identifier of a target entity (any kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub String);

/// Opaque identifier of a ledger channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Opaque pointer to a position within a ledger channel.
///
/// Used both to locate where the next append must occur and to prove a
/// specific anchor's position afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRef(pub String);

/// Opaque public key/identifier associated with a channel. Set once at
/// channel creation, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicIdentifier(pub String);

/// Opaque authentication material required to append to a channel.
///
/// Generated once by the ledger client and persisted verbatim; this stack
/// never derives keys from it. The value is redacted from `Debug` output
/// and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ChannelSecret(String);

impl ChannelSecret {
    /// Wrap secret material received from the ledger client.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the secret for a ledger bind call.
    ///
    /// The explicit name marks every site where the material leaves the
    /// redacted wrapper.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ChannelSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChannelSecret(<redacted>)")
    }
}

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap an externally issued identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(EventId);
string_id!(TargetId);
string_id!(ChannelId);
string_id!(LinkRef);
string_id!(PublicIdentifier);
