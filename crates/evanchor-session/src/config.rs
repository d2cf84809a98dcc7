//! Session configuration.
//!
//! Deployment-level policy knobs. These are fixed for the lifetime of a
//! session: in particular the fingerprint scope must not change between
//! invocations, or digests stop being comparable across the channel.

use evanchor_ledger::ChannelOptions;

/// Default type tag for confirmation records.
pub const DEFAULT_CONFIRMATION_TYPE: &str = "_anchored";

/// What the fingerprint covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintScope {
    /// Hash the event's payload only.
    #[default]
    Payload,
    /// Hash the whole event record (id, type, references, payload).
    FullEvent,
}

/// Configuration for an [`AnchoringSession`](crate::AnchoringSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ledger connection options (optional node endpoint override).
    pub channel_options: ChannelOptions,
    /// What the fingerprint covers. Must be consistent per deployment.
    pub fingerprint_scope: FingerprintScope,
    /// Type tag stamped on confirmation records.
    pub confirmation_type: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_options: ChannelOptions::default_network(),
            fingerprint_scope: FingerprintScope::default(),
            confirmation_type: DEFAULT_CONFIRMATION_TYPE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Override the ledger node endpoint.
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.channel_options = ChannelOptions::with_node(node);
        self
    }

    /// Select the fingerprint scope.
    pub fn with_scope(mut self, scope: FingerprintScope) -> Self {
        self.fingerprint_scope = scope;
        self
    }
}
