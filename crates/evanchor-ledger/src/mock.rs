//! # Mock Ledger
//!
//! Deterministic in-memory implementation of [`LedgerClient`] for
//! development and testing.
//!
//! Simulates the behaviors the anchoring session depends on: fresh identity
//! material on channel creation, secret verification on bind, append-only
//! link logs, and rejection of stale anchorages. Failure modes can be
//! injected to exercise the session's error paths.
//!
//! ## Warning
//!
//! This implementation provides NO durability or tamper-evidence. It is
//! suitable only for tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use evanchor_core::{ChannelId, ChannelSecret, LinkRef, PublicIdentifier};

use crate::client::{ChannelHandle, ChannelOptions, LedgerClient, NewChannel};
use crate::error::LedgerError;

#[derive(Debug)]
struct MockChannel {
    secret: String,
    /// The only anchorage a submission is currently allowed to target.
    expected_anchorage: String,
    /// Append-only log of (anchorage, digest bytes) pairs.
    links: Vec<(String, Vec<u8>)>,
    seq: u64,
}

#[derive(Debug, Default)]
struct MockNetwork {
    channels: HashMap<String, MockChannel>,
    channel_seq: u64,
    unreachable: bool,
    fail_next_submit: bool,
}

impl MockNetwork {
    fn check_reachable(&self) -> Result<(), LedgerError> {
        if self.unreachable {
            return Err(LedgerError::Unreachable {
                reason: "mock network marked unreachable".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory mock ledger. Cheap to clone; clones share the same network.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    network: Arc<Mutex<MockNetwork>>,
}

impl MockLedger {
    /// Create an empty mock network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the network unreachable; subsequent create/bind/submit calls
    /// fail with [`LedgerError::Unreachable`] until cleared.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.network.lock().unreachable = unreachable;
    }

    /// Make the next submission fail with [`LedgerError::Rejected`] while
    /// leaving the channel untouched.
    pub fn fail_next_submit(&self) {
        self.network.lock().fail_next_submit = true;
    }

    /// Number of channels ever created on this network.
    pub fn channel_count(&self) -> usize {
        self.network.lock().channels.len()
    }

    /// The (anchorage, digest) log of a channel, oldest first.
    pub fn links(&self, channel_id: &ChannelId) -> Option<Vec<(LinkRef, Vec<u8>)>> {
        self.network.lock().channels.get(channel_id.as_str()).map(|c| {
            c.links
                .iter()
                .map(|(anchorage, digest)| (LinkRef::from(anchorage.as_str()), digest.clone()))
                .collect()
        })
    }
}

/// Handle to one mock channel.
#[derive(Debug, Clone)]
pub struct MockChannelHandle {
    network: Arc<Mutex<MockNetwork>>,
    channel_id: ChannelId,
}

impl MockChannelHandle {
    /// The channel this handle is bound to.
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }
}

impl ChannelHandle for MockChannelHandle {
    async fn submit(&self, digest_bytes: &[u8], at: &LinkRef) -> Result<LinkRef, LedgerError> {
        let mut network = self.network.lock();
        network.check_reachable()?;
        if network.fail_next_submit {
            network.fail_next_submit = false;
            return Err(LedgerError::Rejected {
                reason: "injected submission failure".to_string(),
            });
        }
        let channel = network
            .channels
            .get_mut(self.channel_id.as_str())
            .ok_or_else(|| LedgerError::ChannelNotFound {
                channel_id: self.channel_id.clone(),
            })?;
        if channel.expected_anchorage != at.as_str() {
            return Err(LedgerError::UnknownAnchorage {
                anchorage: at.clone(),
            });
        }
        channel.links.push((at.as_str().to_string(), digest_bytes.to_vec()));
        channel.seq += 1;
        let next = format!("{}:{}", self.channel_id, channel.seq);
        channel.expected_anchorage = next.clone();
        tracing::debug!(
            channel_id = %self.channel_id,
            anchorage = %at,
            next_anchorage = %next,
            "mock ledger accepted link"
        );
        Ok(LinkRef::from(next.as_str()))
    }
}

impl LedgerClient for MockLedger {
    type Handle = MockChannelHandle;

    async fn create_channel(
        &self,
        options: &ChannelOptions,
    ) -> Result<NewChannel<Self::Handle>, LedgerError> {
        let mut network = self.network.lock();
        network.check_reachable()?;
        network.channel_seq += 1;
        let seq = network.channel_seq;

        let channel_id = format!("chan-{seq}");
        let secret = Uuid::new_v4().simple().to_string();
        let public_identifier = format!("pub-{seq}");
        let initial = format!("{channel_id}:0");

        network.channels.insert(
            channel_id.clone(),
            MockChannel {
                secret: secret.clone(),
                expected_anchorage: initial.clone(),
                links: Vec::new(),
                seq: 0,
            },
        );
        tracing::debug!(channel_id = %channel_id, node = ?options.node, "mock ledger created channel");

        Ok(NewChannel {
            handle: MockChannelHandle {
                network: Arc::clone(&self.network),
                channel_id: ChannelId::from(channel_id.as_str()),
            },
            channel_id: ChannelId::from(channel_id.as_str()),
            secret: ChannelSecret::new(secret),
            public_identifier: PublicIdentifier::from(public_identifier.as_str()),
            initial_link_ref: LinkRef::from(initial.as_str()),
        })
    }

    async fn bind_channel(
        &self,
        channel_id: &ChannelId,
        secret: &ChannelSecret,
        _options: &ChannelOptions,
    ) -> Result<Self::Handle, LedgerError> {
        let network = self.network.lock();
        network.check_reachable()?;
        let channel = network
            .channels
            .get(channel_id.as_str())
            .ok_or_else(|| LedgerError::ChannelNotFound {
                channel_id: channel_id.clone(),
            })?;
        if channel.secret != secret.expose() {
            return Err(LedgerError::BadSecret {
                channel_id: channel_id.clone(),
            });
        }
        Ok(MockChannelHandle {
            network: Arc::clone(&self.network),
            channel_id: channel_id.clone(),
        })
    }
}
