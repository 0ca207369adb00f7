//! Presence hub: registry plus subscriber fan-out.
//!
//! Every mutation takes the write lock, applies the change, recomputes the
//! snapshot once and offers that same `Arc<Snapshot>` to every open
//! connection before the lock is released. Offers use `try_send` on a
//! bounded queue, so a slow client loses snapshots instead of holding the
//! lock, and all clients observe snapshots in mutation order.

use std::collections::HashMap;
use std::sync::Arc;

use footfall_common::{ConnectionId, PresenceError};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, warn};

use crate::aggregate::{compute_snapshot, Snapshot};
use crate::page::canonical_page;
use crate::registry::PresenceRegistry;

/// Receiving half handed to each connection.
pub type SnapshotReceiver = mpsc::Receiver<Arc<Snapshot>>;

/// Hub tuning.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Snapshots buffered per connection.
    pub outbound_queue: usize,
    /// Longest accepted page path in bytes.
    pub max_page_length: usize,
    /// Page key for connections that have not reported a page.
    pub unknown_page: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_queue: 16,
            max_page_length: 256,
            unknown_page: String::new(),
        }
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone)]
pub struct FanoutReport {
    pub snapshot: Arc<Snapshot>,
    /// Connections the snapshot was queued for.
    pub delivered: usize,
    /// Connections whose queue was full or closed.
    pub dropped: usize,
}

struct HubState {
    registry: PresenceRegistry,
    subscribers: HashMap<ConnectionId, mpsc::Sender<Arc<Snapshot>>>,
}

/// Cloneable handle to the shared presence state.
#[derive(Clone)]
pub struct PresenceHub {
    state: Arc<RwLock<HubState>>,
    config: Arc<HubConfig>,
}

impl PresenceHub {
    pub fn new(config: HubConfig) -> Self {
        let registry = PresenceRegistry::new().with_unknown_page(config.unknown_page.clone());
        Self {
            state: Arc::new(RwLock::new(HubState {
                registry,
                subscribers: HashMap::new(),
            })),
            config: Arc::new(config),
        }
    }

    /// Open a connection from `country`.
    ///
    /// The returned receiver already holds the snapshot that includes the
    /// new connection; every other open connection receives it too.
    pub async fn connect(&self, country: impl Into<String>) -> (ConnectionId, SnapshotReceiver) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(self.config.outbound_queue.max(1));

        let mut state = self.state.write().await;
        if let Err(e) = state.registry.register(id.clone(), country) {
            error!(conn = %id, error = %e, "Replaced stale presence entry");
        }
        state.subscribers.insert(id.clone(), tx);
        let report = fan_out(&state);
        drop(state);

        debug!(
            conn = %id,
            total = report.snapshot.total,
            delivered = report.delivered,
            "Connection registered"
        );
        (id, rx)
    }

    /// Record that `id` is now viewing `page`.
    ///
    /// Invalid pages and unknown connections leave the state untouched and
    /// broadcast nothing.
    pub async fn visit(&self, id: &ConnectionId, page: &str) -> Result<FanoutReport, PresenceError> {
        let page = canonical_page(page, self.config.max_page_length)?;

        let mut state = self.state.write().await;
        state.registry.set_page(id, page)?;
        Ok(fan_out(&state))
    }

    /// Close `id` and notify the remaining connections.
    ///
    /// The closing connection is removed from the subscriber set first so it
    /// never receives the snapshot that excludes it. A second call for the
    /// same id returns `UnknownConnection` and broadcasts nothing.
    pub async fn disconnect(&self, id: &ConnectionId) -> Result<FanoutReport, PresenceError> {
        let mut state = self.state.write().await;
        state.subscribers.remove(id);
        state.registry.unregister(id)?;
        let report = fan_out(&state);
        drop(state);

        debug!(conn = %id, total = report.snapshot.total, "Connection unregistered");
        Ok(report)
    }

    pub async fn snapshot(&self) -> Snapshot {
        compute_snapshot(&self.state.read().await.registry)
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.registry.len()
    }
}

/// Offer the current snapshot to every subscriber without blocking.
fn fan_out(state: &HubState) -> FanoutReport {
    let snapshot = Arc::new(compute_snapshot(&state.registry));
    let mut delivered = 0;
    let mut dropped = 0;

    for (id, tx) in &state.subscribers {
        match tx.try_send(Arc::clone(&snapshot)) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                let e = PresenceError::PushFailed {
                    id: id.clone(),
                    reason: "outbound queue full".into(),
                };
                debug!(error = %e, "Snapshot dropped for slow connection");
            }
            Err(TrySendError::Closed(_)) => {
                // The connection task is exiting and will disconnect itself.
                dropped += 1;
                let e = PresenceError::PushFailed {
                    id: id.clone(),
                    reason: "receiver closed".into(),
                };
                warn!(error = %e, "Snapshot push failed");
            }
        }
    }

    FanoutReport {
        snapshot,
        delivered,
        dropped,
    }
}
