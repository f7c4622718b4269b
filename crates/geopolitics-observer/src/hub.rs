//! Connection registry and snapshot fan-out.
//!
//! Every observer connection gets a bounded queue of serialized frames and
//! its own delivery task draining that queue into the socket. Broadcasting
//! serializes the snapshot once and `try_send`s the same frame to every
//! queue, so it never waits on a socket:
//!
//! - a **full** queue means the observer is not keeping up; it is evicted
//!   (its sender is dropped, its delivery task finishes, the socket closes)
//! - a **closed** queue means the connection already went away; it is
//!   removed
//!
//! Snapshots carry the full world, so an evicted observer that reconnects
//! is whole again from its baseline frame.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::extract::ws::Utf8Bytes;
use geopolitics_core::simulation::{PublishError, SnapshotPublisher};
use geopolitics_types::{ConnectionId, WorldSnapshot};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Errors from the broadcast hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The snapshot could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<HubError> for PublishError {
    fn from(error: HubError) -> Self {
        match error {
            HubError::Serialize(source) => Self::Serialize { source },
        }
    }
}

/// A registered connection's end of its outbound queue.
#[derive(Debug)]
pub struct Subscription {
    /// The connection's registry key.
    pub id: ConnectionId,
    /// Serialized snapshots, baseline first.
    pub frames: mpsc::Receiver<Utf8Bytes>,
}

/// Registry of live observer connections.
#[derive(Debug)]
pub struct BroadcastHub {
    connections: Mutex<BTreeMap<ConnectionId, mpsc::Sender<Utf8Bytes>>>,
    capacity: usize,
    evicted: AtomicU64,
}

impl BroadcastHub {
    /// Create a hub whose per-connection queues hold `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            connections: Mutex::new(BTreeMap::new()),
            capacity: capacity.max(1),
            evicted: AtomicU64::new(0),
        }
    }

    fn registry(&self) -> MutexGuard<'_, BTreeMap<ConnectionId, mpsc::Sender<Utf8Bytes>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a connection whose first frame is `baseline`.
    ///
    /// Call this with the world lock held (see
    /// [`Simulation::with_world`](geopolitics_core::simulation::Simulation::with_world))
    /// so no tick can be broadcast between the baseline and registration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Serialize`] if the baseline cannot be serialized.
    pub fn register(&self, baseline: &WorldSnapshot) -> Result<Subscription, HubError> {
        let frame = encode(baseline)?;
        let (tx, rx) = mpsc::channel(self.capacity);
        // A fresh queue always has room for the baseline.
        let _ = tx.try_send(frame);

        let id = ConnectionId::new();
        let connections = {
            let mut registry = self.registry();
            registry.insert(id, tx);
            registry.len()
        };
        debug!(connection = %id, connections, "Observer registered");

        Ok(Subscription { id, frames: rx })
    }

    /// Remove a connection. Returns whether it was still registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.registry().remove(&id).is_some();
        if removed {
            debug!(connection = %id, "Observer unregistered");
        }
        removed
    }

    /// Serialize `snapshot` once and queue it for every connection.
    ///
    /// Returns the number of connections the frame was queued for.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Serialize`] if the snapshot cannot be serialized.
    /// Nothing is queued in that case.
    pub fn broadcast(&self, snapshot: &WorldSnapshot) -> Result<usize, HubError> {
        Ok(self.broadcast_frame(&encode(snapshot)?))
    }

    /// Queue an already-serialized frame for every connection.
    pub fn broadcast_frame(&self, frame: &Utf8Bytes) -> usize {
        let mut registry = self.registry();
        let mut delivered: usize = 0;

        registry.retain(|id, tx| match tx.try_send(frame.clone()) {
            Ok(()) => {
                delivered = delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.evicted.fetch_add(1, Ordering::Relaxed);
                warn!(connection = %id, capacity = self.capacity, "Observer too slow, evicting");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection = %id, "Observer gone, removing");
                false
            }
        });

        delivered
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.registry().len()
    }

    /// Number of connections evicted for falling behind.
    pub fn evicted_count(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl SnapshotPublisher for BroadcastHub {
    fn publish(&self, snapshot: &WorldSnapshot) -> Result<usize, PublishError> {
        self.broadcast(snapshot).map_err(PublishError::from)
    }
}

/// Serialize a snapshot into a text frame.
///
/// # Errors
///
/// Returns [`HubError::Serialize`] on serialization failure.
pub fn encode(snapshot: &WorldSnapshot) -> Result<Utf8Bytes, HubError> {
    Ok(Utf8Bytes::from(serde_json::to_string(snapshot)?))
}
