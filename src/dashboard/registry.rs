use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-unique identifier of a dashboard connection.
pub type ConnId = u64;

/// Serialized totals, shared by every connection of one broadcast.
pub type Payload = Arc<str>;

/// Payloads a connection may have queued before further ones are dropped.
pub const OUTBOX_CAPACITY: usize = 16;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Sending side of one open dashboard connection.
///
/// The socket task owns the matching receiver and writes every queued payload
/// to the client as a text frame. Sends never block: once a client stops
/// draining its outbox, new payloads for it are dropped.
#[derive(Clone, Debug)]
pub struct DashboardConnection {
    id: ConnId,
    tx: mpsc::Sender<Payload>,
}

impl DashboardConnection {
    /// Open a new connection handle and the queue its socket task drains.
    pub fn open() -> (Self, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        let id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Queue a payload for the client. Returns `false` when the socket side
    /// is gone or its outbox is full.
    pub fn send(&self, payload: &Payload) -> bool {
        match self.tx.try_send(Arc::clone(payload)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Dashboard connection {} is not draining, payload dropped", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Set of currently open dashboard connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    conns: RwLock<HashMap<ConnId, DashboardConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a connection eligible for every future broadcast.
    pub async fn register(&self, conn: DashboardConnection) {
        let mut conns = self.conns.write().await;
        conns.insert(conn.id, conn);
        debug!("Dashboard registry now holds {} connection(s)", conns.len());
    }

    /// Remove a connection. Unknown ids are ignored and yield `false`.
    pub async fn unregister(&self, id: ConnId) -> bool {
        let mut conns = self.conns.write().await;
        let removed = conns.remove(&id).is_some();
        if removed {
            debug!("Dashboard registry now holds {} connection(s)", conns.len());
        }
        removed
    }

    /// Copy of the current members, in no particular order.
    pub async fn snapshot(&self) -> Vec<DashboardConnection> {
        self.conns.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.conns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conns.read().await.is_empty()
    }
}
