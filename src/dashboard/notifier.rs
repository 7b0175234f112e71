use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::registry::{ConnectionRegistry, Payload};
use crate::db::{CountSource, StoreError};

/// Aggregate counts pushed to every dashboard client.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsSnapshot {
    #[serde(rename = "TotalUser")]
    pub total_users: u64,
    #[serde(rename = "TotalPoi")]
    pub total_pois: u64,
    #[serde(rename = "TotalRating")]
    pub total_ratings: u64,
}

/// A completed write that changed one of the counted totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountChange {
    UserCreated,
    UserDeleted,
    PoiCreated,
    PoiDeleted,
    RatingCreated,
    RatingDeleted,
}

impl fmt::Display for CountChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CountChange::UserCreated => "user created",
            CountChange::UserDeleted => "user deleted",
            CountChange::PoiCreated => "poi created",
            CountChange::PoiDeleted => "poi deleted",
            CountChange::RatingCreated => "rating created",
            CountChange::RatingDeleted => "rating deleted",
        };
        f.write_str(s)
    }
}

/// Recomputes the totals and fans them out to the dashboard registry.
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
    counts: Arc<dyn CountSource>,
}

impl Notifier {
    pub fn new(registry: Arc<ConnectionRegistry>, counts: Arc<dyn CountSource>) -> Self {
        Self { registry, counts }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Query the three counts. Each one is an independent point-in-time read.
    pub async fn snapshot(&self) -> Result<TotalsSnapshot, StoreError> {
        let (total_users, total_pois, total_ratings) = tokio::try_join!(
            self.counts.count_users(),
            self.counts.count_pois(),
            self.counts.count_ratings(),
        )?;
        Ok(TotalsSnapshot {
            total_users,
            total_pois,
            total_ratings,
        })
    }

    /// Push fresh totals to every registered connection.
    ///
    /// Returns how many connections accepted the message; callers are free to
    /// ignore it. A failed count query aborts the broadcast before anything
    /// is sent.
    pub async fn notify_all(&self) -> usize {
        match self.snapshot().await {
            Ok(snapshot) => self.broadcast(&snapshot).await,
            Err(e) => {
                warn!("Skipping dashboard broadcast, count query failed: {}", e);
                0
            }
        }
    }

    /// Fan already computed totals out to every registered connection.
    ///
    /// The payload is serialized once and shared. A failed send means the
    /// socket is closing or not draining; its own close handling unregisters it.
    pub async fn broadcast(&self, snapshot: &TotalsSnapshot) -> usize {
        let payload: Payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload.into(),
            Err(e) => {
                warn!("Skipping dashboard broadcast, serialization failed: {}", e);
                return 0;
            }
        };

        let conns = self.registry.snapshot().await;
        let attempted = conns.len();
        let delivered = conns.iter().filter(|conn| conn.send(&payload)).count();

        debug!(
            "Broadcast {} to {}/{} dashboard connection(s)",
            payload, delivered, attempted
        );
        delivered
    }

    /// Hook for every count-changing write. The broadcast runs on its own
    /// task so the caller's response is never delayed or affected.
    pub fn counts_changed(&self, change: CountChange) {
        info!("Count changed ({}), notifying dashboards", change);
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify_all().await;
        });
    }

    /// Push totals someone just read to the dashboards, in the background.
    pub fn publish(&self, snapshot: TotalsSnapshot) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.broadcast(&snapshot).await;
        });
    }
}
