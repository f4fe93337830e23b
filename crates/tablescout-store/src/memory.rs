//! In-memory tracking store for tests and dry runs.

use async_trait::async_trait;
use tablescout_core::{Lead, SendOutcome};
use tokio::sync::Mutex;

use crate::tracking::{OutreachStats, TrackingLog};
use crate::{StoreError, TrackingStore};

#[derive(Default)]
pub struct MemoryTrackingStore {
    log: Mutex<TrackingLog>,
}

impl MemoryTrackingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the accumulated log.
    pub async fn log(&self) -> TrackingLog {
        self.log.lock().await.clone()
    }
}

#[async_trait]
impl TrackingStore for MemoryTrackingStore {
    async fn record(&self, lead: &Lead, outcome: &SendOutcome) -> Result<(), StoreError> {
        self.log.lock().await.push(lead, outcome);
        Ok(())
    }

    async fn stats(&self) -> Result<OutreachStats, StoreError> {
        Ok(self.log.lock().await.stats.clone())
    }
}
