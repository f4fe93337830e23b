//! Storage interfaces for the outreach pipeline.
//!
//! Orchestration code talks to [`LeadStore`] and [`TrackingStore`] trait
//! objects; the JSON-file implementations here match the on-disk layout the
//! reporting scripts consume. A relational or key-value store can be
//! substituted without touching orchestration logic.

mod leads;
mod memory;
mod tracking;

pub use leads::JsonLeadStore;
pub use memory::MemoryTrackingStore;
pub use tracking::{
    AttemptRecord, ChannelStats, JsonTrackingStore, OutreachStats, TrackingLog,
};

use async_trait::async_trait;
use tablescout_core::{Lead, SendOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted record of every outreach attempt plus aggregate counters.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Append one attempt and update the aggregates.
    async fn record(&self, lead: &Lead, outcome: &SendOutcome) -> Result<(), StoreError>;

    /// Current aggregate counters.
    async fn stats(&self) -> Result<OutreachStats, StoreError>;
}

/// Persisted lead list, overwritten in full at batch boundaries.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Lead>, StoreError>;
    async fn save(&self, leads: &[Lead]) -> Result<(), StoreError>;
}
