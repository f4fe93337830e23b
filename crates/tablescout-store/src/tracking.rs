//! JSON-file tracking store.
//!
//! Layout (consumed by downstream reporting, do not change):
//!
//! ```json
//! { "outreach": [ { "lead_id", "lead_name", "channel", "success",
//!                   "reason", "retry", "timestamp" } ],
//!   "stats": { "total", "successful", "failed",
//!              "by_channel": { "email": { "sent", "failed" }, ... } } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablescout_core::{Channel, Lead, SendOutcome};
use tokio::sync::Mutex;

use crate::{StoreError, TrackingStore};

/// One persisted outreach attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub lead_id: String,
    pub lead_name: String,
    pub channel: Channel,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub retry: bool,
    pub timestamp: DateTime<Utc>,
}

/// Per-channel sent/failed counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChannelStats {
    pub sent: u64,
    pub failed: u64,
}

/// Aggregate counters. Invariant after every write:
/// `total == successful + failed` and
/// `successful == sum(by_channel[*].sent)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub by_channel: BTreeMap<Channel, ChannelStats>,
}

impl Default for OutreachStats {
    fn default() -> Self {
        let by_channel = Channel::ALL
            .iter()
            .map(|&c| (c, ChannelStats::default()))
            .collect();
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            by_channel,
        }
    }
}

impl OutreachStats {
    fn apply(&mut self, outcome: &SendOutcome) {
        self.total += 1;
        let channel = self.by_channel.entry(outcome.channel).or_default();
        if outcome.success {
            self.successful += 1;
            channel.sent += 1;
        } else {
            self.failed += 1;
            channel.failed += 1;
        }
    }
}

/// Full persisted tracking state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingLog {
    #[serde(default)]
    pub outreach: Vec<AttemptRecord>,
    #[serde(default)]
    pub stats: OutreachStats,
}

impl TrackingLog {
    /// Append one attempt and update the aggregates.
    pub fn push(&mut self, lead: &Lead, outcome: &SendOutcome) {
        self.outreach.push(AttemptRecord {
            lead_id: lead.tracking_id(),
            lead_name: lead.name.clone(),
            channel: outcome.channel,
            success: outcome.success,
            reason: outcome.reason.clone(),
            retry: outcome.retry,
            timestamp: Utc::now(),
        });
        self.stats.apply(outcome);
    }
}

/// File-backed tracking store.
///
/// Read-modify-write of one JSON file, serialized within the process by an
/// internal mutex. Assumes a single running instance; concurrent processes
/// writing the same file can lose updates.
pub struct JsonTrackingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonTrackingStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<TrackingLog, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Json {
                path: self.path.display().to_string(),
                source: e,
            }),
            // Missing file means no attempts yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TrackingLog::default()),
            Err(e) => Err(StoreError::Io {
                path: self.path.display().to_string(),
                source: e,
            }),
        }
    }

    async fn write(&self, log: &TrackingLog) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io {
                    path: parent.display().to_string(),
                    source: e,
                })?;
        }
        let json = serde_json::to_vec_pretty(log).map_err(|e| StoreError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.display().to_string(),
                source: e,
            })
    }

    /// Full log, for reporting commands.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on unreadable or malformed files.
    pub async fn log(&self) -> Result<TrackingLog, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }
}

#[async_trait]
impl TrackingStore for JsonTrackingStore {
    async fn record(&self, lead: &Lead, outcome: &SendOutcome) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut log = self.load().await?;
        log.push(lead, outcome);
        self.write(&log).await
    }

    async fn stats(&self) -> Result<OutreachStats, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.stats)
    }
}
