//! Batch driver: runs orchestrated outreach over a lead list in
//! fixed-size concurrent batches, persisting progress at batch boundaries.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tablescout_core::{Lead, LeadStatus};
use tablescout_store::{LeadStore, TrackingStore};

use crate::error::OutreachError;
use crate::message::build_message;
use crate::orchestrator::{available_channels, send_multi_channel_outreach, OutreachOptions};
use crate::senders::ChannelSenders;

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Pause between batches, not within one.
    pub delay_ms: u64,
    /// Cap on how many leads this run may touch.
    pub max_leads: Option<usize>,
    /// Plan only: log what would happen, no network, no writes.
    pub dry_run: bool,
    pub from_name: String,
    pub outreach: OutreachOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay_ms: 3000,
            max_leads: None,
            dry_run: false,
            from_name: String::new(),
            outreach: OutreachOptions::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub contacted: usize,
    pub failed: usize,
    /// Leads already contacted in a previous run.
    pub skipped: usize,
}

/// Run outreach over `leads`, mutating status fields in place.
///
/// Leads already marked contacted are skipped. Within a batch all leads run
/// concurrently and one lead's failure never aborts its siblings. The full
/// lead list is saved after every batch so an interrupted run never
/// re-contacts anyone.
///
/// # Errors
///
/// Returns [`OutreachError::Store`] if persisting the lead list fails.
pub async fn batch_outreach(
    leads: &mut [Lead],
    senders: &ChannelSenders,
    options: &BatchOptions,
    lead_store: &dyn LeadStore,
    tracking: &dyn TrackingStore,
) -> Result<BatchSummary, OutreachError> {
    let mut summary = BatchSummary::default();

    let mut eligible: Vec<usize> = Vec::new();
    for (idx, lead) in leads.iter().enumerate() {
        if lead.status.is_contacted() {
            summary.skipped += 1;
        } else {
            eligible.push(idx);
        }
    }
    if let Some(cap) = options.max_leads {
        eligible.truncate(cap);
    }
    tracing::info!(
        eligible = eligible.len(),
        skipped = summary.skipped,
        dry_run = options.dry_run,
        "starting outreach run"
    );

    if options.dry_run {
        for &idx in &eligible {
            let lead = &leads[idx];
            let channels = available_channels(lead, senders, &options.outreach);
            tracing::info!(
                lead = %lead.name,
                channels = ?channels,
                "dry run: would attempt"
            );
        }
        return Ok(summary);
    }

    let batch_size = options.batch_size.max(1);
    let batches: Vec<&[usize]> = eligible.chunks(batch_size).collect();
    let batch_count = batches.len();

    for (batch_no, batch) in batches.into_iter().enumerate() {
        let runs = batch.iter().map(|&idx| {
            let lead = leads[idx].clone();
            async move {
                let message = build_message(&lead, &options.from_name);
                let result =
                    send_multi_channel_outreach(&lead, &message, senders, &options.outreach, tracking)
                        .await;
                (idx, result)
            }
        });

        for (idx, result) in join_all(runs).await {
            if result.contacted {
                summary.contacted += 1;
                let lead = &mut leads[idx];
                lead.status = LeadStatus::Contacted;
                lead.contacted_at = Some(Utc::now());
                lead.contact_channel = result.channel;
            } else {
                summary.failed += 1;
            }
        }

        lead_store.save(leads).await?;

        if batch_no + 1 < batch_count && options.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.delay_ms)).await;
        }
    }

    tracing::info!(
        contacted = summary.contacted,
        failed = summary.failed,
        skipped = summary.skipped,
        "outreach run finished"
    );
    Ok(summary)
}
