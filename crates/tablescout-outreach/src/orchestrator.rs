//! Multi-channel outreach orchestration for a single lead.
//!
//! The channel list is filtered up front (configured provider + required
//! lead data), capped at `max_attempts`, then tried in order. Every attempt
//! is recorded to the tracking store before the next one runs; the first
//! success ends the run.

use tablescout_core::{Channel, Lead, SendOutcome};
use tablescout_store::TrackingStore;

use crate::channels::{has_required_data, DEFAULT_CHANNEL_ORDER};
use crate::message::OutreachMessage;
use crate::senders::ChannelSenders;

pub const NO_AVAILABLE_CHANNELS: &str = "no_available_channels";
pub const ALL_CHANNELS_FAILED: &str = "all_channels_failed";

/// Per-run knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct OutreachOptions {
    /// Override the default try order entirely.
    pub preferred_channels: Option<Vec<Channel>>,
    pub skip_channels: Vec<Channel>,
    pub max_attempts: usize,
}

impl Default for OutreachOptions {
    fn default() -> Self {
        Self {
            preferred_channels: None,
            skip_channels: Vec::new(),
            max_attempts: 3,
        }
    }
}

/// Outcome of one orchestrated run over a single lead.
#[derive(Debug)]
pub struct OutreachRunResult {
    pub contacted: bool,
    /// The channel that got through, on success.
    pub channel: Option<Channel>,
    pub attempts: Vec<SendOutcome>,
    /// `no_available_channels` or `all_channels_failed` on failure.
    pub reason: Option<String>,
}

/// The channels this run will actually try, in order.
#[must_use]
pub fn available_channels(
    lead: &Lead,
    senders: &ChannelSenders,
    options: &OutreachOptions,
) -> Vec<Channel> {
    let order: Vec<Channel> = match &options.preferred_channels {
        Some(preferred) => preferred.clone(),
        None => DEFAULT_CHANNEL_ORDER.iter().map(|s| s.channel).collect(),
    };
    let mut channels: Vec<Channel> = order
        .into_iter()
        .filter(|c| !options.skip_channels.contains(c))
        .filter(|&c| senders.is_configured(c))
        .filter(|&c| has_required_data(c, lead))
        .collect();
    channels.truncate(options.max_attempts);
    channels
}

/// Try channels for `lead` until one gets through.
///
/// Tracking writes are best-effort: a failing store logs a warning and the
/// run continues, so a disk problem never stops live outreach mid-lead.
pub async fn send_multi_channel_outreach(
    lead: &Lead,
    message: &OutreachMessage,
    senders: &ChannelSenders,
    options: &OutreachOptions,
    tracking: &dyn TrackingStore,
) -> OutreachRunResult {
    let channels = available_channels(lead, senders, options);
    if channels.is_empty() {
        tracing::info!(lead = %lead.name, "no available outreach channels");
        return OutreachRunResult {
            contacted: false,
            channel: None,
            attempts: Vec::new(),
            reason: Some(NO_AVAILABLE_CHANNELS.to_owned()),
        };
    }

    let mut attempts: Vec<SendOutcome> = Vec::with_capacity(channels.len());
    for channel in channels {
        let outcome = senders.send(channel, lead, message).await;
        if let Err(e) = tracking.record(lead, &outcome).await {
            tracing::warn!(lead = %lead.name, %channel, error = %e, "tracking write failed");
        }

        if outcome.success {
            tracing::info!(lead = %lead.name, %channel, "outreach delivered");
            attempts.push(outcome);
            return OutreachRunResult {
                contacted: true,
                channel: Some(channel),
                attempts,
                reason: None,
            };
        }

        tracing::debug!(
            lead = %lead.name,
            %channel,
            reason = outcome.reason.as_deref().unwrap_or("unknown"),
            "channel attempt failed"
        );
        attempts.push(outcome);
    }

    OutreachRunResult {
        contacted: false,
        channel: None,
        attempts,
        reason: Some(ALL_CHANNELS_FAILED.to_owned()),
    }
}

#[path = "orchestrator_test.rs"]
#[cfg(test)]
mod tests;
