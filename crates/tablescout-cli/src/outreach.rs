//! Outreach and stats command handlers.

use std::path::PathBuf;

use clap::Args;
use tablescout_core::{AppConfig, Channel};
use tablescout_outreach::{batch_outreach, BatchOptions, ChannelSenders, OutreachOptions};
use tablescout_store::{JsonLeadStore, JsonTrackingStore, LeadStore, TrackingStore};

#[derive(Debug, Args)]
pub(crate) struct OutreachArgs {
    /// Lead list to work through (default: <data-dir>/qualified-leads.json)
    #[arg(long)]
    leads: Option<PathBuf>,
    /// Plan only: log what would happen, send nothing
    #[arg(long)]
    dry_run: bool,
    /// Cap on how many leads this run may touch
    #[arg(long)]
    max: Option<usize>,
    /// Only try these channels, in this order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    channels: Vec<Channel>,
    /// Never try these channels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    skip_channels: Vec<Channel>,
    #[arg(long)]
    batch_size: Option<usize>,
    /// Pause between batches in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

/// # Errors
///
/// Returns an error if the lead list cannot be read or written, or no
/// outreach provider is configured for a live run.
pub(crate) async fn run_outreach(config: &AppConfig, args: OutreachArgs) -> anyhow::Result<()> {
    let senders = ChannelSenders::from_config(config)?;
    if !args.dry_run && !Channel::ALL.iter().any(|&c| senders.is_configured(c)) {
        anyhow::bail!(
            "no outreach provider configured - set RESEND_API_KEY, VAPI_API_KEY, \
             FACEBOOK_ACCESS_TOKEN, or INSTAGRAM_ACCESS_TOKEN"
        );
    }

    let leads_path = args
        .leads
        .unwrap_or_else(|| config.data_dir.join("qualified-leads.json"));
    let lead_store = JsonLeadStore::new(leads_path.clone());
    let mut leads = lead_store.load().await?;
    if leads.is_empty() {
        println!("No leads in {} - run `tablescout scrape` first", leads_path.display());
        return Ok(());
    }

    let options = BatchOptions {
        batch_size: args.batch_size.unwrap_or(config.batch_size),
        delay_ms: args.delay_ms.unwrap_or(config.batch_delay_ms),
        max_leads: args.max,
        dry_run: args.dry_run,
        from_name: config.from_name.clone(),
        outreach: OutreachOptions {
            preferred_channels: (!args.channels.is_empty()).then(|| args.channels.clone()),
            skip_channels: args.skip_channels.clone(),
            max_attempts: config.max_attempts,
        },
    };
    let tracking = JsonTrackingStore::new(config.data_dir.join("outreach-tracking.json"));

    let summary = batch_outreach(&mut leads, &senders, &options, &lead_store, &tracking).await?;

    if args.dry_run {
        println!("Dry run over {} leads - nothing sent", leads.len());
    } else {
        println!(
            "Outreach finished: {} contacted, {} failed, {} already contacted",
            summary.contacted, summary.failed, summary.skipped
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the tracking file exists but cannot be read.
pub(crate) async fn run_stats(config: &AppConfig) -> anyhow::Result<()> {
    let tracking = JsonTrackingStore::new(config.data_dir.join("outreach-tracking.json"));
    let stats = tracking.stats().await?;

    println!("Outreach attempts: {}", stats.total);
    println!("  successful: {}", stats.successful);
    println!("  failed:     {}", stats.failed);
    println!("By channel:");
    for (channel, counts) in &stats.by_channel {
        println!(
            "  {:<10} sent {:>4}  failed {:>4}",
            channel.as_str(),
            counts.sent,
            counts.failed
        );
    }
    Ok(())
}
