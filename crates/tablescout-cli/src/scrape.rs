//! Scrape command: collect leads from every configured source, enrich them
//! with contact emails and social profiles, qualify, and persist both the
//! full list and the qualified subset.
//!
//! Per-lead enrichment failures are logged and skipped inside the enrich
//! crate; a single unreachable website never aborts the run.

use clap::Args;
use tablescout_core::AppConfig;
use tablescout_enrich::{enrich_emails, enrich_social, EmailFinder, SocialFinder};
use tablescout_qualify::{qualify_leads, select_qualified, Probers, ScoreConfig};
use tablescout_sources::{collect_leads, LeadSources, SearchOptions};
use tablescout_store::{JsonLeadStore, LeadStore};

#[derive(Debug, Args)]
pub(crate) struct ScrapeArgs {
    /// Search area, e.g. "Fresno, CA" or "34.05,-118.24,25km"
    #[arg(long)]
    area: Option<String>,
    /// Search radius in kilometers
    #[arg(long)]
    radius_km: Option<u32>,
    /// Filter out chain restaurants
    #[arg(long)]
    independent_only: bool,
    /// Bias the search away from restaurants already on DoorDash
    #[arg(long)]
    exclude_doordash: bool,
}

/// # Errors
///
/// Returns an error if no source API key is configured, a client cannot be
/// constructed, or the lead lists cannot be written.
pub(crate) async fn run_scrape(config: &AppConfig, args: &ScrapeArgs) -> anyhow::Result<()> {
    let sources = LeadSources::from_config(config)?;
    if sources.is_empty() {
        anyhow::bail!(
            "no lead source configured - set at least one of GOOGLE_PLACES_API_KEY, \
             YELP_API_KEY, OUTSCRAPER_API_KEY"
        );
    }

    let area = args.area.as_deref().unwrap_or(&config.search_area);
    let options = SearchOptions {
        radius_km: args.radius_km.unwrap_or(config.search_radius_km),
        target_independent: args.independent_only,
        exclude_doordash: args.exclude_doordash,
        ..SearchOptions::default()
    };

    println!("Collecting leads for {area}...");
    let mut leads = collect_leads(&sources, area, &options).await;
    println!("Collected {} unique leads", leads.len());
    if leads.is_empty() {
        return Ok(());
    }

    let social_token = config
        .facebook_access_token
        .as_deref()
        .or_else(|| config.instagram_access_token.as_deref());
    let social_finder =
        SocialFinder::new(social_token, config.request_timeout_secs, &config.user_agent)?;
    enrich_social(&social_finder, &mut leads).await;

    let email_finder = EmailFinder::new(config.request_timeout_secs, &config.user_agent)?;
    enrich_emails(&email_finder, &mut leads).await;

    let probers = Probers::new(config.probe_timeout_secs, &config.user_agent)?;
    let score_config = ScoreConfig {
        max_reviews: config.max_reviews,
        qualification_threshold: config.qualification_threshold,
    };
    qualify_leads(&mut leads, &probers, &score_config).await;
    let qualified = select_qualified(&leads);

    let all_store = JsonLeadStore::new(config.data_dir.join("all-leads.json"));
    all_store.save(&leads).await?;
    let qualified_store = JsonLeadStore::new(config.data_dir.join("qualified-leads.json"));
    qualified_store.save(&qualified).await?;

    println!(
        "\n{} of {} leads qualified (threshold {})",
        qualified.len(),
        leads.len(),
        score_config.qualification_threshold
    );
    for lead in qualified.iter().take(10) {
        let issues: Vec<&str> = lead.issues.iter().map(|i| i.as_str()).collect();
        println!(
            "  {:>3}  {} - {}",
            lead.qualification_score,
            lead.name,
            issues.join(", ")
        );
    }
    println!(
        "\nSaved {} and {}",
        config.data_dir.join("all-leads.json").display(),
        config.data_dir.join("qualified-leads.json").display()
    );

    Ok(())
}
