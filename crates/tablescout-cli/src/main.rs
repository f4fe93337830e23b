use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod outreach;
mod scrape;

#[derive(Debug, Parser)]
#[command(name = "tablescout")]
#[command(about = "Restaurant lead qualification and multi-channel outreach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect, enrich, and qualify restaurant leads
    Scrape(scrape::ScrapeArgs),
    /// Run multi-channel outreach over qualified leads
    Outreach(outreach::OutreachArgs),
    /// Print outreach tracking aggregates
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tablescout_core::load_app_config_from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => scrape::run_scrape(&config, &args).await,
        Commands::Outreach(args) => outreach::run_outreach(&config, args).await,
        Commands::Stats => outreach::run_stats(&config).await,
    }
}
