//! `ib-samples` command-line interface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ib_sample_scraper::config::Config;
use ib_sample_scraper::server::{self, AppState};
use ib_sample_scraper::{
    export, BatchReport, Harvester, HttpFetcher, ListingSource, SampleFilter, SampleStore,
    SqliteStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ib-samples",
    about = "Scrape IB IA/EE samples into structured records",
    version
)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured listing, export JSON and store the records.
    Scrape {
        /// Override the JSON output path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip writing to the database.
        #[arg(long)]
        no_store: bool,

        /// Abort the whole run after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the sample links found on listing pages.
    Links {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Fetch one sample page and print it as JSON.
    Parse { url: String },

    /// Start the HTTP query service.
    Serve,

    /// Print the number of stored samples.
    Count {
        #[arg(long)]
        subject: Option<String>,
    },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn harvester(config: &Config) -> Result<Harvester> {
    let fetcher = HttpFetcher::new(&config.scrape.user_agent, config.scrape.timeout())
        .context("failed to build HTTP client")?;
    Ok(Harvester::new(fetcher, config.site.clone()))
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::connect(&config.db.path)
        .await
        .with_context(|| format!("failed to open database {}", config.db.path.display()))
}

async fn scrape(
    config: &Config,
    output: Option<PathBuf>,
    no_store: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let harvester = harvester(config)?;
    let listings = &config.scrape.listings;

    let run = async {
        if no_store {
            Ok::<_, anyhow::Error>((harvester.run(listings).await?, None))
        } else {
            let store = open_store(config).await?;
            let summary = harvester.harvest_into(listings, &store).await?;
            Ok((summary.report, Some(summary.stored)))
        }
    };

    let (report, stored): (BatchReport, Option<usize>) = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .with_context(|| format!("scrape timed out after {secs}s"))??,
        None => run.await?,
    };

    for failure in &report.failures {
        warn!(url = %failure.url, stage = ?failure.stage, "{}", failure.message);
    }

    let output = output.unwrap_or_else(|| config.scrape.output_path.clone());
    export::write_json(&output, &report.records)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "scraped {} of {} sample(s), {} failure(s), wrote {}",
        report.records.len(),
        report.links_found,
        report.failures.len(),
        output.display()
    );
    if let Some(stored) = stored {
        println!("stored {stored} sample(s) in {}", config.db.path.display());
    }
    Ok(())
}

async fn print_links(config: &Config, urls: Vec<String>) -> Result<()> {
    let harvester = harvester(config)?;
    let listings: Vec<ListingSource> = urls.into_iter().map(ListingSource::new).collect();
    let discovery = harvester.discover(&listings).await?;

    for link in &discovery.links {
        println!("{}", link.url);
    }
    if !discovery.failures.is_empty() {
        bail!("{} listing(s) could not be fetched", discovery.failures.len());
    }
    Ok(())
}

async fn print_sample(config: &Config, url: &str) -> Result<()> {
    let harvester = harvester(config)?;
    let record = harvester
        .scrape_sample(url, &config.site.default_subject)
        .await
        .with_context(|| format!("failed to scrape {url}"))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn serve(config: &Config) -> Result<()> {
    let addr = config.server.bind_addr()?;
    let store: Arc<dyn SampleStore> = Arc::new(open_store(config).await?);
    let state = AppState::new(store, harvester(config)?, config.scrape.listings.clone());
    server::run_server(addr, state).await?;
    Ok(())
}

async fn count(config: &Config, subject: Option<String>) -> Result<()> {
    let store = open_store(config).await?;
    let filter = SampleFilter { subject };
    let total = store.count(&filter).await?;
    match &filter.subject {
        Some(subject) => println!("{total} sample(s) for {subject}"),
        None => println!("{total} sample(s)"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    info!(listings = config.scrape.listings.len(), "configuration loaded");

    match cli.command {
        Commands::Scrape {
            output,
            no_store,
            timeout_secs,
        } => scrape(&config, output, no_store, timeout_secs).await,
        Commands::Links { urls } => {
            for url in &urls {
                if !ib_sample_scraper::url_utils::is_http_url(url) {
                    bail!("not an http(s) URL: {url}");
                }
            }
            print_links(&config, urls).await
        }
        Commands::Parse { url } => print_sample(&config, &url).await,
        Commands::Serve => serve(&config).await,
        Commands::Count { subject } => count(&config, subject).await,
    }
}
