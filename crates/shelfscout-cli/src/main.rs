mod enricher;
mod render;
mod repl;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use shelfscout_core::AppConfig;
use shelfscout_scraper::{PageScraper, PageTarget};
use shelfscout_session::{EnrichmentOrchestrator, MessageSlot, PendingEnrichment, Session};
use tracing_subscriber::EnvFilter;

use crate::enricher::Enricher;
use crate::render::{render_outcome, render_page};

#[derive(Debug, Parser)]
#[command(name = "shelfscout")]
#[command(about = "Scrape product listings, find similar products, export to xlsx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape a listing once and print a page
    Scrape {
        #[command(flatten)]
        source: SourceArgs,
        /// Page to print (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Global row index to search similar products for (repeatable)
        #[arg(long = "similar", value_name = "ROW")]
        similar: Vec<usize>,
        /// Export every product to an xlsx file (defaults to SHELFSCOUT_EXPORT_PATH)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Scrape a listing and browse it interactively
    Browse {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Listing page URL
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    url: Option<String>,
    /// Saved HTML file to scrape instead of a live page
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Origin used to resolve relative image paths in --file
    #[arg(long, value_name = "URL", requires = "file", conflicts_with = "url")]
    origin: Option<String>,
}

impl SourceArgs {
    fn target(&self) -> anyhow::Result<PageTarget> {
        let target = match (&self.url, &self.file) {
            (Some(_), _) if self.origin.is_some() => {
                anyhow::bail!("--origin only applies to --file")
            }
            (Some(url), _) => PageTarget::parse_url(url)?,
            (None, Some(path)) => PageTarget::file(path, self.origin.as_deref())?,
            (None, None) => anyhow::bail!("either a URL or --file is required"),
        };
        Ok(target)
    }
}

type CliSession = Session<PageScraper, Enricher>;

fn build_session(config: &AppConfig, source: &SourceArgs) -> anyhow::Result<CliSession> {
    let target = source.target()?;
    let host = target.host();
    let scraper = PageScraper::from_config(config, target).context("failed to build scraper")?;
    let enricher =
        Enricher::from_config(config).context("failed to build enrichment client")?;
    let orchestrator = EnrichmentOrchestrator::new(enricher, MessageSlot::new())
        .with_exclude_site(host.as_deref());
    Ok(Session::new(scraper, orchestrator))
}

async fn print_message(session: &CliSession) {
    if let Some(message) = session.message().current().await {
        println!("! {message}");
    }
}

async fn run_scrape(
    config: &AppConfig,
    source: &SourceArgs,
    page: usize,
    similar: &[usize],
    export: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let mut session = build_session(config, source)?;
    if let Err(e) = session.scrape().await {
        print_message(&session).await;
        return Err(e.into());
    }
    if page != 1 {
        session.set_page(page).await;
    }

    if !similar.is_empty() {
        let mut requests = Vec::with_capacity(similar.len());
        for &row in similar {
            match session.prepare_enrichment(row) {
                Ok(pending) => requests.push(pending),
                Err(e) => println!("{e}"),
            }
        }
        let rows: Vec<usize> = requests.iter().map(PendingEnrichment::row).collect();
        let outcomes =
            futures::future::join_all(requests.into_iter().map(PendingEnrichment::run)).await;
        for (row, outcome) in rows.into_iter().zip(&outcomes) {
            println!("{}", render_outcome(row, outcome));
        }
    }

    print!("{}", render_page(&session.page_view().await));
    print_message(&session).await;

    if let Some(path) = export {
        let path = path.unwrap_or_else(|| config.export_path.clone());
        let count = session.export(&path).await?;
        println!("exported {count} products to {}", path.display());
    }
    Ok(())
}

async fn run_browse(config: &AppConfig, source: &SourceArgs) -> anyhow::Result<()> {
    let mut session = build_session(config, source)?;
    if let Err(e) = session.scrape().await {
        tracing::debug!(error = %e, "initial scrape failed");
    }
    repl::run_repl(&mut session, &config.export_path).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shelfscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape {
            source,
            page,
            similar,
            export,
        } => run_scrape(&config, &source, page, &similar, export).await,
        Commands::Browse { source } => run_browse(&config, &source).await,
    }
}
