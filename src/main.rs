mod browser;
mod config;
mod convergence;
mod discover;
mod error;
mod export;
mod page;
mod parser;
mod run;
mod sink;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use browser::BrowserSession;
use config::Config;
use convergence::LoadOutcome;
use page::PageDriver;

#[derive(Parser)]
#[command(name = "toolify_scraper", about = "AI tool directory scraper via headless Chrome")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the full listing, resolve every card, write a timestamped CSV
    Scrape {
        /// Listing page to scrape (default: configured base_url)
        #[arg(long)]
        base_url: Option<String>,
        /// Directory for the output CSV
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Run Chrome with a visible window
        #[arg(long)]
        no_headless: bool,
    },
    /// Navigate and report which card locator the page satisfies
    Probe {
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape {
            base_url,
            output_dir,
            no_headless,
        } => {
            let mut cfg = Config::load()?;
            if let Some(url) = base_url {
                cfg.base_url = url;
            }
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            if no_headless {
                cfg.headless = false;
            }

            println!("Scraping {}...", cfg.base_url);
            let mut session = BrowserSession::launch(&cfg).await?;
            let outcome = run::run(&mut session, &cfg).await;
            session.close().await?;
            let summary = outcome?;

            if summary.outcome == LoadOutcome::ErrorBudgetExhausted {
                println!("Loading stopped early; results below are partial.");
            }
            println!(
                "Found {} cards via `{}`: {} saved, {} skipped.",
                summary.blocks, summary.locator, summary.accepted, summary.rejected
            );
            println!("Data written to {}", summary.output.display());
            Ok(())
        }
        Commands::Probe { base_url } => {
            let mut cfg = Config::load()?;
            if let Some(url) = base_url {
                cfg.base_url = url;
            }

            let mut session = BrowserSession::launch(&cfg).await?;
            let outcome = run::probe(&mut session, &cfg).await;
            session.close().await?;
            let locator = outcome?;

            println!("Page satisfies block locator: {locator}");
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
