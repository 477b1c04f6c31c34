use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::convergence::{self, LoadOutcome};
use crate::discover;
use crate::error::ScrapeError;
use crate::export;
use crate::page::PageDriver;
use crate::parser;
use crate::sink::RecordSink;

#[derive(Debug)]
pub struct RunSummary {
    pub locator: &'static str,
    pub outcome: LoadOutcome,
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub output: PathBuf,
}

/// Full session against one listing page: navigate, commit a block locator,
/// load until stable, resolve every card, write the CSV. The caller owns the
/// driver and is responsible for closing it on every path.
pub async fn run<P: PageDriver>(page: &mut P, config: &Config) -> Result<RunSummary> {
    if !page.navigate(&config.base_url).await? {
        return Err(ScrapeError::Navigation {
            url: config.base_url.clone(),
        }
        .into());
    }

    let locator = discover::discover(page, config.page_load_timeout()).await?;

    let load = convergence::load_all(page, locator, config).await;
    if load.outcome == LoadOutcome::ErrorBudgetExhausted {
        warn!(
            blocks = load.blocks,
            "loading aborted early, resolving the partial listing"
        );
    }

    let html = page.html().await?;
    let mut sink = RecordSink::new();
    let stats = parser::extract_records(&html, locator, &mut sink)?;

    let records = sink.drain();
    let output = export::write_csv(&records, &config.output_dir)?;
    info!(records = records.len(), output = %output.display(), "run complete");

    Ok(RunSummary {
        locator,
        outcome: load.outcome,
        blocks: stats.blocks,
        accepted: stats.accepted,
        rejected: stats.rejected,
        output,
    })
}

/// Navigate and report which block locator the page currently satisfies,
/// without loading or extracting anything.
pub async fn probe<P: PageDriver>(page: &mut P, config: &Config) -> Result<&'static str> {
    if !page.navigate(&config.base_url).await? {
        return Err(ScrapeError::Navigation {
            url: config.base_url.clone(),
        }
        .into());
    }
    discover::discover(page, config.page_load_timeout()).await
}
