use thiserror::Error;

/// Fatal failures that abort a run. Everything transient is absorbed where
/// it happens (convergence loop, per-card resolution) and never reaches here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no card locator matched any candidate on the page")]
    NoBlocksFound,

    #[error("failed to load {url}")]
    Navigation { url: String },
}
