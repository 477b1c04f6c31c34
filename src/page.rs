use std::time::Duration;

use anyhow::Result;

/// Capability surface the scrape loop needs from the page-automation layer.
///
/// Everything above this trait is deterministic: discovery and the
/// convergence loop only ever see counts, marker checks, and one final HTML
/// snapshot. `pause` is a suspension point of the driver, not of the caller,
/// so tests drive both loops without real delays.
pub trait PageDriver {
    /// Load `url`. Returns false on timeout or navigation error.
    async fn navigate(&mut self, url: &str) -> Result<bool>;

    /// Number of elements currently matching `selector`.
    async fn count_blocks(&mut self, selector: &str) -> Result<usize>;

    /// Whether at least one element matches `selector`.
    async fn marker_present(&mut self, selector: &str) -> Result<bool>;

    /// Trigger one progressive-loading step (scroll to the bottom).
    async fn trigger_load_step(&mut self) -> Result<()>;

    async fn pause(&mut self, duration: Duration);

    /// Full HTML snapshot of the current document.
    async fn html(&mut self) -> Result<String>;

    /// Release the underlying session. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
