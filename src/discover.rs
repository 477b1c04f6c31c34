use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::error::ScrapeError;
use crate::page::PageDriver;

/// Block locators in priority order: the explicit card class the page has
/// shipped with for most revisions, then substring-class variants, then
/// generic container fallbacks for markup we have not seen yet.
pub const BLOCK_CANDIDATES: &[&str] = &[
    ".tool-card",
    "[class*='tool-card']",
    "[class*='tool'][class*='card']",
    ".card",
    "[class*='card']",
    "[class*='tool']",
    "article",
    "li[class*='item']",
];

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Probe each candidate in order, polling up to `timeout` for at least one
/// match, and commit the first that is present. The committed locator is
/// used unchanged for the rest of the run; earlier candidates are never
/// re-probed. No candidate matching anything is fatal: there is nothing to
/// extract.
pub async fn discover<P: PageDriver>(
    page: &mut P,
    timeout: Duration,
) -> Result<&'static str> {
    let attempts = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1) as u32;

    for &candidate in BLOCK_CANDIDATES {
        for attempt in 0..attempts {
            // A flaky query during probing reads as "not present yet".
            let count = page.count_blocks(candidate).await.unwrap_or(0);
            if count > 0 {
                info!(locator = candidate, count, "committed block locator");
                return Ok(candidate);
            }
            if attempt + 1 < attempts {
                page.pause(POLL_INTERVAL).await;
            }
        }
        debug!(locator = candidate, "candidate absent, trying next");
    }

    Err(ScrapeError::NoBlocksFound.into())
}
