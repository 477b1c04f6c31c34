use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::page::PageDriver;

/// Markers some page revisions append once the listing is exhausted.
/// Finding one short-circuits the stability wait.
pub const END_MARKERS: &str = ".end-of-content, .no-more-content";

/// Why the loading loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Block count held steady long enough.
    Stable,
    /// Explicit end-of-content marker appeared.
    EndMarker,
    /// Too many consecutive trigger/query failures; the partial set stands.
    ErrorBudgetExhausted,
}

#[derive(Debug)]
pub struct LoadSummary {
    pub outcome: LoadOutcome,
    /// Last successfully observed block count.
    pub blocks: usize,
    pub rounds: u32,
}

/// Stability is a streak of identical consecutive observations; errors burn
/// a separate budget. Keeping the two axes apart means one flaky query can
/// neither fake an end-of-content nor erase observed progress.
#[derive(Debug, Default)]
struct ConvergenceState {
    last_observed: Option<usize>,
    stable_rounds: u32,
    error_retries: u32,
}

impl ConvergenceState {
    /// Record one successful count. Returns the current streak length.
    fn observe(&mut self, count: usize) -> u32 {
        if self.last_observed == Some(count) {
            self.stable_rounds += 1;
        } else {
            self.last_observed = Some(count);
            self.stable_rounds = 1;
        }
        self.error_retries = 0;
        self.stable_rounds
    }

    fn record_error(&mut self) -> u32 {
        self.error_retries += 1;
        self.error_retries
    }
}

/// Drive progressive loading until the listing stops growing.
///
/// Each round: one load trigger (scroll to bottom), a pause for asynchronous
/// content to materialize, an end-marker check, then a re-count through the
/// committed locator. Never fails: error-budget exhaustion degrades to
/// whatever was loaded.
pub async fn load_all<P: PageDriver>(
    page: &mut P,
    selector: &str,
    config: &Config,
) -> LoadSummary {
    let mut state = ConvergenceState::default();
    let mut rounds = 0u32;

    loop {
        rounds += 1;
        match load_round(page, selector, config.load_step_pause()).await {
            Ok(Reading::EndMarker) => {
                info!(rounds, "end-of-content marker found");
                return LoadSummary {
                    outcome: LoadOutcome::EndMarker,
                    blocks: state.last_observed.unwrap_or(0),
                    rounds,
                };
            }
            Ok(Reading::Count(count)) => {
                let streak = state.observe(count);
                debug!(count, streak, "load round observed");
                if streak >= config.max_retries {
                    info!(blocks = count, rounds, "block count converged");
                    return LoadSummary {
                        outcome: LoadOutcome::Stable,
                        blocks: count,
                        rounds,
                    };
                }
            }
            Err(e) => {
                let used = state.record_error();
                warn!(
                    error = %e,
                    attempt = used,
                    budget = config.max_retries,
                    "load round failed"
                );
                if used >= config.max_retries {
                    warn!("error budget exhausted, continuing with partial listing");
                    return LoadSummary {
                        outcome: LoadOutcome::ErrorBudgetExhausted,
                        blocks: state.last_observed.unwrap_or(0),
                        rounds,
                    };
                }
                page.pause(config.retry_delay()).await;
            }
        }
    }
}

enum Reading {
    Count(usize),
    EndMarker,
}

async fn load_round<P: PageDriver>(
    page: &mut P,
    selector: &str,
    pause: Duration,
) -> Result<Reading> {
    page.trigger_load_step().await?;
    page.pause(pause).await;

    if page.marker_present(END_MARKERS).await? {
        return Ok(Reading::EndMarker);
    }
    Ok(Reading::Count(page.count_blocks(selector).await?))
}
