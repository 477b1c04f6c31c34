pub mod filter;
pub mod resolve;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{Html, Selector};
use tracing::info;

use crate::sink::RecordSink;

/// Per-pass totals. `blocks` counts everything the committed locator
/// matched; rejected blocks are the expected ad/promo injections.
#[derive(Debug)]
pub struct ResolveStats {
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Single pass over the final page snapshot: select every card with the
/// committed locator, run the field cascades on each, feed the sink.
/// Card handles never outlive this pass.
pub fn extract_records(
    html: &str,
    block_selector: &str,
    sink: &mut RecordSink,
) -> Result<ResolveStats> {
    let selector = Selector::parse(block_selector)
        .map_err(|e| anyhow!("Committed locator failed to parse: {e}"))?;
    let document = Html::parse_document(html);
    let blocks: Vec<_> = document.select(&selector).collect();

    let pb = ProgressBar::new(blocks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} cards")
            .unwrap()
            .progress_chars("#>-"),
    );

    let before = sink.len();
    let mut rejected = 0usize;
    for block in &blocks {
        let record = resolve::resolve(*block);
        if record.is_none() {
            rejected += 1;
        }
        sink.add(record);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = ResolveStats {
        blocks: blocks.len(),
        accepted: sink.len() - before,
        rejected,
    };
    info!(
        blocks = stats.blocks,
        accepted = stats.accepted,
        rejected = stats.rejected,
        "resolution pass complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="tool-card">
            <a href="/t/alpha">Alpha Writer</a>
            <p class="description">Generates product announcements from changelogs.</p>
          </div>
          <div class="tool-card">
            <a href="/promo">Sponsored by MegaCorp</a>
          </div>
          <div class="tool-card">
            <a href="/t/beta">Beta Voice</a>
            <span class="category">Audio</span>
            <p class="description">Clones a narration voice from a short sample.</p>
          </div>
        </body></html>"#;

    #[test]
    fn accepted_records_keep_page_order() {
        let mut sink = RecordSink::new();
        let stats = extract_records(LISTING, ".tool-card", &mut sink).unwrap();

        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 1);

        let names: Vec<String> = sink.drain().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Alpha Writer", "Beta Voice"]);
    }

    #[test]
    fn bad_selector_is_an_error() {
        let mut sink = RecordSink::new();
        assert!(extract_records(LISTING, ":::", &mut sink).is_err());
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let mut sink = RecordSink::new();
        let stats = extract_records(LISTING, ".absent", &mut sink).unwrap();
        assert_eq!(stats.blocks, 0);
        assert!(sink.is_empty());
    }
}
