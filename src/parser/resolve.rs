use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use super::filter::is_valid_name;
use crate::sink::Record;

/// Sentinel for cards without a recognizable category element.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Descriptions at or under this many characters are badge labels or repeated
/// name snippets, not descriptions.
const MIN_DESCRIPTION_CHARS: usize = 10;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

// Markup shifts between page revisions, so every field is a priority-ordered
// cascade: explicit class names first, substring-class and structural
// fallbacks last. First satisfying candidate wins.
static NAME_CANDIDATES: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[
        "h2",
        "h3",
        "h4",
        "a h2",
        "a h3",
        "a h4",
        ".title",
        "[class*='name']",
        "[class*='title']",
        "a .title",
        "a [class*='name']",
        "a [class*='title']",
        "[class*='heading']",
        "a [class*='heading']",
    ])
});

static CATEGORY_CANDIDATES: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[
        ".category",
        "[class*='category']",
        "[class*='tag']",
        ".pill",
    ])
});

static DESCRIPTION_CANDIDATES: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[
        ".description",
        "[class*='desc']",
        "[class*='content']",
        "p",
        "[class*='text']",
        "[class*='info'] p",
        "div > p",
    ])
});

static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

struct Candidate {
    pattern: &'static str,
    selector: Selector,
}

fn candidates(patterns: &[&'static str]) -> Vec<Candidate> {
    patterns
        .iter()
        .map(|&pattern| Candidate {
            pattern,
            selector: Selector::parse(pattern).unwrap(),
        })
        .collect()
}

/// One resolved field value plus which candidate produced it.
#[derive(Debug)]
pub struct ExtractionResult {
    pub value: String,
    pub provenance: &'static str,
}

impl ExtractionResult {
    fn new(value: String, provenance: &'static str) -> Self {
        Self { value, provenance }
    }

    fn default_value(value: &str) -> Self {
        Self::new(value.to_string(), "default")
    }
}

/// Resolve one card into a record, or `None` for cards that yield no valid
/// name (ad and promo injections, mostly). Field absence never rejects;
/// only the name is mandatory.
pub fn resolve(block: ElementRef<'_>) -> Option<Record> {
    let name = resolve_name(block)?;
    let url = resolve_url(block);
    let category = resolve_category(block);
    let description = resolve_description(block, &name.value);

    debug!(
        name = %name.value,
        name_source = name.provenance,
        url_source = url.provenance,
        "resolved card"
    );

    Some(Record {
        name: name.value,
        url: url.value,
        category: category.value,
        description: description.value,
        created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

/// Anchor text first, then heading/title-class candidates. Each hit must
/// clear the plausibility filter; an implausible hit falls through to the
/// next candidate rather than rejecting the card outright.
fn resolve_name(block: ElementRef<'_>) -> Option<ExtractionResult> {
    if let Some(anchor) = block.select(&ANCHOR).next() {
        let text = line_text(anchor);
        if !text.is_empty() && is_valid_name(&text) {
            return Some(ExtractionResult::new(text, "a"));
        }
    }

    for candidate in NAME_CANDIDATES.iter() {
        if let Some(element) = block.select(&candidate.selector).next() {
            let text = line_text(element);
            if !text.is_empty() && is_valid_name(&text) {
                return Some(ExtractionResult::new(text, candidate.pattern));
            }
        }
    }

    None
}

/// The card root may itself be the link, or wrap one. A card without any
/// href still produces a record (script-driven navigation is common).
fn resolve_url(block: ElementRef<'_>) -> ExtractionResult {
    if let Some(href) = block.value().attr("href") {
        return ExtractionResult::new(href.to_string(), "self[href]");
    }
    if let Some(href) = block
        .select(&ANCHOR)
        .find_map(|a| a.value().attr("href"))
    {
        return ExtractionResult::new(href.to_string(), "a[href]");
    }
    ExtractionResult::default_value("")
}

fn resolve_category(block: ElementRef<'_>) -> ExtractionResult {
    for candidate in CATEGORY_CANDIDATES.iter() {
        if let Some(element) = block.select(&candidate.selector).next() {
            let text = flat_text(element);
            if !text.is_empty() {
                return ExtractionResult::new(text, candidate.pattern);
            }
        }
    }
    ExtractionResult::default_value(UNCATEGORIZED)
}

/// Among all matches of all candidates, take the first that is non-empty,
/// not just the name again, and long enough to be prose.
fn resolve_description(block: ElementRef<'_>, name: &str) -> ExtractionResult {
    for candidate in DESCRIPTION_CANDIDATES.iter() {
        for element in block.select(&candidate.selector) {
            let text = flat_text(element);
            if !text.is_empty() && text != name && text.chars().count() > MIN_DESCRIPTION_CHARS {
                return ExtractionResult::new(text, candidate.pattern);
            }
        }
    }
    ExtractionResult::default_value("")
}

/// Text content with source indentation collapsed but line structure kept,
/// so the plausibility filter can see when a selector swallowed several
/// visual lines at once.
fn line_text(element: ElementRef<'_>) -> String {
    let joined: String = element.text().collect();
    let collapsed = HSPACE_RE.replace_all(&joined, " ");
    let mut lines: Vec<&str> = collapsed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    if lines.len() == 1 {
        return lines.remove(0).to_string();
    }
    lines.join("\n")
}

/// Text content with all whitespace runs collapsed to single spaces.
fn flat_text(element: ElementRef<'_>) -> String {
    let joined: String = element.text().collect();
    WS_RE.replace_all(&joined, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn resolve_card(html: &str) -> Option<Record> {
        let doc = Html::parse_fragment(html);
        let root = Selector::parse("[class*='card'], article").unwrap();
        let block = doc.select(&root).next().expect("fixture has no card root");
        resolve(block)
    }

    #[test]
    fn full_card_resolves_every_field() {
        let record = resolve_card(
            r#"<div class="tool-card">
                 <a href="https://example.com/mytool">MyTool</a>
                 <span class="category">Writing</span>
                 <p class="description">Drafts long-form copy from bullet points.</p>
               </div>"#,
        )
        .unwrap();

        assert_eq!(record.name, "MyTool");
        assert_eq!(record.url, "https://example.com/mytool");
        assert_eq!(record.category, "Writing");
        assert_eq!(
            record.description,
            "Drafts long-form copy from bullet points."
        );
        assert!(!record.created_at.is_empty());
    }

    #[test]
    fn sponsored_anchor_rejects_card() {
        let record = resolve_card(
            r#"<div class="tool-card"><a href="/promo">Sponsored by Acme</a></div>"#,
        );
        assert!(record.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record = resolve_card(
            r#"<div class="tool-card">
                 <a href="/t/mytool">MyTool</a>
                 <p>Too short</p>
               </div>"#,
        )
        .unwrap();

        assert_eq!(record.name, "MyTool");
        assert_eq!(record.category, UNCATEGORIZED);
        assert_eq!(record.description, "", "9-char snippet is not a description");
    }

    #[test]
    fn name_falls_back_to_heading_when_anchor_is_iconic() {
        let record = resolve_card(
            r#"<article>
                 <a href="/t/scribbler"><img src="icon.png"></a>
                 <h3>Scribbler</h3>
               </article>"#,
        )
        .unwrap();
        assert_eq!(record.name, "Scribbler");
        assert_eq!(record.url, "/t/scribbler");
    }

    #[test]
    fn implausible_anchor_falls_through_to_title_class() {
        let record = resolve_card(
            r#"<div class="card">
                 <a href="/t/x">Featured</a>
                 <div class="tool-name">PixelForge</div>
               </div>"#,
        )
        .unwrap();
        assert_eq!(record.name, "PixelForge");
    }

    #[test]
    fn url_prefers_card_root_href() {
        let record = resolve_card(
            r#"<a class="tool-card" href="/t/rooted">
                 <h2>Rooted</h2>
                 <a href="/elsewhere">x</a>
               </a>"#,
        )
        .unwrap();
        assert_eq!(record.url, "/t/rooted");
    }

    #[test]
    fn description_skips_name_echo_and_badges() {
        let record = resolve_card(
            r#"<div class="tool-card">
                 <a href="/t/echo">EchoWriter GPT</a>
                 <p>EchoWriter GPT</p>
                 <p class="badge-text">Top rated</p>
                 <p>Summarizes meeting notes into action items.</p>
               </div>"#,
        )
        .unwrap();
        assert_eq!(
            record.description,
            "Summarizes meeting notes into action items."
        );
    }

    #[test]
    fn multi_line_anchor_is_not_a_name() {
        // The anchor wraps the whole card; its text spans several visual
        // lines, so the heading candidate must win instead.
        let record = resolve_card(
            r#"<div class="tool-card">
                 <a href="/t/stack">
                   <h3>StackPilot</h3>
                   <p>Reviews infrastructure configs before deploys happen.</p>
                 </a>
               </div>"#,
        )
        .unwrap();
        assert_eq!(record.name, "StackPilot");
    }

    #[test]
    fn card_without_any_href_keeps_empty_url() {
        let record = resolve_card(
            r#"<div class="tool-card"><h2>Clickless</h2></div>"#,
        )
        .unwrap();
        assert_eq!(record.url, "");
        assert_eq!(record.name, "Clickless");
    }
}
