/// Promotional and UI labels that show up where card names live. Matching is
/// case-insensitive substring, so "Sponsored by Acme" and "NEW" both fail.
const NAME_DENYLIST: &[&str] = &[
    "Sponsored by",
    "Just launched",
    "Featured",
    "New",
    "Today",
    "Most Used",
    "Most Saved",
];

/// Structural validity check for an extracted name, independent of which
/// selector produced it. Multi-line text and hyphen pileups are symptoms of
/// a selector grabbing several fields at once.
pub fn is_valid_name(text: &str) -> bool {
    let lower = text.to_lowercase();
    if NAME_DENYLIST
        .iter()
        .any(|label| lower.contains(&label.to_lowercase()))
    {
        return false;
    }

    text.chars().count() >= 2 && !text.contains('\n') && text.matches('-').count() <= 2
}
