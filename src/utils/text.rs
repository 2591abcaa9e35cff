//! Text cleanup for scraped fields.

/// Collapse every run of whitespace (spaces, tabs, newlines) into a single
/// space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
