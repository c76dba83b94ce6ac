//! Title derivation from markdown bodies.

/// Title used when a body has no usable heading.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Return the text of the first non-empty markdown heading in `markdown`.
///
/// Falls back to [`UNTITLED_DOCUMENT`] for blank bodies and bodies without
/// a heading.
pub fn extract_title(markdown: &str) -> String {
    markdown
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .find(|title| !title.is_empty())
        .unwrap_or(UNTITLED_DOCUMENT)
        .to_string()
}
