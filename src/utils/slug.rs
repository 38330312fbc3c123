// src/utils/slug.rs

use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\p{M}]+").expect("slug pattern is valid"));

/// Derives a URL slug: lowercase, runs of anything but letters, digits and
/// combining marks become a single `-`. Non-Latin titles keep their script.
///
/// Returns `None` when nothing usable is left (e.g. a title made of punctuation only).
pub fn slugify(input: &str) -> Option<String> {
    let lowered = input.to_lowercase();
    let slug = NON_ALPHANUMERIC.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}
