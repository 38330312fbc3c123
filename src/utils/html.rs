use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) are preserved while dangerous
/// tags (like <script>, <iframe>) and malicious attributes (like onclick)
/// are stripped. A <script> tag is removed together with its content.
///
/// Used on article bodies (rich text from the editor) and on comment text
/// before either reaches the store.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Cleans `input` and trims it, returning `None` when nothing visible remains.
pub fn clean_text(input: &str) -> Option<String> {
    let cleaned = clean_html(input);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
