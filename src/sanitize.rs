//! Catalog descriptions and review bodies may carry arbitrary HTML. Both are
//! cleaned before they reach the store so no consumer ever renders unsafe
//! markup.

/// Strip unsafe markup, keeping ammonia's conservative default tag set
/// (bold/italic/links survive, scripts and event handlers do not).
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Clean a review body. Returns `None` when nothing meaningful survives
/// (empty, whitespace, or markup-only input).
pub fn clean_review(input: &str) -> Option<String> {
    let cleaned = ammonia::clean(input.trim());
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
