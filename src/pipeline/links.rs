use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("anchor href pattern is valid")
});

/// Distinct `href` values of `<a>` elements in document order. Empty,
/// fragment-only and `javascript:` links are skipped.
pub fn detect_links(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.to_ascii_lowercase().starts_with("javascript:")
        })
        .filter(|href| seen.insert(href.clone()))
        .collect()
}

/// Relative links that do not point back at the home page.
pub fn local_page_links(links: &[String]) -> Vec<&str> {
    links
        .iter()
        .map(String::as_str)
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !(lower.starts_with("http://")
                || lower.starts_with("https://")
                || lower.starts_with("//")
                || lower.starts_with("mailto:")
                || lower.starts_with("tel:")
                || lower.starts_with("data:"))
        })
        .filter(|href| !matches!(*href, "/" | "./" | "index.html" | "./index.html" | "/index.html"))
        .collect()
}
