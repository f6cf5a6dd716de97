//! HTML link extraction
//!
//! A pure function from markup and base URL to the absolute HTTP(S) links the
//! page points at. Relative hrefs are resolved with `Url::join`, so `../`,
//! query-only and protocol-relative links land where a browser would send
//! them.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the outbound links of a page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that is not HTTP(S) after resolution
///
/// Fragments are dropped and duplicates removed; the remaining links keep
/// document order, but callers must not rely on that order.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was served from
///
/// # Example
///
/// ```
/// use sitewalk::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/docs">Docs</a><a href="https://other.org/">Other</a>"#;
/// let base = Url::parse("https://example.com/index.html").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].as_str(), "https://example.com/docs");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                if seen.insert(absolute_url.as_str().to_string()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    // `/about#team` and `/about` are the same page
    absolute_url.set_fragment(None);
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
