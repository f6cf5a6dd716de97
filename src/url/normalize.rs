use crate::UrlError;
use url::Url;

/// Scheme prepended to targets given without one
const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Turns a user-supplied crawl target into the seed URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prepend `https://` unless the target already starts with an explicit
///    `https://` or `http://` prefix (case-insensitive)
/// 3. Parse the result; reject if malformed
/// 4. Require an HTTP(S) scheme and a host
///
/// Nothing else is rewritten: paths, queries and fragments are kept as given.
///
/// # Arguments
///
/// * `target` - The domain or URL given on the command line
///
/// # Returns
///
/// * `Ok(Url)` - The seed URL
/// * `Err(UrlError)` - The target could not be turned into a crawlable URL
///
/// # Examples
///
/// ```
/// use sitewalk::url::normalize_target;
///
/// let url = normalize_target("example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
///
/// let url = normalize_target("https://example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn normalize_target(target: &str) -> Result<Url, UrlError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    let candidate = if has_explicit_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

fn has_explicit_scheme(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}
