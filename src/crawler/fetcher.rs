//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with timeouts and redirect policy
//! - The fixed pre-request politeness delay
//! - Optional User-Agent tagging
//! - Mapping responses to an outcome (content, not HTML, denied, error)

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Upper bound on the time spent establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed before a fetch is reported as failed
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Content {
        /// Page body
        body: String,
        /// Final URL after redirects; relative links resolve against it
        final_url: Url,
    },

    /// 2xx response whose Content-Type is not HTML; the body is not read
    NotHtml {
        /// The Content-Type the server sent
        content_type: String,
    },

    /// Server answered HTTP 403
    Denied,

    /// Any other non-2xx status or a network/timeout failure
    TransportError {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Human-readable description
        detail: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// The client carries no default User-Agent; page requests add one when
/// configured and robots.txt requests never do.
///
/// # Arguments
///
/// * `request_timeout` - Deadline for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use sitewalk::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs delayed, optionally user-agent-tagged page requests
///
/// No retries are made: one call, one request.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agent: Option<String>,
    delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `user_agent` - Value for the User-Agent header; omitted when None
    /// * `delay` - Pause before every request
    pub fn new(client: Client, user_agent: Option<String>, delay: Duration) -> Self {
        Self {
            client,
            user_agent,
            delay,
        }
    }

    /// Fetches a URL
    ///
    /// # Outcome Mapping
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx, HTML or no Content-Type, readable body | Content |
/// | 2xx with any other Content-Type | NotHtml (body never downloaded) |
    /// | HTTP 403 | Denied |
    /// | Any other status | TransportError (with status) |
    /// | Timeout / connect / body read failure | TransportError |
    ///
    /// Failures are logged here and never returned as errors.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut request = self.client.get(url.clone());
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = classify_request_error(&e);
                tracing::warn!(
                    "An error occurred while requesting URL: {}. Error: {}",
                    url,
                    detail
                );
                return FetchOutcome::TransportError {
                    status: None,
                    detail,
                };
            }
        };

        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            tracing::warn!(
                "Access denied for URL: {}. The website does not allow crawlers.",
                url
            );
            return FetchOutcome::Denied;
        }

        if !status.is_success() {
            tracing::warn!(
                "HTTP error occurred for URL: {}. Status code: {}",
                url,
                status.as_u16()
            );
            return FetchOutcome::TransportError {
                status: Some(status.as_u16()),
                detail: format!("HTTP {}", status),
            };
        }

        let final_url = response.url().clone();

        // A missing Content-Type is given the benefit of the doubt
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html_content_type(content_type) {
                tracing::debug!("Not parsing {}: Content-Type is {}", url, content_type);
                return FetchOutcome::NotHtml {
                    content_type: content_type.to_string(),
                };
            }
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Content { body, final_url },
            Err(e) => {
                let detail = classify_request_error(&e);
                tracing::warn!("Failed to read body of {}: {}", url, detail);
                FetchOutcome::TransportError {
                    status: Some(status.as_u16()),
                    detail,
                }
            }
        }
    }
}

/// Returns true for the media types links are extracted from
fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "text/html" || media_type == "application/xhtml+xml"
}

fn classify_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Too many redirects: {}", e)
    } else {
        e.to_string()
    }
}
