use crate::output::OutputFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Sitewalk
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration. Command-line flags override file values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pages at this depth or deeper are never fetched (seed is depth 0)
    pub max_depth: u32,

    /// Fixed pause before every page request (seconds)
    pub delay: f64,

    /// Per-request deadline (seconds)
    pub request_timeout: u64,

    /// User-Agent header for page requests; omitted when unset
    pub user_agent: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            delay: 0.0,
            request_timeout: 30,
            user_agent: None,
        }
    }
}

impl CrawlerConfig {
    /// The per-request delay as a Duration
    ///
    /// Negative or non-finite values are rejected by validation; here they
    /// collapse to zero.
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// The per-request deadline as a Duration
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Serialization format of the output file
    pub format: OutputFormat,

    /// Directory the output file is created in
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            directory: PathBuf::from("output"),
        }
    }
}
