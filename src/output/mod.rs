//! Output module for persisting visited URLs
//!
//! This module handles:
//! - Choosing a result sink for the configured output format
//! - Naming output files deterministically from host and session timestamp
//! - Summarizing a finished crawl

mod delimited;
mod json;
pub mod stats;
mod text;
mod traits;

pub use delimited::CsvSink;
pub use json::{JsonLinesSink, JsonSink, URLS_KEY};
pub use stats::{print_report, CrawlReport};
pub use text::TextSink;
pub use traits::{OutputError, OutputResult, ResultSink};

use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Timestamp layout used in output file names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Give up looking for a free file name after this many suffixes
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One URL per line
    #[default]
    #[serde(alias = "txt")]
    #[value(alias = "txt")]
    Text,

    /// Single `url` column with a header row
    Csv,

    /// One `{"urls": [...]}` document, valid only once the crawl finishes
    Json,

    /// One `{"url": ...}` object per line
    #[serde(rename = "jsonl")]
    #[value(name = "jsonl")]
    JsonLines,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        }
    }

    /// Returns true if the file is well-formed after every append
    pub fn is_append_safe(&self) -> bool {
        !matches!(self, Self::Json)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        };
        write!(f, "{}", name)
    }
}

/// Builds the file stem `{host}_{YYYYMMDD_HHMMSS}`
///
/// Characters that are awkward in file names (such as the colons of an IPv6
/// host) are replaced with `_`.
pub fn output_file_stem(host: &str, started_at: &DateTime<Local>) -> String {
    let safe_host: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe_host = safe_host.trim_matches('_');
    let safe_host = if safe_host.is_empty() {
        "crawl"
    } else {
        safe_host
    };

    format!("{}_{}", safe_host, started_at.format(TIMESTAMP_FORMAT))
}

/// Creates a new output file without overwriting an existing one
///
/// Tries `{stem}.{ext}`, then `{stem}_1.{ext}`, `{stem}_2.{ext}`, and so on.
fn create_unique_file(dir: &Path, stem: &str, extension: &str) -> OutputResult<(PathBuf, File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}_{}.{}", stem, attempt, extension)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free output file name for {} in {}", stem, dir.display()),
    )
    .into())
}

/// Opens the result sink for a crawl session
///
/// Creates `dir` if needed, then creates `{host}_{timestamp}.{ext}` inside
/// it and writes any opening framing the format requires.
///
/// # Arguments
///
/// * `dir` - Output directory
/// * `host` - Host of the seed URL, used to name the file
/// * `format` - Output format
///
/// # Returns
///
/// * `Ok(Box<dyn ResultSink>)` - Sink ready for appends
/// * `Err(OutputError)` - Directory or file could not be created
pub fn open_sink(dir: &Path, host: &str, format: OutputFormat) -> OutputResult<Box<dyn ResultSink>> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = output_file_stem(host, &Local::now());
    let (path, file) = create_unique_file(dir, &stem, format.extension())?;
    tracing::debug!("Writing {} output to {}", format, path.display());

    let sink: Box<dyn ResultSink> = match format {
        OutputFormat::Text => Box::new(TextSink::new(path, file)),
        OutputFormat::Csv => Box::new(CsvSink::new(path, file)?),
        OutputFormat::Json => Box::new(JsonSink::new(path, file)?),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(path, file)),
    };

    Ok(sink)
}
