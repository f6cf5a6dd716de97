//! JSON sinks
//!
//! Two framings are supported:
//!
//! - `JsonSink` writes one document, `{"urls": [...]}`, for the whole session.
//!   The closing fragment is only written by `close`, so a session that dies
//!   early leaves a truncated, unparsable file.
//! - `JsonLinesSink` writes one `{"url": "..."}` object per line and is valid
//!   after every append.

use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::output::OutputFormat;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Key under which the JSON document lists visited URLs
pub const URLS_KEY: &str = "urls";

#[derive(Serialize)]
struct UrlRecord<'a> {
    url: &'a str,
}

/// Single-document JSON writer
pub struct JsonSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl JsonSink {
    /// Wraps an already-created output file and writes the opening fragment
    pub fn new(path: PathBuf, file: File) -> OutputResult<Self> {
        let mut writer = BufWriter::new(file);
        write!(writer, "{{\n  \"{}\": [", URLS_KEY)?;
        writer.flush()?;

        Ok(Self {
            path,
            writer: Some(writer),
            written: 0,
        })
    }
}

impl ResultSink for JsonSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, url: &str) -> OutputResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| OutputError::Closed(self.path.clone()))?;

        let separator = if self.written == 0 { "\n    " } else { ",\n    " };
        writer.write_all(separator.as_bytes())?;
        serde_json::to_writer(&mut *writer, url)?;
        writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            let closing = if self.written == 0 { "]\n}\n" } else { "\n  ]\n}\n" };
            writer.write_all(closing.as_bytes())?;
            writer.flush()?;
        }
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl JsonLinesSink {
    /// Wraps an already-created output file
    pub fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        }
    }
}

impl ResultSink for JsonLinesSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::JsonLines
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, url: &str) -> OutputResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| OutputError::Closed(self.path.clone()))?;

        serde_json::to_writer(&mut *writer, &UrlRecord { url })?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
