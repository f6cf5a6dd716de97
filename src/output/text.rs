//! Plain-text sink: one URL per line

use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::output::OutputFormat;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one URL per line; the file is valid after every append
pub struct TextSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl TextSink {
    /// Wraps an already-created output file
    pub fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        }
    }
}

impl ResultSink for TextSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, url: &str) -> OutputResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| OutputError::Closed(self.path.clone()))?;

        writeln!(writer, "{}", url)?;
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
