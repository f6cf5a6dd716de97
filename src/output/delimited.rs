//! CSV sink: a `url` header row, then one record per visited URL

use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::output::OutputFormat;
use std::fs::File;
use std::path::{Path, PathBuf};

const HEADER: &str = "url";

/// Single-column CSV writer, flushed after every record
pub struct CsvSink {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    written: u64,
}

impl CsvSink {
    /// Wraps an already-created output file and writes the header row
    pub fn new(path: PathBuf, file: File) -> OutputResult<Self> {
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record([HEADER])?;
        writer.flush()?;

        Ok(Self {
            path,
            writer: Some(writer),
            written: 0,
        })
    }
}

impl ResultSink for CsvSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, url: &str) -> OutputResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| OutputError::Closed(self.path.clone()))?;

        writer.write_record([url])?;
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
