use crate::error::HarvestError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Line-delimited JSON output. Every record is flushed as soon as it is
/// written so that a late failure never loses earlier results.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        ::log::debug!("Opened output file {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Appends one record as a JSON line
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), HarvestError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }
}
