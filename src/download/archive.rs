//! In-memory zip assembly.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{WorkflowError, WorkflowResult};

/// Builds a zip archive in memory, one entry at a time.
///
/// Nothing touches the disk until the finished bytes are handed to a save
/// handle, so abandoning a builder leaves no trace.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
        }
    }

    /// Append an entry. Images are already compressed, so entries are stored.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> WorkflowResult<()> {
        if self.entries.iter().any(|e| e == name) {
            return Err(WorkflowError::ArchiveAssembly(format!(
                "duplicate entry name '{}'",
                name
            )));
        }
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        self.writer.start_file(name, options)?;
        self.writer
            .write_all(bytes)
            .map_err(|e| WorkflowError::ArchiveAssembly(e.to_string()))?;
        self.entries.push(name.to_string());
        Ok(())
    }

    /// Names added so far, in order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Write the central directory and return the archive bytes
    pub fn finish(self) -> WorkflowResult<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
