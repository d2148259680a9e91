//! File appender implementation

use super::format_line;
use crate::core::{Appender, LogEntry, LoggerError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct FileAppender {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    locked: bool,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            locked: false,
        })
    }

    /// Open the file and hold an exclusive advisory lock on it until the
    /// appender is closed, so a second process cannot interleave writes
    pub fn exclusive(path: impl Into<PathBuf>) -> Result<Self> {
        let mut appender = Self::new(path)?;
        if let Some(ref writer) = appender.writer {
            writer
                .get_ref()
                .try_lock_exclusive()
                .map_err(|_| LoggerError::file_lock(appender.path.display().to_string()))?;
        }
        appender.locked = true;
        Ok(appender)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Appender for FileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::closed(self.path.display().to_string()))?;

        let mut output = format_line(entry, entry.level.as_str());
        output.push('\n');

        writer.write_all(output.as_bytes()).map_err(|e| {
            LoggerError::io_operation("writing log file", self.path.display().to_string(), e)
        })?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.flush()?;
        if self.locked {
            writer.get_ref().unlock()?;
            self.locked = false;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.close();
    }
}
