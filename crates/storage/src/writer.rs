use crate::error::StorageError;
use analytics::{AnalysisOutcome, FIELD_DELIMITER, header, render_record};
use core_types::Locale;
use csv::{Terminator, Writer, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends rendered outcomes to a `;`-delimited file.
///
/// The header row goes only into a file that is new or empty, so repeated
/// runs against the same file accumulate rows under a single header.
pub struct OutcomeWriter {
    writer: Writer<File>,
    path: PathBuf,
    locale: Locale,
    written: usize,
}

impl OutcomeWriter {
    pub fn open(path: &Path, locale: Locale) -> Result<Self, StorageError> {
        let io_err = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        let needs_header = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = WriterBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);
        if needs_header {
            writer.write_record(header(locale))?;
            debug!(path = %path.display(), "Wrote header to new output file.");
        }

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            locale,
            written: 0,
        })
    }

    pub fn write(&mut self, outcome: &AnalysisOutcome) -> Result<(), StorageError> {
        self.writer.write_record(render_record(outcome, self.locale))?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered rows and returns how many were written by this writer.
    pub fn finish(mut self) -> Result<usize, StorageError> {
        self.writer.flush().map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.written)
    }
}
