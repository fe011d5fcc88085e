//! CSV results file for sweeps.

use chatbench_core::record::RESULT_HEADER;
use chatbench_core::{ChatbenchError, ResponseRecord, Result, ResultSink};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes sweep rows to a CSV file.
///
/// Creating the sink truncates any earlier results at the same path and
/// writes the header. Every row is flushed to the file before `append`
/// returns, so a failure part-way through a sweep keeps the rows written so
/// far. Fields are quoted as needed, so responses may contain commas, quotes
/// and newlines.
pub struct CsvResultSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvResultSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| output_error(&path, e))?;
        }

        let file = File::create(&path).map_err(|e| output_error(&path, e))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(RESULT_HEADER)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| output_error(&path, e))?;

        tracing::debug!(path = %path.display(), "Opened results file");
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

impl ResultSink for CsvResultSink {
    fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        self.writer
            .write_record([
                record.prompt.as_str(),
                record.context.as_str(),
                record.response.as_str(),
            ])
            .map_err(|e| output_error(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| output_error(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }
}

fn output_error(path: &Path, err: impl std::fmt::Display) -> ChatbenchError {
    ChatbenchError::output(path.display().to_string(), err.to_string())
}
