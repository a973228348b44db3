use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, SquirrelError};
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only CSV log on the local filesystem.
///
/// Assumes at most one writer per path at a time. The header and the row are
/// encoded in memory and land in the file with a single write.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(headers: &[&str], row: &[String], with_header: bool) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if with_header {
            writer.write_record(headers)?;
        }
        writer.write_record(row)?;
        writer
            .into_inner()
            .map_err(|e| SquirrelError::IoError(e.into_error()))
    }
}

#[async_trait]
impl RecordStore for CsvFileStore {
    async fn append(&self, headers: &[&str], row: &[String]) -> Result<String> {
        if row.len() != headers.len() {
            return Err(SquirrelError::RecordShapeError {
                expected: headers.len(),
                actual: row.len(),
            });
        }

        let file_exists = self.path.is_file();
        let data = Self::encode(headers, row, !file_exists)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&data)?;
        file.flush()?;

        tracing::debug!(
            "Appended {} bytes to {} (header written: {})",
            data.len(),
            self.path.display(),
            !file_exists
        );

        Ok(self.path.display().to_string())
    }
}
