//! Import adapters. Implement ContactSourcePort for CSV and spreadsheet files.

pub mod csv_reader;
pub mod xlsx_reader;

use crate::domain::{DomainError, RawTable};
use crate::ports::ContactSourcePort;
use std::path::Path;
use tracing::info;

/// Reads contact files from disk, choosing the parser by extension.
#[derive(Debug, Default)]
pub struct FileContactSource;

impl FileContactSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ContactSourcePort for FileContactSource {
    async fn read_table(&self, path: &Path) -> Result<RawTable, DomainError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let table = match ext.as_str() {
            "csv" => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| DomainError::Import(format!("read {}: {}", path.display(), e)))?;
                csv_reader::parse_csv(&bytes)?
            }
            "xlsx" | "xls" => {
                let owned = path.to_path_buf();
                tokio::task::spawn_blocking(move || xlsx_reader::read_workbook(&owned))
                    .await
                    .map_err(|e| DomainError::Import(format!("workbook task: {}", e)))??
            }
            _ => return Err(DomainError::UnsupportedFile(path.display().to_string())),
        };

        info!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "read contact file"
        );
        Ok(table)
    }
}
