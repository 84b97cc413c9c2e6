//! Spreadsheet contact files (first sheet, first row = headers). Uses `calamine`.

use crate::domain::{DomainError, RawTable};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Read the first worksheet of a workbook. Blocking; call from `spawn_blocking`.
pub fn read_workbook(path: &Path) -> Result<RawTable, DomainError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DomainError::Import(format!("open workbook: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DomainError::Import("workbook has no sheets".to_string()))?
        .map_err(|e| DomainError::Import(format!("read first sheet: {}", e)))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    grid_to_table(grid)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Phone numbers typed as numbers come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// A sheet range is rectangular, so trailing empty cells are padding rather
/// than data. Rows are cut back to their last non-empty cell and padded to the
/// header width; only rows with content beyond the headers stay wider.
pub fn grid_to_table(grid: Vec<Vec<String>>) -> Result<RawTable, DomainError> {
    let mut rows = grid.into_iter();
    let mut headers = rows
        .next()
        .ok_or_else(|| DomainError::Import("No data rows found in the file".to_string()))?;
    let width = last_filled(&headers);
    headers.truncate(width);
    if headers.is_empty() {
        return Err(DomainError::Import(
            "The first row of the sheet must contain headers".to_string(),
        ));
    }

    let rows = rows
        .map(|mut row| {
            let filled = last_filled(&row);
            if filled <= width {
                row.resize(width, String::new());
            } else {
                row.truncate(filled);
            }
            row
        })
        .collect();
    Ok(RawTable { headers, rows })
}

fn last_filled(row: &[String]) -> usize {
    row.iter()
        .rposition(|c| !c.trim().is_empty())
        .map_or(0, |i| i + 1)
}
