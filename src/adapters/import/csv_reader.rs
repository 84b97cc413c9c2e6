//! Comma-separated contact files. Uses the `csv` crate for quoting rules.

use crate::domain::{DomainError, RawTable};

/// Parse CSV bytes into a header row plus data rows.
///
/// Rows keep their own width; column-count checks happen in the importer.
/// Empty lines after the header become empty rows so that row `i` is file
/// line `header_line + 1 + i`.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, DomainError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut headers: Option<Vec<String>> = None;
    let mut header_line = 0u64;
    let mut rows = Vec::new();

    for record in rdr.records() {
        let record = record.map_err(|e| DomainError::Import(format!("CSV: {}", e)))?;
        let line = record.position().map_or(0, |p| p.line());
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if headers.is_some() {
            // The reader skips empty lines; pad with blank rows so row
            // numbers stay aligned with the file.
            let expected = header_line + 1 + rows.len() as u64;
            for _ in expected..line {
                rows.push(Vec::new());
            }
            rows.push(cells);
        } else if cells.iter().any(|c| !c.is_empty()) {
            headers = Some(cells);
            header_line = line;
        }
    }

    let headers = headers.ok_or_else(|| {
        DomainError::Import("The CSV file is empty or contains no valid data".to_string())
    })?;
    Ok(RawTable { headers, rows })
}
