//! Turns a header row plus data rows into contacts.
//!
//! Row numbers in errors follow spreadsheet numbering: the header is row 1.

use crate::domain::entities::{Contact, ContactStatus, ImportResult, RawTable};
use crate::domain::errors::DomainError;
use crate::domain::phone::PhoneValidator;
use std::collections::BTreeMap;

const PHONE_HEADER: &str = "phone";

pub fn build_contacts(
    table: RawTable,
    validator: &PhoneValidator,
) -> Result<ImportResult, DomainError> {
    let headers: Vec<String> = table.headers.iter().map(|h| h.trim().to_string()).collect();
    let phone_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(PHONE_HEADER))
        .ok_or(DomainError::MissingPhoneColumn)?;

    let mut contacts = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in table.rows.into_iter().enumerate() {
        let row_number = idx + 2;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if row.len() != headers.len() {
            errors.push(format!(
                "Row {} has an incorrect number of columns",
                row_number
            ));
            continue;
        }

        let phone = row[phone_idx].trim().to_string();
        let mut fields = BTreeMap::new();
        for (col, cell) in row.into_iter().enumerate() {
            if col == phone_idx {
                continue;
            }
            fields.insert(headers[col].clone(), cell.trim().to_string());
        }

        let check = validator.validate(&phone);
        contacts.push(Contact {
            phone,
            formatted_phone: check.formatted_phone,
            operator: check.operator,
            status: ContactStatus::NotSent,
            message_id: None,
            fields,
        });
    }

    if contacts.is_empty() && errors.is_empty() {
        return Err(DomainError::Import(
            "The file is empty or contains no valid data".to_string(),
        ));
    }

    Ok(ImportResult {
        contacts,
        headers,
        errors,
    })
}
