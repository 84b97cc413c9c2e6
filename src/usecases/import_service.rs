//! Import use case: read a contact file and classify every number.

use crate::domain::{DomainError, ImportResult, PhoneValidator, importer};
use crate::ports::ContactSourcePort;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ImportService {
    source: Arc<dyn ContactSourcePort>,
    validator: PhoneValidator,
}

impl ImportService {
    pub fn new(source: Arc<dyn ContactSourcePort>, validator: PhoneValidator) -> Self {
        Self { source, validator }
    }

    /// Import a file. Fails as a whole on unreadable files or a missing phone
    /// column; malformed rows are reported in `ImportResult::errors`.
    pub async fn import_file(&self, path: &Path) -> Result<ImportResult, DomainError> {
        let table = self.source.read_table(path).await?;
        let result = importer::build_contacts(table, &self.validator)?;

        let invalid = result.contacts.iter().filter(|c| !c.is_valid()).count();
        for error in &result.errors {
            warn!(path = %path.display(), "{}", error);
        }
        info!(
            path = %path.display(),
            contacts = result.contacts.len(),
            invalid_numbers = invalid,
            row_errors = result.errors.len(),
            "import complete"
        );
        Ok(result)
    }
}
