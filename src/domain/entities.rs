//! Domain entities. Pure data structures for the core business.
//!
//! No gateway or IO types here. Adapters map their payloads into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix carried by `formatted_phone` when the number failed validation.
pub const INVALID_TAG: &str = "Invalid:";

/// Mobile network operator inferred from a number's digit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Orange,
    #[serde(rename = "MTN")]
    Mtn,
    Nexttel,
    Camtel,
    Unknown,
}

impl Operator {
    /// Operators a send can be filtered on (Unknown numbers are never valid).
    pub const CARRIERS: [Operator; 4] = [
        Operator::Orange,
        Operator::Mtn,
        Operator::Nexttel,
        Operator::Camtel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Operator::Orange => "Orange",
            Operator::Mtn => "MTN",
            Operator::Nexttel => "Nexttel",
            Operator::Camtel => "Camtel",
            Operator::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Carrier filter for a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFilter {
    All,
    Only(Operator),
}

impl OperatorFilter {
    pub fn matches(self, operator: Operator) -> bool {
        match self {
            OperatorFilter::All => true,
            OperatorFilter::Only(op) => op == operator,
        }
    }
}

impl fmt::Display for OperatorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorFilter::All => f.write_str("All Operators"),
            OperatorFilter::Only(op) => write!(f, "{}", op),
        }
    }
}

/// Delivery state of a contact.
///
/// The fixed variants are the states this application sets itself; delivery
/// receipts may carry any gateway-defined label, kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContactStatus {
    NotSent,
    Pending,
    Delivered,
    Undelivered,
    Failed,
    Other(String),
}

impl ContactStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContactStatus::NotSent => "Not sent",
            ContactStatus::Pending => "PENDING",
            ContactStatus::Delivered => "DELIVRD",
            ContactStatus::Undelivered => "UNDELIV",
            ContactStatus::Failed => "FAILED",
            ContactStatus::Other(s) => s,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ContactStatus::Pending)
    }
}

impl From<String> for ContactStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Not sent" => ContactStatus::NotSent,
            "PENDING" => ContactStatus::Pending,
            "DELIVRD" => ContactStatus::Delivered,
            "UNDELIV" => ContactStatus::Undelivered,
            "FAILED" => ContactStatus::Failed,
            _ => ContactStatus::Other(s),
        }
    }
}

impl From<&str> for ContactStatus {
    fn from(s: &str) -> Self {
        ContactStatus::from(s.to_string())
    }
}

impl From<ContactStatus> for String {
    fn from(status: ContactStatus) -> Self {
        match status {
            ContactStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One imported recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Trimmed value of the phone column, as imported.
    pub phone: String,
    /// National number without country prefix, or `Invalid: <raw>`.
    pub formatted_phone: String,
    pub operator: Operator,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Non-phone columns keyed by trimmed header text.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Contact {
    pub fn is_valid(&self) -> bool {
        !self.formatted_phone.starts_with(INVALID_TAG)
    }

    /// Value for a placeholder name. Case-sensitive on imported columns; the
    /// phone column is reachable as `phone` in any case.
    pub fn field(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.fields.get(name) {
            return Some(v.as_str());
        }
        if name.eq_ignore_ascii_case("phone") {
            return Some(self.phone.as_str());
        }
        None
    }
}

/// Output of a contact import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub contacts: Vec<Contact>,
    pub headers: Vec<String>,
    pub errors: Vec<String>,
}

/// Header row plus data rows, the common shape of every import format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Progress counters of one dispatch batch. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchRun {
    pub total_count: usize,
    pub sent_count: usize,
    pub success_count: usize,
}

impl DispatchRun {
    pub fn percent(&self) -> u8 {
        if self.total_count == 0 {
            return 100;
        }
        ((self.sent_count as f64 / self.total_count as f64) * 100.0).round() as u8
    }
}

/// Persisted session: everything needed to resume after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_template: String,
    #[serde(default)]
    pub available_params: Vec<String>,
}

impl SessionState {
    pub fn has_pending(&self) -> bool {
        self.contacts.iter().any(|c| c.status.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(formatted: &str) -> Contact {
        Contact {
            phone: "699112233".into(),
            formatted_phone: formatted.into(),
            operator: Operator::Orange,
            status: ContactStatus::NotSent,
            message_id: None,
            fields: BTreeMap::from([("Name".to_string(), "Ama".to_string())]),
        }
    }

    #[test]
    fn status_keeps_gateway_labels() {
        assert_eq!(ContactStatus::from("DELIVRD"), ContactStatus::Delivered);
        assert_eq!(
            ContactStatus::from("EXPIRED"),
            ContactStatus::Other("EXPIRED".into())
        );
        assert_eq!(String::from(ContactStatus::Other("X".into())), "X");
    }

    #[test]
    fn contact_serializes_camel_case() {
        let json = serde_json::to_value(contact("699112233")).unwrap();
        assert_eq!(json["formattedPhone"], "699112233");
        assert_eq!(json["operator"], "Orange");
        assert_eq!(json["status"], "Not sent");
        assert!(json.get("messageId").is_none());
    }

    #[test]
    fn mtn_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Operator::Mtn).unwrap(), "\"MTN\"");
    }

    #[test]
    fn field_lookup_is_case_sensitive_except_phone() {
        let c = contact("699112233");
        assert_eq!(c.field("Name"), Some("Ama"));
        assert_eq!(c.field("name"), None);
        assert_eq!(c.field("PHONE"), Some("699112233"));
    }

    #[test]
    fn invalid_tag_marks_contact_invalid() {
        assert!(contact("699112233").is_valid());
        assert!(!contact("Invalid: 123").is_valid());
    }

    #[test]
    fn run_percent() {
        let run = DispatchRun {
            total_count: 3,
            sent_count: 2,
            success_count: 2,
        };
        assert_eq!(run.percent(), 67);
        assert_eq!(DispatchRun::default().percent(), 100);
    }

    #[test]
    fn filter_matches() {
        assert!(OperatorFilter::All.matches(Operator::Camtel));
        assert!(OperatorFilter::Only(Operator::Mtn).matches(Operator::Mtn));
        assert!(!OperatorFilter::Only(Operator::Mtn).matches(Operator::Orange));
    }
}
