//! Phone number validation and carrier classification.
//!
//! Carrier digit ranges are allocation tables that change over time, so they
//! are data (`CarrierTable`) rather than code. The built-in table can be
//! replaced from configuration.

use crate::domain::entities::{INVALID_TAG, Operator};
use crate::domain::errors::DomainError;
use regex::Regex;
use serde::Deserialize;

pub const DEFAULT_COUNTRY_CODE: &str = "237";

/// Digit patterns (regex syntax, implicitly anchored) for one operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarrierRule {
    pub operator: Operator,
    pub patterns: Vec<String>,
}

/// Ordered carrier rules. First match wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CarrierTable {
    pub rules: Vec<CarrierRule>,
}

impl Default for CarrierTable {
    fn default() -> Self {
        let rule = |operator, patterns: &[&str]| CarrierRule {
            operator,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        };
        Self {
            rules: vec![
                rule(
                    Operator::Orange,
                    &[r"65[5-9]\d{6}", r"69\d{7}", r"68[5-9]\d{6}"],
                ),
                rule(
                    Operator::Mtn,
                    &[r"65[0-4]\d{6}", r"67\d{7}", r"680\d{6}", r"68[1-4]\d{6}"],
                ),
                rule(Operator::Nexttel, &[r"66\d{7}"]),
                rule(Operator::Camtel, &[r"2\d{8}"]),
            ],
        }
    }
}

/// Result of validating one raw phone value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCheck {
    pub is_valid: bool,
    pub operator: Operator,
    pub formatted_phone: String,
}

/// Compiled carrier table. Pure and total: any input yields a `PhoneCheck`.
#[derive(Debug, Clone)]
pub struct PhoneValidator {
    country_code: String,
    carriers: Vec<(Operator, Regex)>,
}

impl PhoneValidator {
    pub fn new(table: &CarrierTable, country_code: &str) -> Result<Self, DomainError> {
        let mut carriers = Vec::with_capacity(table.rules.len());
        for rule in &table.rules {
            if rule.operator == Operator::Unknown {
                return Err(DomainError::Config(
                    "carrier rule cannot target Unknown".to_string(),
                ));
            }
            if rule.patterns.is_empty() {
                continue;
            }
            let joined = rule.patterns.join("|");
            let re = Regex::new(&format!("^(?:{})$", joined)).map_err(|e| {
                DomainError::Config(format!("invalid pattern for {}: {}", rule.operator, e))
            })?;
            carriers.push((rule.operator, re));
        }
        Ok(Self {
            country_code: country_code.to_string(),
            carriers,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn validate(&self, raw: &str) -> PhoneCheck {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        let intl = format!("00{}", self.country_code);
        let digits = digits
            .strip_prefix(intl.as_str())
            .map(|rest| format!("{}{}", self.country_code, rest))
            .unwrap_or(digits);

        // A bare national number may itself start with the country code
        // (e.g. Camtel 2xx), so the prefix is only stripped when needed.
        let candidates = [
            Some(digits.as_str()),
            digits.strip_prefix(self.country_code.as_str()),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(operator) = self.classify(candidate) {
                return PhoneCheck {
                    is_valid: true,
                    operator,
                    formatted_phone: candidate.to_string(),
                };
            }
        }

        PhoneCheck {
            is_valid: false,
            operator: Operator::Unknown,
            formatted_phone: format!("{} {}", INVALID_TAG, raw.trim()),
        }
    }

    fn classify(&self, national: &str) -> Option<Operator> {
        if national.is_empty() {
            return None;
        }
        self.carriers
            .iter()
            .find(|(_, re)| re.is_match(national))
            .map(|(op, _)| *op)
    }
}

impl Default for PhoneValidator {
    fn default() -> Self {
        // The built-in table is known to compile.
        Self::new(&CarrierTable::default(), DEFAULT_COUNTRY_CODE)
            .unwrap_or_else(|e| unreachable!("default carrier table: {}", e))
    }
}
