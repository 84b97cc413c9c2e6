//! Message templates with `[Field]` placeholders.
//!
//! Rendering never fails: unknown placeholders are left as-is. Validation is a
//! separate pass that gates sending, not editing.

use crate::domain::entities::Contact;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").unwrap_or_else(|e| unreachable!("{e}")));

static DOUBLE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]]*\]\]").unwrap_or_else(|e| unreachable!("{e}")));

/// Leftover `[[` or `]]` once well-formed `[[...]]` tokens are removed, e.g. `[[Name]`.
static NESTED_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[[^\[\]]*\]?|\[?[^\[\]]*\]\]").unwrap_or_else(|e| unreachable!("{e}"))
});

/// Problem found while validating a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateIssue {
    /// `[[...]]` or an empty `[]`.
    IncorrectSyntax(String),
    /// Placeholder name not among the available headers.
    InvalidParameter(String),
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateIssue::IncorrectSyntax(token) => {
                write!(f, "Incorrect parameter syntax: {}. Use [Field].", token)
            }
            TemplateIssue::InvalidParameter(name) => {
                write!(f, "Invalid parameter: [{}] is not a column of the file", name)
            }
        }
    }
}

/// Replace every `[Field]` with the contact's value for `Field`.
pub fn render(template: &str, contact: &Contact) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match contact.field(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Template text with every double or nested bracket token removed.
fn strip_malformed(template: &str) -> String {
    let without_double = DOUBLE_BRACKET.replace_all(template, "");
    NESTED_BRACKET.replace_all(&without_double, "").into_owned()
}

/// Placeholder names in order of appearance, ignoring malformed tokens.
pub fn placeholders(template: &str) -> Vec<String> {
    let cleaned = strip_malformed(template);
    PLACEHOLDER
        .captures_iter(&cleaned)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check a template against the available headers. Empty result means valid.
pub fn validate(template: &str, headers: &[String]) -> Vec<TemplateIssue> {
    let mut issues: Vec<TemplateIssue> = DOUBLE_BRACKET
        .find_iter(template)
        .map(|m| TemplateIssue::IncorrectSyntax(m.as_str().to_string()))
        .collect();

    let without_double = DOUBLE_BRACKET.replace_all(template, "");
    issues.extend(
        NESTED_BRACKET
            .find_iter(&without_double)
            .map(|m| TemplateIssue::IncorrectSyntax(m.as_str().to_string())),
    );

    let cleaned = strip_malformed(template);
    if cleaned.contains("[]") {
        issues.push(TemplateIssue::IncorrectSyntax("[]".to_string()));
    }

    for name in placeholders(template) {
        let known = headers.iter().any(|h| *h == name)
            || (name.eq_ignore_ascii_case("phone")
                && headers.iter().any(|h| h.eq_ignore_ascii_case("phone")));
        let issue = TemplateIssue::InvalidParameter(name);
        if !known && !issues.contains(&issue) {
            issues.push(issue);
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ContactStatus, Operator};
    use std::collections::BTreeMap;

    fn ama() -> Contact {
        Contact {
            phone: "699112233".into(),
            formatted_phone: "699112233".into(),
            operator: Operator::Orange,
            status: ContactStatus::NotSent,
            message_id: None,
            fields: BTreeMap::from([
                ("Name".to_string(), "Ama".to_string()),
                ("City".to_string(), "Douala".to_string()),
            ]),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_known_field() {
        assert_eq!(render("Hi [Name]", &ama()), "Hi Ama");
    }

    #[test]
    fn renders_every_occurrence() {
        assert_eq!(
            render("[Name] from [City], hello [Name]!", &ama()),
            "Ama from Douala, hello Ama!"
        );
    }

    #[test]
    fn unknown_placeholder_passes_through() {
        assert_eq!(render("Hi [Foo]", &ama()), "Hi [Foo]");
        assert_eq!(render("Hi [name]", &ama()), "Hi [name]");
    }

    #[test]
    fn phone_placeholder_renders_raw_phone() {
        assert_eq!(render("Your number: [phone]", &ama()), "Your number: 699112233");
    }

    #[test]
    fn double_brackets_always_fail() {
        let issues = validate("Hi [[X]]", &headers(&["X", "phone"]));
        assert_eq!(issues, vec![TemplateIssue::IncorrectSyntax("[[X]]".into())]);
        assert!(issues[0].to_string().contains("Incorrect parameter syntax"));
    }

    #[test]
    fn unknown_header_is_invalid_parameter() {
        let issues = validate("Hi [Name] [Foo] [Foo]", &headers(&["Name", "phone"]));
        assert_eq!(issues, vec![TemplateIssue::InvalidParameter("Foo".into())]);
        assert!(issues[0].to_string().contains("Invalid parameter"));
    }

    #[test]
    fn valid_template_has_no_issues() {
        assert!(validate("Hi [Name], call [Phone]", &headers(&["Name", "Phone"])).is_empty());
        assert!(validate("No placeholders at all", &[]).is_empty());
    }

    #[test]
    fn empty_brackets_are_syntax_errors() {
        assert_eq!(
            validate("Hi []", &headers(&["phone"])),
            vec![TemplateIssue::IncorrectSyntax("[]".into())]
        );
    }

    #[test]
    fn placeholders_skip_malformed_tokens() {
        assert_eq!(placeholders("[A] [[B]] [C]"), vec!["A", "C"]);
    }

    #[test]
    fn nested_brackets_fail_even_when_names_exist() {
        let issues = validate("Hi [[Name] and [Other]]", &headers(&["Name", "Other"]));
        assert_eq!(
            issues,
            vec![
                TemplateIssue::IncorrectSyntax("[[Name]".into()),
                TemplateIssue::IncorrectSyntax("[Other]]".into()),
            ]
        );
    }

    #[test]
    fn unbalanced_opening_brackets_fail() {
        let issues = validate("Hi [[Name]", &headers(&["Name"]));
        assert_eq!(issues, vec![TemplateIssue::IncorrectSyntax("[[Name]".into())]);
        assert!(placeholders("Hi [[Name]").is_empty());
    }
}
