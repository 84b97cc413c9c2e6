//! Implements InputPort. Inquire-based interactive menu over the session controller.

use crate::adapters::ui::progress::{BarProgress, completion_line};
use crate::domain::{Contact, ContactStatus, DomainError, Operator, OperatorFilter, SessionState};
use crate::ports::InputPort;
use crate::usecases::{NoticeLevel, SessionService};
use async_trait::async_trait;
use crossterm::style::{StyledContent, Stylize};
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Select, Text};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const MENU_IMPORT: &str = "Import contacts (CSV / XLSX)";
const MENU_PREVIEW: &str = "Preview contacts";
const MENU_TEMPLATE: &str = "Edit message template";
const MENU_SEND: &str = "Send messages";
const MENU_REFRESH: &str = "Refresh delivery status";
const MENU_DISMISS: &str = "Dismiss messages";
const MENU_CANCEL: &str = "Cancel session";
const MENU_QUIT: &str = "Quit";

/// Applies the prompt theme globally. Called once from `init_ui`.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightYellow))
        .with_highlighted_option_prefix(Styled::new("▸").with_fg(Color::LightYellow))
        .with_answer(StyleSheet::new().with_fg(Color::LightCyan))
        .with_help_message(StyleSheet::new().with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

/// Esc / Ctrl-C on a prompt map to `Ok(None)` (back to menu).
fn prompt<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn status_styled(contact: &Contact) -> StyledContent<String> {
    let text = contact.status.to_string();
    match contact.status {
        ContactStatus::Delivered => text.green(),
        ContactStatus::Pending => text.yellow(),
        ContactStatus::Failed | ContactStatus::Undelivered => text.red(),
        ContactStatus::NotSent => text.grey(),
        ContactStatus::Other(_) => text.magenta(),
    }
}

fn operator_styled(operator: Operator) -> StyledContent<&'static str> {
    let label = operator.label();
    match operator {
        Operator::Orange => label.dark_yellow(),
        Operator::Mtn => label.yellow(),
        Operator::Nexttel => label.blue(),
        Operator::Camtel => label.cyan(),
        Operator::Unknown => label.red(),
    }
}

/// One preview line: raw number (and normalized form when it differs),
/// carrier, status and the remaining columns.
fn contact_row(idx: usize, contact: &Contact) -> String {
    let number = if !contact.is_valid() {
        contact.phone.clone().red().to_string()
    } else if contact.formatted_phone != contact.phone.trim() {
        format!("{} ({})", contact.phone.trim(), contact.formatted_phone)
    } else {
        contact.formatted_phone.clone()
    };
    let fields = contact
        .fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:>4}  {:<28} {:<8} {:<10} {}",
        idx + 1,
        number,
        operator_styled(contact.operator),
        status_styled(contact),
        fields
    )
}

/// Session header shown above the menu.
fn summary_lines(state: &SessionState, polling: bool) -> Vec<String> {
    let mut lines = Vec::new();
    match &state.file_name {
        Some(name) => {
            let valid = state.contacts.iter().filter(|c| c.is_valid()).count();
            lines.push(format!(
                "File: {}  ({} contacts, {} valid numbers)",
                name,
                state.contacts.len(),
                valid
            ));
        }
        None => lines.push("No file imported".to_string()),
    }
    if !state.contacts.is_empty() {
        let count = |s: ContactStatus| state.contacts.iter().filter(|c| c.status == s).count();
        lines.push(format!(
            "Pending: {}  Delivered: {}  Failed: {}  Undelivered: {}",
            count(ContactStatus::Pending),
            count(ContactStatus::Delivered),
            count(ContactStatus::Failed),
            count(ContactStatus::Undelivered)
        ));
    }
    if let Some(ts) = state.last_update_time {
        let local = ts.with_timezone(&chrono::Local);
        lines.push(format!(
            "Last updated: {}{}",
            local.format("%Y-%m-%d %H:%M:%S"),
            if polling { "  (auto-refreshing)" } else { "" }
        ));
    }
    lines
}

fn filter_options() -> Vec<OperatorFilter> {
    std::iter::once(OperatorFilter::All)
        .chain(Operator::CARRIERS.into_iter().map(OperatorFilter::Only))
        .collect()
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    session: Arc<SessionService>,
}

impl TuiInputPort {
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }

    async fn print_header(&self) {
        let state = self.session.state().await;
        println!();
        for line in summary_lines(&state, self.session.is_polling()) {
            println!("{}", line);
        }
        for notice in self.session.notices().await {
            let text = notice.to_string();
            match notice.level {
                NoticeLevel::Error => println!("{}", text.red().bold()),
                NoticeLevel::Warning => println!("{}", text.yellow()),
            }
        }
    }

    async fn import(&self) -> Result<(), DomainError> {
        let Some(path) = prompt(
            Text::new("Path to contact file:")
                .with_help_message("CSV or XLSX with a \"phone\" column")
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let path = PathBuf::from(path.trim());
        // Errors are recorded as notices by the session.
        if let Ok(result) = self.session.import_file(&path).await {
            let invalid = result.contacts.iter().filter(|c| !c.is_valid()).count();
            println!(
                "{}",
                format!(
                    "Imported {} contacts ({} invalid numbers, {} rows skipped)",
                    result.contacts.len(),
                    invalid,
                    result.errors.len()
                )
                .green()
            );
        }
        Ok(())
    }

    async fn preview(&self) {
        let state = self.session.state().await;
        if state.contacts.is_empty() {
            println!("No contacts imported.");
            return;
        }
        println!(
            "{:>4}  {:<28} {:<8} {:<10} {}",
            "#", "Number", "Carrier", "Status", "Fields"
        );
        for (idx, contact) in state.contacts.iter().enumerate() {
            println!("{}", contact_row(idx, contact));
        }
        for error in self.session.import_errors().await {
            println!("{}", error.red());
        }
    }

    async fn edit_template(&self) -> Result<(), DomainError> {
        let state = self.session.state().await;
        let help = if state.available_params.is_empty() {
            "Use [Field] placeholders".to_string()
        } else {
            let params = state
                .available_params
                .iter()
                .map(|p| format!("[{}]", p))
                .collect::<Vec<_>>()
                .join(" ");
            format!("Available: {}", params)
        };
        let Some(text) = prompt(
            Text::new("Message template:")
                .with_initial_value(&state.custom_template)
                .with_help_message(&help)
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let issues = self.session.set_template(&text).await;
        if issues.is_empty() {
            println!("{}", "Template is valid.".green());
        }
        for issue in issues {
            println!("{}", issue.to_string().red());
        }
        Ok(())
    }

    async fn send(&self) -> Result<(), DomainError> {
        let options = filter_options();
        let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
        let Some(choice) = prompt(Select::new("Send to:", labels).raw_prompt())? else {
            return Ok(());
        };
        let filter = options[choice.index];
        let eligible = self.session.eligible_count(filter).await;
        if eligible == 0 {
            println!("No valid numbers for {}.", filter);
            return Ok(());
        }
        let confirmed = prompt(
            Confirm::new(&format!("Send {} message(s) to {}?", eligible, filter))
                .with_default(false)
                .prompt(),
        )?;
        if confirmed != Some(true) {
            return Ok(());
        }

        let progress = BarProgress::new();
        if let Ok(run) = self.session.send(filter, &progress).await {
            println!("{}", completion_line(&run).green());
        }
        Ok(())
    }

    async fn refresh(&self) {
        if let Ok(updated) = self.session.refresh_status().await {
            println!("{} status(es) updated.", updated);
        }
    }

    async fn cancel(&self) -> Result<(), DomainError> {
        let confirmed = prompt(
            Confirm::new("Discard all contacts and statuses?")
                .with_default(false)
                .prompt(),
        )?;
        if confirmed == Some(true) {
            self.session.cancel().await;
            println!("Session cleared.");
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            self.print_header().await;
            let mut items = vec![MENU_IMPORT];
            if !self.session.state().await.contacts.is_empty() {
                items.extend([MENU_PREVIEW, MENU_TEMPLATE, MENU_SEND, MENU_REFRESH]);
            } else {
                items.push(MENU_TEMPLATE);
            }
            if !self.session.notices().await.is_empty() {
                items.push(MENU_DISMISS);
            }
            items.extend([MENU_CANCEL, MENU_QUIT]);

            let Some(choice) = prompt(Select::new("What next?", items).prompt())? else {
                break;
            };
            debug!(choice, "menu");
            match choice {
                MENU_IMPORT => self.import().await?,
                MENU_PREVIEW => self.preview().await,
                MENU_TEMPLATE => self.edit_template().await?,
                MENU_SEND => self.send().await?,
                MENU_REFRESH => self.refresh().await,
                MENU_DISMISS => self.session.dismiss_notices().await,
                MENU_CANCEL => self.cancel().await?,
                _ => break,
            }
        }
        Ok(())
    }
}
