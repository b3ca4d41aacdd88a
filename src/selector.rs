//! Selection provider
//!
//! Every operator interaction (choosing a wallet, a contact, an asset issuer,
//! confirming a transaction) goes through [`Selector`]. The terminal
//! implementation prompts with `dialoguer`; [`PolicySelector`] answers
//! deterministically for automation.

use crate::errors::RequestError;
use crate::keys::PublicKey;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tracing::{debug, info};

/// Result of a selection that also accepts free input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Index into the offered items
    Index(usize),
    /// Value typed by the operator instead of picking an item
    Input(String),
}

pub trait Selector: Send + Sync {
    /// Pick one of `items`
    fn select(&self, label: &str, items: &[String]) -> Result<usize, RequestError>;

    /// Pick one of `items` or type a ledger address instead
    fn select_or_address(&self, label: &str, items: &[String]) -> Result<Choice, RequestError>;

    /// Ask for an explicit yes/no
    fn confirm(&self, label: &str) -> Result<bool, RequestError>;

    /// Show a rendered summary to the operator
    fn present(&self, summary: &str);
}

fn prompt_error(label: &str, err: dialoguer::Error) -> RequestError {
    RequestError::Selection(format!("{}: {}", label, err))
}

/// Interactive terminal prompts
#[derive(Debug, Default)]
pub struct TerminalSelector;

impl Selector for TerminalSelector {
    fn select(&self, label: &str, items: &[String]) -> Result<usize, RequestError> {
        if items.is_empty() {
            return Err(RequestError::Selection(format!("{}: nothing to choose from", label)));
        }
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| prompt_error(label, e))?
            .ok_or(RequestError::UserDeclined)
    }

    fn select_or_address(&self, label: &str, items: &[String]) -> Result<Choice, RequestError> {
        const ANOTHER: &str = "Another address";
        let mut entries = items.to_vec();
        entries.push(ANOTHER.to_string());

        let idx = self.select(label, &entries)?;
        if idx < items.len() {
            return Ok(Choice::Index(idx));
        }
        let address: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(ANOTHER)
            .validate_with(|input: &String| -> Result<(), String> {
                PublicKey::from_address(input.trim())
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()
            .map_err(|e| prompt_error(label, e))?;
        Ok(Choice::Input(address.trim().to_string()))
    }

    fn confirm(&self, label: &str) -> Result<bool, RequestError> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .default(false)
            .interact_opt()
            .map_err(|e| prompt_error(label, e))
            .map(|answer| answer.unwrap_or(false))
    }

    fn present(&self, summary: &str) {
        println!("{}", summary);
    }
}

/// Deterministic answers for automation and tests: a sole candidate is
/// chosen, anything ambiguous is an error, and confirmation returns the
/// configured answer.
#[derive(Debug, Clone)]
pub struct PolicySelector {
    confirm: bool,
}

impl PolicySelector {
    pub fn new(confirm: bool) -> Self {
        Self { confirm }
    }
}

impl Selector for PolicySelector {
    fn select(&self, label: &str, items: &[String]) -> Result<usize, RequestError> {
        match items.len() {
            1 => {
                debug!(label = %label, choice = %items[0], "Sole candidate selected");
                Ok(0)
            }
            0 => Err(RequestError::Selection(format!("{}: nothing to choose from", label))),
            n => Err(RequestError::Selection(format!(
                "{}: {} candidates and no interactive prompt",
                label, n
            ))),
        }
    }

    fn select_or_address(&self, label: &str, items: &[String]) -> Result<Choice, RequestError> {
        self.select(label, items).map(Choice::Index)
    }

    fn confirm(&self, label: &str) -> Result<bool, RequestError> {
        debug!(label = %label, answer = self.confirm, "Policy confirmation");
        Ok(self.confirm)
    }

    fn present(&self, summary: &str) {
        info!("Transaction summary\n{}", summary);
    }
}
