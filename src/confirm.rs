//! Confirmation gate
//!
//! Before the single side-effecting call the operator sees a summary table
//! and must answer yes. Skipping confirmation is an explicit setting.

use crate::errors::RequestError;
use crate::selector::Selector;
use crate::types::Network;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Human-readable description of a transaction about to be submitted
#[derive(Debug, Clone, Default)]
pub struct TransactionSummary {
    rows: Vec<SummaryRow>,
}

impl TransactionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, field: &str, value: impl ToString) -> Self {
        self.rows.push(SummaryRow {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows.iter().map(|r| (r.field.as_str(), r.value.as_str()))
    }

    pub fn render(&self, network: Network) -> String {
        let mut rows = self.rows.clone();
        rows.push(SummaryRow {
            field: "Network".to_string(),
            value: network.label().to_string(),
        });
        Table::new(rows).to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGate {
    skip: bool,
}

impl ConfirmationGate {
    pub fn new(skip: bool) -> Self {
        Self { skip }
    }

    /// `Ok` when submission may proceed, `UserDeclined` otherwise
    pub fn check(
        &self,
        summary: &TransactionSummary,
        network: Network,
        selector: &dyn Selector,
    ) -> Result<(), RequestError> {
        if self.skip {
            info!(network = network.label(), "Confirmation skipped");
            return Ok(());
        }
        selector.present(&summary.render(network));
        if selector.confirm("Are you sure")? {
            Ok(())
        } else {
            Err(RequestError::UserDeclined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedSelector;

    fn summary() -> TransactionSummary {
        TransactionSummary::new()
            .row("Amount", "20.0000000 XLM")
            .row("To", "jennifer")
    }

    #[test]
    fn test_render_includes_network() {
        let table = summary().render(Network::Test);
        assert!(table.contains("Amount"));
        assert!(table.contains("20.0000000 XLM"));
        assert!(table.contains("TESTNET"));
    }

    #[test]
    fn test_declined() {
        let selector = ScriptedSelector::new().with_confirm(false);
        let err = ConfirmationGate::new(false)
            .check(&summary(), Network::Public, &selector)
            .unwrap_err();
        assert!(err.is_user_abort());
        assert_eq!(selector.presented().len(), 1);
    }

    #[test]
    fn test_skip_never_prompts() {
        let selector = ScriptedSelector::new().with_confirm(false);
        ConfirmationGate::new(true)
            .check(&summary(), Network::Public, &selector)
            .unwrap();
        assert_eq!(selector.confirm_calls(), 0);
        assert!(selector.presented().is_empty());
    }
}
