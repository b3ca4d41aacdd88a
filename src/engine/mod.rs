//! Statement execution engine
//!
//! The engine turns one resolved [`Statement`] into one submitted
//! transaction:
//!
//! ```text
//! statement → identities/assets → trustlines/pricing → operations
//!           → sequence → draft → signature → confirmation → submission
//! ```
//!
//! Everything up to confirmation is local or read-only against the ledger.
//! Submission is the single side-effecting call and happens at most once per
//! statement. Configuration is explicit ([`EngineConfig`]) and every
//! operator interaction goes through the injected [`Selector`].

mod assemble;
mod dispatch;

pub use assemble::{share_threshold, Assembled};

use crate::assets::AssetCatalog;
use crate::errors::RequestError;
use crate::ledger::LedgerClient;
use crate::selector::Selector;
use crate::structured_logging::RequestContext;
use crate::types::{Network, Statement, SubmissionResult};
use crate::wallet::WalletStore;
use std::sync::Arc;

/// Base fee per operation, in stroops
pub const DEFAULT_BASE_FEE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub network: Network,
    /// Submit without rendering a summary or asking for confirmation
    pub skip_confirmation: bool,
    pub base_fee: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: Network::Public,
            skip_confirmation: false,
            base_fee: DEFAULT_BASE_FEE,
        }
    }
}

pub struct Engine<'a> {
    ledger: Arc<dyn LedgerClient>,
    wallets: &'a WalletStore,
    catalog: &'a AssetCatalog,
    selector: &'a dyn Selector,
    config: EngineConfig,
}

impl<'a> Engine<'a> {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        wallets: &'a WalletStore,
        catalog: &'a AssetCatalog,
        selector: &'a dyn Selector,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger,
            wallets,
            catalog,
            selector,
            config,
        }
    }

    /// Resolve, assemble, confirm and submit `statement`
    pub async fn execute(&self, statement: &Statement) -> Result<SubmissionResult, RequestError> {
        let ctx = RequestContext::new(statement.kind());
        ctx.logger
            .log_statement_received(statement.kind(), self.config.network.label());

        let result = match self.assemble(statement, &ctx).await {
            Ok(assembled) => self.dispatch(assembled, &ctx).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if e.is_user_abort() {
                ctx.logger.log_declined();
            } else {
                ctx.logger
                    .log_submit_failure(e.category(), &e.to_string(), ctx.elapsed_ms());
            }
        }
        result
    }

    /// Resolve and assemble `statement` without touching the sequence number
    /// or submitting anything
    pub async fn assemble(
        &self,
        statement: &Statement,
        ctx: &RequestContext,
    ) -> Result<Assembled<'a>, RequestError> {
        match statement {
            Statement::Send(req) => self.assemble_send(req, ctx).await,
            Statement::ShareAccount(req) => self.assemble_share(req, ctx).await,
            Statement::SetData(req) => self.assemble_set_data(req, ctx).await,
            Statement::Offer(req) => self.assemble_offer(req, ctx).await,
        }
    }
}
