//! Per-statement operation assembly
//!
//! Each path resolves its identities and assets, fetches fresh account or
//! order book snapshots, and pushes operations in execution order. Nothing
//! here provisions a sequence number or signs.

use super::Engine;
use crate::amount::{format_amount, parse_amount, to_stroops};
use crate::assets::resolve_asset;
use crate::confirm::TransactionSummary;
use crate::errors::RequestError;
use crate::keys::PublicKey;
use crate::pricing::price_offer;
use crate::resolver::{resolve_destination, resolve_identity, resolve_source_wallet, Identity};
use crate::structured_logging::RequestContext;
use crate::trustline::has_trustline;
use crate::tx_builder::{Operation, TxBuilder};
use crate::types::{
    AmountKind, DataValue, OfferKind, OfferRequest, SendRequest, SetDataRequest,
    ShareAccountRequest,
};
use crate::wallet::Wallet;
use tracing::debug;

/// Operations ready for sequencing and signing
#[derive(Debug)]
pub struct Assembled<'w> {
    /// Wallet whose key signs and whose account is the transaction source
    pub wallet: &'w Wallet,
    pub builder: TxBuilder,
    pub summary: TransactionSummary,
}

/// Threshold after sharing: every signer, master included, must approve
pub fn share_threshold(new_signers: usize, existing_signers: usize) -> u32 {
    (1 + new_signers + existing_signers) as u32
}

fn destination_label(name: Option<&str>, identity: &Identity<'_>) -> String {
    match (name, identity) {
        (_, Identity::Local(wallet)) => wallet.to_string(),
        (Some(name), Identity::Address { address, .. }) if name.trim() != address.address() => {
            format!("{} ({})", name.trim(), address)
        }
        (_, Identity::Address { address, .. }) => address.address(),
    }
}

impl<'a> Engine<'a> {
    pub(super) async fn assemble_send(
        &self,
        req: &SendRequest,
        ctx: &RequestContext,
    ) -> Result<Assembled<'a>, RequestError> {
        let asset = resolve_asset(self.catalog, &req.currency, self.selector)?;
        let amount = parse_amount(&req.amount)?;
        let stroops = to_stroops(amount)?;

        let wallet = resolve_source_wallet(self.wallets, req.from.as_deref(), self.selector)?;
        let destination = resolve_destination(self.wallets, req.to.as_deref(), self.selector)?;
        let source_key = wallet.public_key();
        let dest_key = destination.public_key();
        ctx.logger.log_identity_resolved("source", &source_key.address());
        ctx.logger.log_identity_resolved("destination", &dest_key.address());

        let source_account = self
            .ledger
            .account(&source_key)
            .await?
            .ok_or_else(|| RequestError::SourceNotFunded(source_key.address()))?;
        let dest_account = self.ledger.account(&dest_key).await?;

        if !has_trustline(dest_account.as_ref(), &asset) {
            return Err(RequestError::DestinationUntrusted {
                destination: dest_key.address(),
                asset: asset.code().to_string(),
            });
        }

        let mut builder = TxBuilder::new(source_key).memo(destination.memo().cloned());
        let issues_asset = asset.issuer() == Some(&source_key);
        if !issues_asset && !has_trustline(Some(&source_account), &asset) {
            debug!(asset = %asset, "Source lacks trustline, extending trust first");
            builder.push(Operation::trust(asset.clone())?);
        }
        let transfer = Operation::transfer(dest_key, asset.clone(), stroops, dest_account.is_some())?;
        let op_name = transfer.name();
        builder.push(transfer);

        let mut summary = TransactionSummary::new()
            .row("Operation", op_name)
            .row("Amount", format!("{} {}", format_amount(amount), asset.code()))
            .row("Asset", &asset)
            .row("From", wallet)
            .row("To", destination_label(req.to.as_deref(), &destination));
        if let Some(memo) = destination.memo() {
            summary = summary.row("Memo", memo);
        }

        Ok(Assembled {
            wallet,
            builder,
            summary,
        })
    }

    pub(super) async fn assemble_share(
        &self,
        req: &ShareAccountRequest,
        ctx: &RequestContext,
    ) -> Result<Assembled<'a>, RequestError> {
        let wallet = resolve_source_wallet(self.wallets, Some(&req.account), self.selector)?;
        let account_key = wallet.public_key();
        let account = self
            .ledger
            .account(&account_key)
            .await?
            .ok_or_else(|| RequestError::SourceNotFunded(account_key.address()))?;

        let existing: Vec<&str> = account
            .additional_signers()
            .map(|s| s.key.as_str())
            .collect();

        let mut signers: Vec<PublicKey> = Vec::with_capacity(req.additional_signers.len());
        for name in &req.additional_signers {
            let key = resolve_identity(self.wallets, name, "signer")?.public_key();
            if key == account_key {
                return Err(RequestError::InvalidOperation(format!(
                    "'{}' is the account's own key",
                    name
                )));
            }
            if existing.contains(&key.address().as_str()) || signers.contains(&key) {
                return Err(RequestError::InvalidOperation(format!(
                    "'{}' is already a signer",
                    name
                )));
            }
            if self.ledger.account(&key).await?.is_none() {
                return Err(RequestError::SignerNotFunded(name.clone()));
            }
            ctx.logger.log_identity_resolved("signer", &key.address());
            signers.push(key);
        }
        if signers.is_empty() {
            return Err(RequestError::InvalidOperation(
                "no additional signers given".to_string(),
            ));
        }

        let threshold = share_threshold(signers.len(), existing.len());
        let mut builder = TxBuilder::new(account_key);
        for key in &signers {
            builder.push(Operation::add_signer(*key, 1));
        }
        builder.push(Operation::set_weights(threshold)?);

        let signer_list = signers
            .iter()
            .map(|k| k.address())
            .collect::<Vec<_>>()
            .join("\n");
        let summary = TransactionSummary::new()
            .row("Account", wallet)
            .row("New signers", signer_list)
            .row("Existing signers", existing.len())
            .row("Threshold", threshold);

        Ok(Assembled {
            wallet,
            builder,
            summary,
        })
    }

    pub(super) async fn assemble_set_data(
        &self,
        req: &SetDataRequest,
        ctx: &RequestContext,
    ) -> Result<Assembled<'a>, RequestError> {
        let wallet = resolve_source_wallet(self.wallets, req.account.as_deref(), self.selector)?;
        ctx.logger
            .log_identity_resolved("source", &wallet.public_key().address());

        // Read every value first so a failing file leaves nothing assembled
        let mut values: Vec<(&str, Vec<u8>, String)> = Vec::with_capacity(req.entries.len());
        for entry in &req.entries {
            let (bytes, shown) = match &entry.value {
                DataValue::Literal(text) => (text.as_bytes().to_vec(), text.clone()),
                DataValue::File(path) => {
                    let bytes = tokio::fs::read(path).await.map_err(|source| {
                        RequestError::DataFile {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    let shown = format!("{} bytes from {}", bytes.len(), path.display());
                    (bytes, shown)
                }
            };
            values.push((entry.key.as_str(), bytes, shown));
        }

        let mut builder = TxBuilder::new(wallet.public_key());
        let mut summary = TransactionSummary::new().row("Account", wallet);
        for (key, bytes, shown) in values {
            let shown = if bytes.is_empty() {
                "(delete)".to_string()
            } else {
                shown
            };
            builder.push(Operation::manage_data(key, bytes)?);
            summary = summary.row(key, shown);
        }

        Ok(Assembled {
            wallet,
            builder,
            summary,
        })
    }

    pub(super) async fn assemble_offer(
        &self,
        req: &OfferRequest,
        ctx: &RequestContext,
    ) -> Result<Assembled<'a>, RequestError> {
        let wallet = resolve_source_wallet(self.wallets, req.account.as_deref(), self.selector)?;
        ctx.logger
            .log_identity_resolved("source", &wallet.public_key().address());
        let buying = resolve_asset(self.catalog, &req.buying, self.selector)?;
        let selling = resolve_asset(self.catalog, &req.selling, self.selector)?;
        if buying == selling {
            return Err(RequestError::InvalidOperation(format!(
                "cannot trade {} for itself",
                buying.code()
            )));
        }

        let terms = price_offer(self.ledger.as_ref(), req, &selling, &buying).await?;
        let amount = format_amount(terms.amount);
        if terms.discovered {
            ctx.logger
                .log_price_discovered(selling.code(), buying.code(), &terms.quoted_price, &amount);
        }

        let mut builder = TxBuilder::new(wallet.public_key());
        builder.push(Operation::sell_offer(
            selling.clone(),
            buying.clone(),
            to_stroops(terms.amount)?,
            terms.price,
        ));

        let amount_descr = match (req.kind, req.amount_kind) {
            (OfferKind::Buy, AmountKind::Buying) if terms.discovered => format!(
                "{} {} = {} {}",
                req.amount.trim(),
                buying.code(),
                amount,
                selling.code()
            ),
            _ => format!("{} {}", amount, selling.code()),
        };
        let summary = TransactionSummary::new()
            .row("Account", wallet)
            .row("Amount", amount_descr)
            .row("Buying", &buying)
            .row("Selling", &selling)
            .row("Price", format!("{} ({})", terms.quoted_price, terms.price));

        Ok(Assembled {
            wallet,
            builder,
            summary,
        })
    }
}
