//! Identity resolution
//!
//! A free-form name resolves, first match wins, as:
//! 1. a raw ledger address (no local key)
//! 2. a wallet alias (local signing key)
//! 3. a contact alias (address plus the contact's memo)
//!
//! A missing name is never an error on its own: the operator is asked to
//! pick among known wallets or contacts through the [`Selector`].

use crate::errors::RequestError;
use crate::keys::PublicKey;
use crate::selector::{Choice, Selector};
use crate::types::Memo;
use crate::wallet::{Wallet, WalletStore};
use tracing::debug;

/// Resolved signing or destination identity. Local keys are borrowed from
/// the wallet store for the duration of one statement.
#[derive(Debug, Clone)]
pub enum Identity<'w> {
    Local(&'w Wallet),
    Address {
        address: PublicKey,
        memo: Option<Memo>,
    },
}

impl<'w> Identity<'w> {
    pub fn public_key(&self) -> PublicKey {
        match self {
            Identity::Local(wallet) => wallet.public_key(),
            Identity::Address { address, .. } => *address,
        }
    }

    /// Memo attached by a contact record
    pub fn memo(&self) -> Option<&Memo> {
        match self {
            Identity::Local(_) => None,
            Identity::Address { memo, .. } => memo.as_ref(),
        }
    }

    pub fn wallet(&self) -> Option<&'w Wallet> {
        match self {
            Identity::Local(wallet) => Some(*wallet),
            Identity::Address { .. } => None,
        }
    }
}

/// Resolve `name` in address, wallet, contact order
pub fn resolve_identity<'w>(
    store: &'w WalletStore,
    name: &str,
    what: &'static str,
) -> Result<Identity<'w>, RequestError> {
    let name = name.trim();
    if let Ok(address) = PublicKey::from_address(name) {
        debug!(what, source = "address", %address, "Identity resolved");
        return Ok(Identity::Address {
            address,
            memo: None,
        });
    }
    if let Some(wallet) = store.wallet_by_name(name) {
        debug!(what, source = "wallet", name = %wallet.name, "Identity resolved");
        return Ok(Identity::Local(wallet));
    }
    if let Some(contact) = store.contact(name) {
        let address = PublicKey::from_address(&contact.address).map_err(|e| {
            RequestError::InvalidOperation(format!(
                "contact '{}' has an invalid address: {}",
                name, e
            ))
        })?;
        debug!(what, source = "contact", alias = %name, %address, "Identity resolved");
        return Ok(Identity::Address {
            address,
            memo: contact.memo.clone(),
        });
    }
    Err(RequestError::not_found(what, name))
}

/// Resolve a wallet that can sign, by address or by name. Without a name
/// the operator chooses among local wallets.
pub fn resolve_source_wallet<'w>(
    store: &'w WalletStore,
    name: Option<&str>,
    selector: &dyn Selector,
) -> Result<&'w Wallet, RequestError> {
    match name {
        Some(name) => {
            let name = name.trim();
            let found = match PublicKey::from_address(name) {
                Ok(address) => store.wallet_by_address(&address),
                Err(_) => store.wallet_by_name(name),
            };
            found.ok_or_else(|| RequestError::not_found("wallet", name))
        }
        None => {
            let wallets = store.wallets();
            let labels: Vec<String> = wallets.iter().map(|w| w.to_string()).collect();
            let idx = selector.select("Choose wallet", &labels)?;
            wallets
                .get(idx)
                .ok_or_else(|| RequestError::Selection(format!("wallet choice {} out of range", idx)))
        }
    }
}

/// Resolve a payment destination. Without a name the operator chooses a
/// contact or types an address.
pub fn resolve_destination<'w>(
    store: &'w WalletStore,
    name: Option<&str>,
    selector: &dyn Selector,
) -> Result<Identity<'w>, RequestError> {
    if let Some(name) = name {
        return resolve_identity(store, name, "destination");
    }

    let contacts: Vec<(&String, _)> = store.contacts().collect();
    let labels: Vec<String> = contacts
        .iter()
        .map(|(alias, contact)| format!("{} ({})", alias, contact.address))
        .collect();

    match selector.select_or_address("Choose destination", &labels)? {
        Choice::Index(idx) => {
            let (alias, contact) = contacts.get(idx).ok_or_else(|| {
                RequestError::Selection(format!("destination choice {} out of range", idx))
            })?;
            let address = PublicKey::from_address(&contact.address).map_err(|e| {
                RequestError::InvalidOperation(format!(
                    "contact '{}' has an invalid address: {}",
                    alias, e
                ))
            })?;
            Ok(Identity::Address {
                address,
                memo: contact.memo.clone(),
            })
        }
        Choice::Input(address) => {
            let address = PublicKey::from_address(&address)
                .map_err(|e| RequestError::Parse(format!("invalid address '{}': {}", address, e)))?;
            Ok(Identity::Address {
                address,
                memo: None,
            })
        }
    }
}
