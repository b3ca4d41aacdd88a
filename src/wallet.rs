//! Wallet store: local signing keys and the contact directory
//!
//! The store is a JSON document:
//!
//! ```json
//! {
//!   "wallets": [{ "name": "master", "seed": "S..." }],
//!   "contacts": {
//!     "jennifer": { "address": "G...", "memo": { "type": "id", "value": 42 } }
//!   }
//! }
//! ```
//!
//! Seeds are stored in plain text; protecting the file is left to the host.

use crate::keys::{Keypair, PublicKey};
use crate::types::Memo;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// A named local signing key
#[derive(Debug, Clone)]
pub struct Wallet {
    pub name: String,
    keypair: Keypair,
}

impl Wallet {
    pub fn new(name: impl Into<String>, keypair: Keypair) -> Self {
        Self {
            name: name.into(),
            keypair,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.public_key())
    }
}

/// A known destination
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub address: String,
    #[serde(default)]
    pub memo: Option<Memo>,
}

#[derive(Deserialize)]
struct WalletRecord {
    name: String,
    seed: Zeroizing<String>,
}

#[derive(Deserialize)]
struct StoreFile {
    #[serde(default)]
    wallets: Vec<WalletRecord>,
    #[serde(default)]
    contacts: BTreeMap<String, Contact>,
}

/// Wallets and contacts. Contacts iterate in alias order.
#[derive(Debug, Clone, Default)]
pub struct WalletStore {
    wallets: Vec<Wallet>,
    contacts: BTreeMap<String, Contact>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = Zeroizing::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read wallet store: {}", path.display()))?,
        );
        Self::from_json(&content)
            .with_context(|| format!("Failed to load wallet store: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: StoreFile = serde_json::from_str(json).context("Failed to parse wallet JSON")?;
        let mut store = Self::new();
        for record in file.wallets {
            let keypair = Keypair::from_secret_seed(&record.seed)
                .with_context(|| format!("Invalid seed for wallet '{}'", record.name))?;
            store.add_wallet(Wallet::new(record.name, keypair))?;
        }
        for (alias, contact) in file.contacts {
            PublicKey::from_address(&contact.address)
                .with_context(|| format!("Invalid address for contact '{}'", alias))?;
            store.contacts.insert(alias, contact);
        }
        Ok(store)
    }

    /// Add a wallet; names must be unique
    pub fn add_wallet(&mut self, wallet: Wallet) -> Result<()> {
        if self.wallet_by_name(&wallet.name).is_some() {
            anyhow::bail!("Duplicate wallet name '{}'", wallet.name);
        }
        self.wallets.push(wallet);
        Ok(())
    }

    pub fn add_contact(&mut self, alias: impl Into<String>, contact: Contact) {
        self.contacts.insert(alias.into(), contact);
    }

    pub fn wallet_by_name(&self, name: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.name == name)
    }

    pub fn wallet_by_address(&self, address: &PublicKey) -> Option<&Wallet> {
        self.wallets.iter().find(|w| &w.public_key() == address)
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn contact(&self, alias: &str) -> Option<&Contact> {
        self.contacts.get(alias)
    }

    pub fn contacts(&self) -> impl Iterator<Item = (&String, &Contact)> {
        self.contacts.iter()
    }
}
