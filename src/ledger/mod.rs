//! Ledger network access
//!
//! The engine talks to the network only through [`LedgerClient`]: account
//! lookup, order book lookup, sequence provisioning and submission. Snapshots
//! returned here are point-in-time and are never cached by the engine.

use crate::assets::Asset;
use crate::keys::PublicKey;
use async_trait::async_trait;

pub mod errors;
pub mod horizon;

pub use errors::{LedgerError, LedgerResult};
pub use horizon::HorizonClient;

/// Point-in-time view of an existing account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub account_id: PublicKey,
    /// Current sequence number; the next transaction uses `sequence + 1`
    pub sequence: i64,
    pub balances: Vec<Balance>,
    /// Signers as reported by the network, including the master key
    pub signers: Vec<AccountSigner>,
}

impl AccountSnapshot {
    /// A funded account with only a native balance and its master signer
    pub fn new(account_id: PublicKey, sequence: i64) -> Self {
        Self {
            account_id,
            sequence,
            balances: vec![Balance {
                asset: Asset::Native,
                amount: "0.0000000".to_string(),
            }],
            signers: vec![AccountSigner {
                key: account_id.address(),
                weight: 1,
            }],
        }
    }

    /// Signers other than the account's own master key
    pub fn additional_signers(&self) -> impl Iterator<Item = &AccountSigner> {
        let master = self.account_id.address();
        self.signers.iter().filter(move |s| s.key != master)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub asset: Asset,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSigner {
    /// Signer key in strkey form
    pub key: String,
    pub weight: u32,
}

/// One aggregated price level of an order book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// Units of the counter asset per unit of the base asset, decimal string
    pub price: String,
    pub amount: String,
}

/// Order book of a (selling, buying) pair. Levels are best-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBookSummary {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub hash: String,
    pub ledger: Option<u32>,
}

/// Network collaborator consumed by the engine
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch an account; `Ok(None)` when it does not exist
    async fn account(&self, address: &PublicKey) -> LedgerResult<Option<AccountSnapshot>>;

    /// Fetch the order book where `selling` is the base asset
    async fn order_book(&self, selling: &Asset, buying: &Asset) -> LedgerResult<OrderBookSummary>;

    /// Sequence number the next transaction from `address` must carry
    async fn next_sequence(&self, address: &PublicKey) -> LedgerResult<i64>;

    /// Submit a base64 transaction envelope
    async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse>;
}
