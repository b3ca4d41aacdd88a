//! Ledger operations assembled into a transaction
//!
//! Constructors validate the ledger's per-operation limits so an invalid
//! operation never reaches the builder.

use crate::amount::{Price, MAX_TRUST_LIMIT};
use crate::assets::Asset;
use crate::keys::PublicKey;
use crate::tx_builder::errors::EnvelopeError;

/// Longest data entry name, in bytes
pub const DATA_NAME_MAX: usize = 64;

/// Longest data entry value, in bytes
pub const DATA_VALUE_MAX: usize = 64;

/// Signer added by a `SetOptions` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerWeight {
    pub key: PublicKey,
    pub weight: u32,
}

/// Account option changes. Unset fields are left untouched on the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub master_weight: Option<u32>,
    pub low_threshold: Option<u32>,
    pub med_threshold: Option<u32>,
    pub high_threshold: Option<u32>,
    pub signer: Option<SignerWeight>,
}

impl SetOptions {
    pub fn changes_weights(&self) -> bool {
        self.master_weight.is_some()
            || self.low_threshold.is_some()
            || self.med_threshold.is_some()
            || self.high_threshold.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Fund a new account with native lumens
    CreateAccount {
        destination: PublicKey,
        starting_balance: i64,
    },
    Payment {
        destination: PublicKey,
        asset: Asset,
        amount: i64,
    },
    /// Create or extend a trustline
    ChangeTrust { asset: Asset, limit: i64 },
    SetOptions(SetOptions),
    /// Set a data entry; `None` deletes it
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
    /// Offer `amount` of `selling` at `price` units of `buying` each
    ManageSellOffer {
        selling: Asset,
        buying: Asset,
        amount: i64,
        price: Price,
        offer_id: i64,
    },
}

impl Operation {
    /// Account creation when the destination does not exist yet, a payment
    /// otherwise. New accounts can only be funded with the native asset.
    pub fn transfer(
        destination: PublicKey,
        asset: Asset,
        amount: i64,
        destination_exists: bool,
    ) -> Result<Self, EnvelopeError> {
        if destination_exists {
            return Ok(Operation::Payment {
                destination,
                asset,
                amount,
            });
        }
        if !asset.is_native() {
            return Err(EnvelopeError::invalid(format!(
                "cannot create account {} with non-native asset {}",
                destination,
                asset.code()
            )));
        }
        Ok(Operation::CreateAccount {
            destination,
            starting_balance: amount,
        })
    }

    /// Trustline with the maximum limit
    pub fn trust(asset: Asset) -> Result<Self, EnvelopeError> {
        if asset.is_native() {
            return Err(EnvelopeError::invalid("the native asset needs no trustline"));
        }
        Ok(Operation::ChangeTrust {
            asset,
            limit: MAX_TRUST_LIMIT,
        })
    }

    pub fn add_signer(key: PublicKey, weight: u32) -> Self {
        Operation::SetOptions(SetOptions {
            signer: Some(SignerWeight { key, weight }),
            ..SetOptions::default()
        })
    }

    /// Master weight and all three thresholds set to `threshold`
    pub fn set_weights(threshold: u32) -> Result<Self, EnvelopeError> {
        if threshold > 255 {
            return Err(EnvelopeError::invalid(format!(
                "threshold {} exceeds 255",
                threshold
            )));
        }
        Ok(Operation::SetOptions(SetOptions {
            master_weight: Some(threshold),
            low_threshold: Some(threshold),
            med_threshold: Some(threshold),
            high_threshold: Some(threshold),
            signer: None,
        }))
    }

    pub fn manage_data(name: &str, value: Vec<u8>) -> Result<Self, EnvelopeError> {
        if name.is_empty() || name.len() > DATA_NAME_MAX {
            return Err(EnvelopeError::invalid(format!(
                "data name '{}' must be 1-{} bytes",
                name, DATA_NAME_MAX
            )));
        }
        if value.len() > DATA_VALUE_MAX {
            return Err(EnvelopeError::invalid(format!(
                "data value for '{}' is {} bytes, limit is {}",
                name,
                value.len(),
                DATA_VALUE_MAX
            )));
        }
        Ok(Operation::ManageData {
            name: name.to_string(),
            value: if value.is_empty() { None } else { Some(value) },
        })
    }

    /// New sell offer (offer id 0)
    pub fn sell_offer(selling: Asset, buying: Asset, amount: i64, price: Price) -> Self {
        Operation::ManageSellOffer {
            selling,
            buying,
            amount,
            price,
            offer_id: 0,
        }
    }

    /// Short name for logs and summaries
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateAccount { .. } => "create_account",
            Operation::Payment { .. } => "payment",
            Operation::ChangeTrust { .. } => "change_trust",
            Operation::SetOptions(opts) if opts.signer.is_some() => "add_signer",
            Operation::SetOptions(_) => "set_options",
            Operation::ManageData { .. } => "manage_data",
            Operation::ManageSellOffer { .. } => "manage_sell_offer",
        }
    }
}
