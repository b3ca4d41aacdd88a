//! Transaction draft assembly
//!
//! [`TxBuilder`] collects operations in the exact order they must execute.
//! `build` checks the ordering rules, attaches the sequence number, fee and
//! network, and yields an immutable [`TransactionDraft`].

use crate::assets::Asset;
use crate::keys::PublicKey;
use crate::tx_builder::errors::EnvelopeError;
use crate::tx_builder::operations::Operation;
use crate::types::{Memo, Network, MEMO_TEXT_MAX};

/// Most operations a single transaction may carry
pub const MAX_OPERATIONS: usize = 100;

/// Fully specified, unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub source: PublicKey,
    pub sequence: i64,
    /// Total fee in stroops
    pub fee: u32,
    pub memo: Option<Memo>,
    pub operations: Vec<Operation>,
    pub network: Network,
}

#[derive(Debug, Clone)]
pub struct TxBuilder {
    source: PublicKey,
    memo: Option<Memo>,
    operations: Vec<Operation>,
}

impl TxBuilder {
    pub fn new(source: PublicKey) -> Self {
        Self {
            source,
            memo: None,
            operations: Vec::with_capacity(4),
        }
    }

    pub fn memo(mut self, memo: Option<Memo>) -> Self {
        self.memo = memo;
        self
    }

    pub fn push(&mut self, op: Operation) -> &mut Self {
        self.operations.push(op);
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Finalize with the provisioned sequence number and per-operation fee
    pub fn build(
        self,
        sequence: i64,
        base_fee: u32,
        network: Network,
    ) -> Result<TransactionDraft, EnvelopeError> {
        sanity_check_op_order(&self.operations)?;
        if let Some(Memo::Text(text)) = &self.memo {
            if text.len() > MEMO_TEXT_MAX {
                return Err(EnvelopeError::invalid(format!(
                    "text memo is {} bytes, limit is {}",
                    text.len(),
                    MEMO_TEXT_MAX
                )));
            }
        }
        let fee = base_fee
            .checked_mul(self.operations.len() as u32)
            .ok_or_else(|| EnvelopeError::invalid("fee overflows"))?;

        Ok(TransactionDraft {
            source: self.source,
            sequence,
            fee,
            memo: self.memo,
            operations: self.operations,
            network,
        })
    }
}

/// Validate operation ordering.
///
/// Rules:
/// 1. At least one and at most [`MAX_OPERATIONS`] operations
/// 2. A trustline for an asset comes before any payment of that asset
/// 3. Signer additions come before any master weight or threshold change
pub fn sanity_check_op_order(operations: &[Operation]) -> Result<(), EnvelopeError> {
    if operations.is_empty() {
        return Err(EnvelopeError::invalid_order("operation list is empty"));
    }
    if operations.len() > MAX_OPERATIONS {
        return Err(EnvelopeError::invalid_order(format!(
            "{} operations, limit is {}",
            operations.len(),
            MAX_OPERATIONS
        )));
    }

    let trust_position = |asset: &Asset| {
        operations
            .iter()
            .position(|op| matches!(op, Operation::ChangeTrust { asset: a, .. } if a == asset))
    };

    let mut weights_changed_at: Option<usize> = None;
    for (idx, op) in operations.iter().enumerate() {
        match op {
            Operation::Payment { asset, .. } => {
                if let Some(trust_idx) = trust_position(asset) {
                    if trust_idx > idx {
                        return Err(EnvelopeError::invalid_order(format!(
                            "trustline for {} at position {} follows its payment at position {}",
                            asset.code(),
                            trust_idx,
                            idx
                        )));
                    }
                }
            }
            Operation::SetOptions(opts) => {
                if opts.signer.is_some() {
                    if let Some(changed) = weights_changed_at {
                        return Err(EnvelopeError::invalid_order(format!(
                            "signer added at position {} after weights changed at position {}",
                            idx, changed
                        )));
                    }
                }
                if opts.changes_weights() && weights_changed_at.is_none() {
                    weights_changed_at = Some(idx);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    fn key(n: u8) -> PublicKey {
        Keypair::from_seed_bytes(&[n; 32]).public_key()
    }

    fn usd() -> Asset {
        Asset::credit("USD", key(9)).unwrap()
    }

    #[test]
    fn test_build_sets_fee_and_preserves_order() {
        let mut builder = TxBuilder::new(key(1));
        builder
            .push(Operation::trust(usd()).unwrap())
            .push(Operation::transfer(key(2), usd(), 5, true).unwrap());
        let draft = builder.build(42, 100, Network::Test).unwrap();

        assert_eq!(draft.fee, 200);
        assert_eq!(draft.sequence, 42);
        assert_eq!(draft.operations[0].name(), "change_trust");
        assert_eq!(draft.operations[1].name(), "payment");
    }

    #[test]
    fn test_trust_after_payment_rejected() {
        let ops = vec![
            Operation::transfer(key(2), usd(), 5, true).unwrap(),
            Operation::trust(usd()).unwrap(),
        ];
        assert!(matches!(
            sanity_check_op_order(&ops),
            Err(EnvelopeError::Invalid(_))
        ));
    }

    #[test]
    fn test_signer_after_weights_rejected() {
        let valid = vec![
            Operation::add_signer(key(2), 1),
            Operation::add_signer(key(3), 1),
            Operation::set_weights(3).unwrap(),
        ];
        assert!(sanity_check_op_order(&valid).is_ok());

        let invalid = vec![
            Operation::add_signer(key(2), 1),
            Operation::set_weights(3).unwrap(),
            Operation::add_signer(key(3), 1),
        ];
        assert!(sanity_check_op_order(&invalid).is_err());
    }

    #[test]
    fn test_empty_and_oversized_rejected() {
        assert!(sanity_check_op_order(&[]).is_err());
        let many: Vec<Operation> = (0..=MAX_OPERATIONS)
            .map(|i| Operation::manage_data(&format!("k{}", i), b"v".to_vec()).unwrap())
            .collect();
        assert!(sanity_check_op_order(&many).is_err());
    }

    #[test]
    fn test_long_text_memo_rejected() {
        let mut builder = TxBuilder::new(key(1))
            .memo(Some(Memo::Text("x".repeat(MEMO_TEXT_MAX + 1))));
        builder.push(Operation::transfer(key(2), Asset::Native, 1, true).unwrap());
        assert!(builder.build(1, 100, Network::Public).is_err());
    }
}
