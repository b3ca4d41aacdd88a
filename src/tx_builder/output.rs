//! Signed transaction ready for submission
//!
//! [`SignedTransaction`] owns the draft it was built from, the ledger form
//! of the transaction body, the network hash and the signatures. It is the
//! only thing the dispatcher sends to the ledger.

use crate::tx_builder::builder::TransactionDraft;
use crate::tx_builder::errors::EnvelopeError;
use stellar_xdr::curr as xdr;
use stellar_xdr::curr::{Limits, WriteXdr};

/// Signature plus the hint the ledger uses to find the signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

impl DecoratedSignature {
    fn to_xdr_signature(&self) -> Result<xdr::DecoratedSignature, EnvelopeError> {
        let signature = self
            .signature
            .to_vec()
            .try_into()
            .map_err(|e| EnvelopeError::Encoding(format!("signature: {}", e)))?;
        Ok(xdr::DecoratedSignature {
            hint: xdr::SignatureHint(self.hint),
            signature: xdr::Signature(signature),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SignedTransaction {
    draft: TransactionDraft,
    tx: xdr::Transaction,
    hash: [u8; 32],
    signatures: Vec<DecoratedSignature>,
}

impl SignedTransaction {
    pub(crate) fn new(
        draft: TransactionDraft,
        tx: xdr::Transaction,
        hash: [u8; 32],
        signatures: Vec<DecoratedSignature>,
    ) -> Self {
        Self {
            draft,
            tx,
            hash,
            signatures,
        }
    }

    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Lowercase hex, the form the ledger reports
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    pub fn to_envelope(&self) -> Result<xdr::TransactionEnvelope, EnvelopeError> {
        let signatures: xdr::VecM<xdr::DecoratedSignature, 20> = self
            .signatures
            .iter()
            .map(DecoratedSignature::to_xdr_signature)
            .collect::<Result<Vec<_>, _>>()?
            .try_into()
            .map_err(|e| EnvelopeError::Encoding(format!("signatures: {}", e)))?;
        Ok(xdr::TransactionEnvelope::Tx(xdr::TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures,
        }))
    }

    pub fn to_envelope_xdr(&self) -> Result<Vec<u8>, EnvelopeError> {
        self.to_envelope()?
            .to_xdr(Limits::none())
            .map_err(|e| EnvelopeError::Encoding(format!("envelope: {}", e)))
    }

    /// Transport encoding for submission
    pub fn to_base64(&self) -> Result<String, EnvelopeError> {
        self.to_envelope()?
            .to_xdr_base64(Limits::none())
            .map_err(|e| EnvelopeError::Encoding(format!("envelope: {}", e)))
    }
}
