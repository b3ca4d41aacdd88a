//! Error types for transaction building
//!
//! Errors raised here happen strictly before submission: a draft that fails
//! validation, signing or encoding is never sent to the network.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Draft violates a ledger limit or an ordering rule
    ///
    /// This includes:
    /// - Empty or oversized operation lists
    /// - Trust extension placed after the payment that needs it
    /// - Signer additions placed after threshold changes
    /// - Memo or data entries over their byte limits
    #[error("Invalid transaction: {0}")]
    Invalid(String),

    /// The signing key cannot sign for the draft's source account
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Transport encoding failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl EnvelopeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::Invalid(format!("operation order: {}", reason.into()))
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "validation",
            Self::Signing(_) => "signing",
            Self::Encoding(_) => "encoding",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EnvelopeError::invalid_order("trust after payment");
        assert_eq!(
            err.to_string(),
            "Invalid transaction: operation order: trust after payment"
        );
        assert_eq!(err.category(), "validation");
        assert_eq!(EnvelopeError::Signing("x".into()).category(), "signing");
    }
}
