//! Error taxonomy for statement processing
//!
//! Every failure the engine can report is a `RequestError`. Nothing in the
//! engine retries automatically: the operator fixes the cause and re-runs
//! the statement. Failures raised before submission never reach the network.

use crate::ledger::LedgerError;
use crate::tx_builder::EnvelopeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    /// Malformed statement field (amount, price, ...)
    #[error("parse error: {0}")]
    Parse(String),

    /// Identity could not be resolved
    #[error("{what} '{name}' not found")]
    NotFound { what: &'static str, name: String },

    #[error("asset {0} is not supported right now")]
    UnsupportedAsset(String),

    /// Empty order book side while a price had to be discovered
    #[error("no offers found in the orderbook for {selling}/{buying}, you should specify a price")]
    NoLiquidity { selling: String, buying: String },

    #[error("source account {0} does not exist, please fund it first")]
    SourceNotFunded(String),

    #[error("destination account {destination} needs to trust {asset}")]
    DestinationUntrusted { destination: String, asset: String },

    #[error("signer '{0}' does not exist, fund it first")]
    SignerNotFunded(String),

    /// Selection could not be made (no candidates, ambiguity without a
    /// prompt, or a cancelled prompt)
    #[error("selection failed: {0}")]
    Selection(String),

    /// Referenced data file could not be read
    #[error("failed to read {}: {source}", path.display())]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation parameters the ledger would reject
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Transport-level failure talking to the ledger
    #[error("network error: {0}")]
    Network(String),

    /// The ledger validated and rejected the transaction
    #[error("{title} ({result_codes})")]
    LedgerRejection { title: String, result_codes: String },

    /// Confirmation declined by the operator
    #[error("aborted by user")]
    UserDeclined,
}

impl RequestError {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Declined confirmations abort without being a failure
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserDeclined)
    }

    /// Error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::NotFound { .. } => "not_found",
            Self::UnsupportedAsset(_) => "unsupported_asset",
            Self::NoLiquidity { .. } => "no_liquidity",
            Self::SourceNotFunded(_) => "source_not_funded",
            Self::DestinationUntrusted { .. } => "destination_untrusted",
            Self::SignerNotFunded(_) => "signer_not_funded",
            Self::Selection(_) => "selection",
            Self::DataFile { .. } => "data_file",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Signing(_) => "signing",
            Self::Encoding(_) => "encoding",
            Self::Network(_) => "network",
            Self::LedgerRejection { .. } => "ledger_rejection",
            Self::UserDeclined => "user_declined",
        }
    }
}

impl From<LedgerError> for RequestError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected {
                title,
                result_codes,
                ..
            } => Self::LedgerRejection {
                title,
                result_codes,
            },
            LedgerError::AccountNotFound(address) => Self::SourceNotFunded(address),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<EnvelopeError> for RequestError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Signing(msg) => Self::Signing(msg),
            EnvelopeError::Encoding(msg) => Self::Encoding(msg),
            EnvelopeError::Invalid(msg) => Self::InvalidOperation(msg),
        }
    }
}
