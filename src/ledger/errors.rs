use thiserror::Error;

/// Ledger client errors
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Transport-level errors (connection, TLS, DNS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("Timeout after {timeout_ms}ms (endpoint: {endpoint})")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// The network validated the transaction and rejected it
    #[error("{title} ({result_codes})")]
    Rejected {
        status: u16,
        title: String,
        /// Machine-readable result codes, JSON encoded
        result_codes: String,
    },

    /// Non-success status that carries no rejection details
    #[error("Unexpected HTTP status {status} from {endpoint}: {title}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        title: String,
    },

    /// Sequence requested for an account that does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl LedgerError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, endpoint: &str, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            LedgerError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms,
            }
        } else if err.is_decode() {
            LedgerError::Decode(err.to_string())
        } else {
            LedgerError::Transport(format!("{} ({})", err, endpoint))
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
