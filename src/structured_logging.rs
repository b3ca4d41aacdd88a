//! Structured logging and request context

use std::time::Instant;
use uuid::Uuid;

/// Structured logger for statement processing events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_statement_received(&self, kind: &str, network: &str) {
        tracing::info!(
            context_id = %self.context_id,
            kind = %kind,
            network = %network,
            "Statement received"
        );
    }

    pub fn log_identity_resolved(&self, role: &str, address: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            role = %role,
            address = %address,
            "Identity resolved"
        );
    }

    pub fn log_price_discovered(&self, selling: &str, buying: &str, price: &str, amount: &str) {
        tracing::info!(
            context_id = %self.context_id,
            selling = %selling,
            buying = %buying,
            price = %price,
            amount = %amount,
            "Offer priced from order book"
        );
    }

    pub fn log_draft_built(&self, operations: &[&str], sequence: i64, fee: u32) {
        tracing::debug!(
            context_id = %self.context_id,
            operations = ?operations,
            sequence = %sequence,
            fee = %fee,
            "Transaction draft built"
        );
    }

    pub fn log_submit_attempt(&self, hash: &str, op_count: usize) {
        tracing::info!(
            context_id = %self.context_id,
            hash = %hash,
            op_count = %op_count,
            "Submitting transaction"
        );
    }

    pub fn log_submit_success(&self, hash: &str, ledger: Option<u32>, latency_ms: u64) {
        tracing::info!(
            context_id = %self.context_id,
            hash = %hash,
            ledger = ?ledger,
            latency_ms = %latency_ms,
            "Transaction submitted"
        );
    }

    pub fn log_submit_failure(&self, category: &str, error: &str, latency_ms: u64) {
        tracing::warn!(
            context_id = %self.context_id,
            category = %category,
            error = %error,
            latency_ms = %latency_ms,
            "Transaction failed"
        );
    }

    pub fn log_declined(&self) {
        tracing::info!(context_id = %self.context_id, "Confirmation declined, nothing submitted");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            message = %message,
            "Warning"
        );
    }
}

/// Per-statement execution context
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID
    pub request_id: String,

    /// Statement kind being processed
    pub operation: String,

    pub started: Instant,

    /// Structured logger instance
    pub logger: StructuredLogger,
}

impl RequestContext {
    pub fn new(operation: &str) -> Self {
        let request_id = Uuid::new_v4().to_string();
        Self {
            request_id: request_id.clone(),
            operation: operation.to_string(),
            started: Instant::now(),
            logger: StructuredLogger::new(request_id),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("default")
    }
}
