//! Please - request resolution and transaction assembly for the Stellar ledger
//!
//! This library turns short requests ("send 20 XLM from master to
//! jennifer", "buy 100 USDC using XLM") into signed ledger transactions and
//! submits them. The binary wires it to a terminal; the library exposes every
//! stage for testing and integration.

pub mod amount;
pub mod assets;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod errors;
pub mod keys;
pub mod ledger;
pub mod pricing;
pub mod resolver;
pub mod selector;
pub mod structured_logging;
pub mod test_utils;
pub mod trustline;
pub mod tx_builder;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use engine::{Engine, EngineConfig};
pub use errors::RequestError;
pub use types::{Statement, SubmissionResult};

#[cfg(test)]
mod tests {
    // Include test modules
    mod config_validation;
    mod engine_offer_tests;
    mod engine_send_tests;
    mod engine_set_data_tests;
    mod engine_share_tests;
    mod test_helpers;
}
