//! Transaction assembly for ledger requests
//!
//! This module turns a list of ledger operations into a signed, encoded
//! transaction envelope.
//!
//! ## Architecture
//!
//! - **errors**: error taxonomy for drafts that never leave the machine
//! - **operations**: per-operation constructors with ledger limits enforced
//! - **builder**: ordered operation list, ordering checks and fee computation
//! - **envelope**: conversion to `stellar-xdr` types, network-bound hashing
//!   and ed25519 signing
//! - **output**: the signed transaction and its transport encoding
//!
//! ## Ordering
//!
//! Operations execute in the order they are pushed. The builder refuses a
//! draft where a trustline follows the payment that needs it, or where a
//! signer is added after the account weights were raised.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use please::keys::Keypair;
//! use please::assets::Asset;
//! use please::types::Network;
//! use please::tx_builder::{sign, Operation, TxBuilder};
//!
//! # fn example(kp: &Keypair, dest: please::keys::PublicKey) -> Result<(), please::tx_builder::EnvelopeError> {
//! let mut builder = TxBuilder::new(kp.public_key());
//! builder.push(Operation::transfer(dest, Asset::Native, 10_000_000, true)?);
//! let draft = builder.build(42, 100, Network::Test)?;
//! let signed = sign(draft, kp)?;
//! let _tx = signed.to_base64()?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::EnvelopeError;

pub mod builder;
pub mod envelope;
pub mod operations;
pub mod output;

pub use builder::{sanity_check_op_order, TransactionDraft, TxBuilder, MAX_OPERATIONS};
pub use envelope::{
    encode_transaction, network_id, sign, signature_payload, to_xdr_transaction,
};
pub use operations::{Operation, SetOptions, SignerWeight};
pub use output::{DecoratedSignature, SignedTransaction};
