//! Account keys and their strkey text encoding
//!
//! Public addresses (`G...`) and secret seeds (`S...`) are 32-byte ed25519
//! keys in the ledger's strkey format, encoded and checked by
//! `stellar-strkey`.

use ed25519_dalek::{Signer, SigningKey};
use std::fmt;
use std::str::FromStr;
use stellar_strkey::ed25519;
use thiserror::Error;
use zeroize::Zeroizing;

/// Key decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("'{0}' is not a valid account address")]
    Address(String),

    /// The seed text is never echoed back
    #[error("invalid secret seed")]
    Seed,
}

/// Public ed25519 account key (`G...` address)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `G...` address
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        ed25519::PublicKey::from_string(address)
            .map(|key| Self(key.0))
            .map_err(|_| KeyError::Address(address.to_string()))
    }

    /// Encode as a `G...` address
    pub fn address(&self) -> String {
        ed25519::PublicKey(self.0).to_string()
    }

    /// Last four bytes of the key, used as the signature hint in envelopes
    pub fn signature_hint(&self) -> [u8; 4] {
        [self.0[28], self.0[29], self.0[30], self.0[31]]
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.address())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

/// Local signing key. The secret never appears in `Debug` output and is
/// wiped on drop by `ed25519-dalek`.
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Build a keypair from a raw 32-byte ed25519 seed
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed),
        }
    }

    /// Parse an `S...` secret seed
    pub fn from_secret_seed(seed: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            ed25519::PrivateKey::from_string(seed)
                .map_err(|_| KeyError::Seed)?
                .0,
        );
        Ok(Self::from_seed_bytes(&bytes))
    }

    /// Encode the seed as `S...`
    pub fn secret_seed(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing.to_bytes());
        Zeroizing::new(ed25519::PrivateKey(*seed).to_string())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
