//! Common types used throughout the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ledger network variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Public network
    #[default]
    Public,
    /// Test network
    Test,
}

impl Network {
    pub fn from_testnet_flag(testnet: bool) -> Self {
        if testnet {
            Network::Test
        } else {
            Network::Public
        }
    }

    /// Passphrase hashed into every signature payload
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Public => "Public Global Stellar Network ; September 2015",
            Network::Test => "Test SDF Network ; September 2015",
        }
    }

    pub fn default_horizon_url(&self) -> &'static str {
        match self {
            Network::Public => "https://horizon.stellar.org",
            Network::Test => "https://horizon-testnet.stellar.org",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Network::Public => "PUBLIC",
            Network::Test => "TESTNET",
        }
    }
}

/// Optional transaction memo, usually supplied by a contact record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Memo {
    /// UTF-8 text, at most 28 bytes
    Text(String),
    Id(u64),
    /// 32-byte hash, hex encoded in the wallet file
    Hash(#[serde(with = "hex_32")] [u8; 32]),
    Return(#[serde(with = "hex_32")] [u8; 32]),
}

/// Maximum byte length of a text memo
pub const MEMO_TEXT_MAX: usize = 28;

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memo::Text(text) => write!(f, "text:{}", text),
            Memo::Id(id) => write!(f, "id:{}", id),
            Memo::Hash(hash) => write!(f, "hash:{}", hex::encode(hash)),
            Memo::Return(hash) => write!(f, "return:{}", hex::encode(hash)),
        }
    }
}

mod hex_32 {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let raw = hex::decode(&text).map_err(D::Error::custom)?;
        raw.try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("expected 32 bytes, got {}", v.len())))
    }
}

/// A parsed request. Produced once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Send(SendRequest),
    ShareAccount(ShareAccountRequest),
    SetData(SetDataRequest),
    Offer(OfferRequest),
}

impl Statement {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Send(_) => "send",
            Statement::ShareAccount(_) => "share_account",
            Statement::SetData(_) => "set_data",
            Statement::Offer(offer) => match offer.kind {
                OfferKind::Buy => "buy_offer",
                OfferKind::Sell => "sell_offer",
            },
        }
    }
}

/// "send 20 XLM from master to jennifer"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Decimal string, kept verbatim to preserve ledger precision
    pub amount: String,
    pub currency: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Turn an account into a multisig account shared with `additional_signers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAccountRequest {
    pub account: String,
    pub additional_signers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDataRequest {
    pub account: Option<String>,
    /// Entries in declared order
    pub entries: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    pub key: String,
    pub value: DataValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Literal(String),
    /// Raw bytes of the file at this path
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferKind {
    Buy,
    Sell,
}

/// Which side of the pair the declared amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    Buying,
    Selling,
}

/// "buy 100 USDC using XLM", "sell 100 USDC for XLM at 0.25"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRequest {
    pub kind: OfferKind,
    pub account: Option<String>,
    pub buying: String,
    pub selling: String,
    pub amount: String,
    pub amount_kind: AmountKind,
    pub price: Option<String>,
}

/// Outcome of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    /// Hex transaction hash
    pub hash: String,
    /// Ledger the transaction was included in, when reported
    pub ledger: Option<u32>,
}
