//! Horizon REST implementation of [`LedgerClient`]

use super::{
    AccountSigner, AccountSnapshot, Balance, LedgerClient, LedgerError, LedgerResult,
    OrderBookSummary, PriceLevel, SubmitResponse,
};
use crate::assets::Asset;
use crate::keys::PublicKey;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for a Horizon server
#[derive(Debug, Clone)]
pub struct HorizonClient {
    base_url: String,
    http: reqwest::Client,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: String,
    sequence: String,
    #[serde(default)]
    balances: Vec<BalanceRecord>,
    #[serde(default)]
    signers: Vec<SignerRecord>,
}

#[derive(Debug, Deserialize)]
struct BalanceRecord {
    balance: String,
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignerRecord {
    key: String,
    weight: u32,
}


#[derive(Debug, Deserialize)]
struct OrderBookRecord {
    #[serde(default)]
    bids: Vec<PriceLevelRecord>,
    #[serde(default)]
    asks: Vec<PriceLevelRecord>,
}

#[derive(Debug, Deserialize)]
struct PriceLevelRecord {
    price: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct SubmitRecord {
    hash: String,
    #[serde(default)]
    ledger: Option<u32>,
}

/// RFC 7807 problem document returned on failures
#[derive(Debug, Default, Deserialize)]
struct Problem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<serde_json::Value>,
}

impl HorizonClient {
    pub fn new(base_url: &str, timeout: Duration) -> LedgerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    fn transport_error(&self, err: reqwest::Error, endpoint: &str) -> LedgerError {
        LedgerError::from_reqwest(err, endpoint, self.timeout_ms)
    }

    async fn problem_error(&self, endpoint: &str, response: reqwest::Response) -> LedgerError {
        let status = response.status();
        let problem: Problem = response.json().await.unwrap_or_default();
        let title = if problem.title.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            problem.title
        };
        match problem.extras.and_then(|e| e.result_codes) {
            Some(codes) => LedgerError::Rejected {
                status: status.as_u16(),
                title,
                result_codes: codes.to_string(),
            },
            None => LedgerError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                title,
            },
        }
    }
}

fn asset_query(prefix: &str, asset: &Asset) -> Vec<(String, String)> {
    match asset {
        Asset::Native => vec![(format!("{}_asset_type", prefix), "native".to_string())],
        Asset::Credit { code, issuer } => {
            let asset_type = if code.len() <= 4 {
                "credit_alphanum4"
            } else {
                "credit_alphanum12"
            };
            vec![
                (format!("{}_asset_type", prefix), asset_type.to_string()),
                (format!("{}_asset_code", prefix), code.clone()),
                (format!("{}_asset_issuer", prefix), issuer.address()),
            ]
        }
    }
}

fn balance_from_record(record: BalanceRecord) -> Option<LedgerResult<Balance>> {
    let asset = match record.asset_type.as_str() {
        "native" => Asset::Native,
        "credit_alphanum4" | "credit_alphanum12" => {
            let (Some(code), Some(issuer)) = (record.asset_code, record.asset_issuer) else {
                return Some(Err(LedgerError::Decode(
                    "credit balance without code or issuer".to_string(),
                )));
            };
            let issuer = match PublicKey::from_address(&issuer) {
                Ok(issuer) => issuer,
                Err(e) => return Some(Err(LedgerError::Decode(format!("issuer {}: {}", issuer, e)))),
            };
            Asset::Credit { code, issuer }
        }
        // Liquidity pool shares cannot be held as a plain trustline
        _ => return None,
    };
    Some(Ok(Balance {
        asset,
        amount: record.balance,
    }))
}

impl TryFrom<AccountRecord> for AccountSnapshot {
    type Error = LedgerError;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        let account_id = PublicKey::from_address(&record.id)
            .map_err(|e| LedgerError::Decode(format!("account id {}: {}", record.id, e)))?;
        let sequence = record
            .sequence
            .parse::<i64>()
            .map_err(|e| LedgerError::Decode(format!("sequence {}: {}", record.sequence, e)))?;
        let balances = record
            .balances
            .into_iter()
            .filter_map(balance_from_record)
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok(AccountSnapshot {
            account_id,
            sequence,
            balances,
            signers: record
                .signers
                .into_iter()
                .map(|s| AccountSigner {
                    key: s.key,
                    weight: s.weight,
                })
                .collect(),
        })
    }
}

impl From<PriceLevelRecord> for PriceLevel {
    fn from(record: PriceLevelRecord) -> Self {
        PriceLevel {
            price: record.price,
            amount: record.amount,
        }
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    async fn account(&self, address: &PublicKey) -> LedgerResult<Option<AccountSnapshot>> {
        let endpoint = format!("{}/accounts/{}", self.base_url, address);
        debug!(endpoint = %endpoint, "Fetching account");
        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self.problem_error(&endpoint, response).await);
        }
        let record: AccountRecord = response
            .json()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;
        AccountSnapshot::try_from(record).map(Some)
    }

    async fn order_book(&self, selling: &Asset, buying: &Asset) -> LedgerResult<OrderBookSummary> {
        let endpoint = format!("{}/order_book", self.base_url);
        let mut query = asset_query("selling", selling);
        query.extend(asset_query("buying", buying));
        debug!(endpoint = %endpoint, selling = %selling, buying = %buying, "Fetching order book");

        let response = self
            .http
            .get(&endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;
        if !response.status().is_success() {
            return Err(self.problem_error(&endpoint, response).await);
        }
        let record: OrderBookRecord = response
            .json()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;
        Ok(OrderBookSummary {
            bids: record.bids.into_iter().map(PriceLevel::from).collect(),
            asks: record.asks.into_iter().map(PriceLevel::from).collect(),
        })
    }

    async fn next_sequence(&self, address: &PublicKey) -> LedgerResult<i64> {
        let account = self
            .account(address)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(address.address()))?;
        account
            .sequence
            .checked_add(1)
            .ok_or_else(|| LedgerError::Decode("sequence number overflow".to_string()))
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse> {
        let endpoint = format!("{}/transactions", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;

        if !response.status().is_success() {
            let err = self.problem_error(&endpoint, response).await;
            warn!(endpoint = %endpoint, error = %err, "Transaction submission failed");
            return Err(err);
        }
        let record: SubmitRecord = response
            .json()
            .await
            .map_err(|e| self.transport_error(e, &endpoint))?;
        Ok(SubmitResponse {
            hash: record.hash,
            ledger: record.ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    #[test]
    fn test_asset_query_params() {
        assert_eq!(
            asset_query("selling", &Asset::Native),
            vec![("selling_asset_type".to_string(), "native".to_string())]
        );

        let issuer = Keypair::from_seed_bytes(&[4u8; 32]).public_key();
        let long = Asset::credit("LONGCODE", issuer).unwrap();
        let params = asset_query("buying", &long);
        assert_eq!(params[0].1, "credit_alphanum12");
        assert_eq!(params[2].1, issuer.address());
    }

    #[test]
    fn test_account_record_conversion_skips_pool_shares() {
        let id = Keypair::from_seed_bytes(&[1u8; 32]).public_key();
        let issuer = Keypair::from_seed_bytes(&[2u8; 32]).public_key();
        let json = serde_json::json!({
            "id": id.address(),
            "sequence": "4294967296",
            "balances": [
                {"balance": "10.0000000", "asset_type": "native"},
                {"balance": "5.0000000", "asset_type": "credit_alphanum4",
                 "asset_code": "USD", "asset_issuer": issuer.address()},
                {"balance": "1.0000000", "asset_type": "liquidity_pool_shares"}
            ],
            "signers": [{"key": id.address(), "weight": 1, "type": "ed25519_public_key"}],
            "thresholds": {"low_threshold": 0, "med_threshold": 1, "high_threshold": 2}
        });
        let record: AccountRecord = serde_json::from_value(json).unwrap();
        let snapshot = AccountSnapshot::try_from(record).unwrap();
        assert_eq!(snapshot.sequence, 4_294_967_296);
        assert_eq!(snapshot.balances.len(), 2);
        assert_eq!(snapshot.additional_signers().count(), 0);
    }

    #[test]
    fn test_bad_sequence_is_decode_error() {
        let id = Keypair::from_seed_bytes(&[1u8; 32]).public_key();
        let record: AccountRecord = serde_json::from_value(serde_json::json!({
            "id": id.address(),
            "sequence": "not-a-number"
        }))
        .unwrap();
        assert!(matches!(
            AccountSnapshot::try_from(record),
            Err(LedgerError::Decode(_))
        ));
    }
}
