//! Test Utilities Module
//!
//! Deterministic stand-ins for the engine's collaborators: an in-memory
//! ledger that counts submissions and a selector that replays scripted
//! answers.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::assets::Asset;
use crate::errors::RequestError;
use crate::keys::PublicKey;
use crate::ledger::{
    AccountSnapshot, LedgerClient, LedgerError, LedgerResult, OrderBookSummary, SubmitResponse,
};
use crate::selector::{Choice, Selector};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory ledger
///
/// Accounts and order books are seeded by the test. Submissions are recorded
/// and counted so tests can assert that nothing reached the network.
#[derive(Clone, Default)]
pub struct MockLedger {
    accounts: Arc<Mutex<HashMap<PublicKey, AccountSnapshot>>>,
    books: Arc<Mutex<Vec<(Asset, Asset, OrderBookSummary)>>>,
    submitted: Arc<Mutex<Vec<String>>>,
    /// Problem title and result codes returned by every submission
    rejection: Option<(String, String)>,
    offline: bool,
    account_lookups: Arc<AtomicUsize>,
    book_lookups: Arc<AtomicUsize>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that rejects every submission with the given problem
    pub fn rejecting(title: &str, result_codes: &str) -> Self {
        Self {
            rejection: Some((title.to_string(), result_codes.to_string())),
            ..Self::default()
        }
    }

    /// Ledger whose every call fails at the transport level
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub async fn add_account(&self, snapshot: AccountSnapshot) {
        self.accounts
            .lock()
            .await
            .insert(snapshot.account_id, snapshot);
    }

    pub async fn set_order_book(&self, selling: Asset, buying: Asset, book: OrderBookSummary) {
        let mut books = self.books.lock().await;
        books.retain(|(s, b, _)| !(s == &selling && b == &buying));
        books.push((selling, buying, book));
    }

    pub async fn submit_count(&self) -> usize {
        self.submitted.lock().await.len()
    }

    /// Base64 envelopes in submission order
    pub async fn submitted(&self) -> Vec<String> {
        self.submitted.lock().await.clone()
    }

    pub fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::SeqCst)
    }

    pub fn book_lookups(&self) -> usize {
        self.book_lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline {
            return Err(LedgerError::Transport("mock ledger is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn account(&self, address: &PublicKey) -> LedgerResult<Option<AccountSnapshot>> {
        self.check_online()?;
        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().await.get(address).cloned())
    }

    async fn order_book(&self, selling: &Asset, buying: &Asset) -> LedgerResult<OrderBookSummary> {
        self.check_online()?;
        self.book_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .books
            .lock()
            .await
            .iter()
            .find(|(s, b, _)| s == selling && b == buying)
            .map(|(_, _, book)| book.clone())
            .unwrap_or_default())
    }

    async fn next_sequence(&self, address: &PublicKey) -> LedgerResult<i64> {
        self.check_online()?;
        self.accounts
            .lock()
            .await
            .get(address)
            .map(|acc| acc.sequence + 1)
            .ok_or_else(|| LedgerError::AccountNotFound(address.address()))
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse> {
        self.check_online()?;
        if let Some((title, result_codes)) = &self.rejection {
            return Err(LedgerError::Rejected {
                status: 400,
                title: title.clone(),
                result_codes: result_codes.clone(),
            });
        }
        let mut submitted = self.submitted.lock().await;
        submitted.push(envelope_xdr.to_string());
        Ok(SubmitResponse {
            hash: hex::encode(Sha256::digest(envelope_xdr.as_bytes())),
            ledger: Some(1000 + submitted.len() as u32),
        })
    }
}

/// Selector that replays queued answers
///
/// `select` and `select_or_address` pop choices in order; running out of
/// choices is a `Selection` error. `confirm` answers with the configured
/// value (yes by default).
#[derive(Default)]
pub struct ScriptedSelector {
    choices: SyncMutex<VecDeque<Choice>>,
    confirm_answer: Option<bool>,
    select_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    presented: SyncMutex<Vec<String>>,
}

impl ScriptedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choice(self, idx: usize) -> Self {
        self.choices.lock().push_back(Choice::Index(idx));
        self
    }

    pub fn with_address(self, address: &str) -> Self {
        self.choices
            .lock()
            .push_back(Choice::Input(address.to_string()));
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirm_answer = Some(answer);
        self
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    /// Summaries shown to the operator
    pub fn presented(&self) -> Vec<String> {
        self.presented.lock().clone()
    }

    fn next_choice(&self, label: &str) -> Result<Choice, RequestError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.choices
            .lock()
            .pop_front()
            .ok_or_else(|| RequestError::Selection(format!("{}: no scripted choice", label)))
    }
}

impl Selector for ScriptedSelector {
    fn select(&self, label: &str, items: &[String]) -> Result<usize, RequestError> {
        match self.next_choice(label)? {
            Choice::Index(idx) if idx < items.len() => Ok(idx),
            Choice::Index(idx) => Err(RequestError::Selection(format!(
                "{}: scripted choice {} out of {} items",
                label,
                idx,
                items.len()
            ))),
            Choice::Input(_) => Err(RequestError::Selection(format!(
                "{}: free input not accepted",
                label
            ))),
        }
    }

    fn select_or_address(&self, label: &str, _items: &[String]) -> Result<Choice, RequestError> {
        self.next_choice(label)
    }

    fn confirm(&self, _label: &str) -> Result<bool, RequestError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.confirm_answer.unwrap_or(true))
    }

    fn present(&self, summary: &str) {
        self.presented.lock().push(summary.to_string());
    }
}
