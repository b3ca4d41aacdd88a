//! Offer pricing
//!
//! Buy and sell statements both become a sell offer of the `selling` asset,
//! so both read the bid side of the (selling, buying) book: bids are the
//! standing offers that buy `selling` with `buying`. Prices are expressed in
//! units of `buying` per unit of `selling`.

use crate::amount::{parse_amount, truncate, Price};
use crate::assets::Asset;
use crate::errors::RequestError;
use crate::ledger::{LedgerClient, OrderBookSummary};
use crate::types::{AmountKind, OfferRequest};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Final offer parameters, amount denominated in the selling asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferTerms {
    pub amount: Decimal,
    pub price: Price,
    /// Price as quoted (book level or operator input), for summaries
    pub quoted_price: String,
    pub discovered: bool,
}

/// Best bid of the book, `NoLiquidity` when there is none
pub fn best_bid(
    book: &OrderBookSummary,
    selling: &Asset,
    buying: &Asset,
) -> Result<Decimal, RequestError> {
    let top = book.bids.first().ok_or_else(|| RequestError::NoLiquidity {
        selling: selling.code().to_string(),
        buying: buying.code().to_string(),
    })?;
    let price = Decimal::from_str(top.price.trim()).map_err(|e| {
        RequestError::Parse(format!("order book price '{}': {}", top.price, e))
    })?;
    if price <= Decimal::ZERO {
        return Err(RequestError::InvalidOperation(format!(
            "order book price {} is not positive",
            price
        )));
    }
    Ok(price)
}

/// Convert a buying-denominated amount at a discovered price
pub fn selling_amount(
    amount: Decimal,
    kind: AmountKind,
    price: Decimal,
    discovered: bool,
) -> Result<Decimal, RequestError> {
    match kind {
        AmountKind::Buying if discovered => amount.checked_div(price).map(truncate).ok_or_else(|| {
            RequestError::InvalidOperation(format!(
                "amount {} at price {} is out of range",
                amount, price
            ))
        }),
        _ => Ok(truncate(amount)),
    }
}

/// Resolve amount and price of an offer, querying the order book when the
/// statement carries no price
pub async fn price_offer(
    ledger: &dyn LedgerClient,
    req: &OfferRequest,
    selling: &Asset,
    buying: &Asset,
) -> Result<OfferTerms, RequestError> {
    let amount = parse_amount(&req.amount)?;

    let (price, quoted_price, discovered) = match &req.price {
        Some(text) => {
            let value = parse_amount(text)?;
            if value.is_zero() {
                return Err(RequestError::InvalidOperation("price must be positive".into()));
            }
            (value, text.trim().to_string(), false)
        }
        None => {
            let book = ledger.order_book(selling, buying).await?;
            let price = best_bid(&book, selling, buying)?;
            debug!(
                selling = %selling,
                buying = %buying,
                price = %price,
                levels = book.bids.len(),
                "Price discovered from order book"
            );
            (price, price.normalize().to_string(), true)
        }
    };

    Ok(OfferTerms {
        amount: selling_amount(amount, req.amount_kind, price, discovered)?,
        price: Price::from_decimal(price)?,
        quoted_price,
        discovered,
    })
}
