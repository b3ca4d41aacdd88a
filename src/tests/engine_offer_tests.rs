//! Offer statement tests
//!
//! Price discovery from the bid side, amount conversion and asset
//! disambiguation.

use super::test_helpers::*;
use crate::amount::Price;
use crate::assets::Asset;
use crate::errors::RequestError;
use crate::ledger::{OrderBookSummary, PriceLevel};
use crate::selector::PolicySelector;
use crate::structured_logging::RequestContext;
use crate::test_utils::ScriptedSelector;
use crate::tx_builder::Operation;
use crate::types::{AmountKind, OfferKind, OfferRequest, Statement};

fn offer(
    kind: OfferKind,
    buying: &str,
    selling: &str,
    amount: &str,
    amount_kind: AmountKind,
    price: Option<&str>,
) -> Statement {
    Statement::Offer(OfferRequest {
        kind,
        account: Some("master".to_string()),
        buying: buying.to_string(),
        selling: selling.to_string(),
        amount: amount.to_string(),
        amount_kind,
        price: price.map(str::to_string),
    })
}

fn bids(prices: &[&str]) -> OrderBookSummary {
    OrderBookSummary {
        bids: prices
            .iter()
            .map(|p| PriceLevel {
                price: p.to_string(),
                amount: "500.0000000".to_string(),
            })
            .collect(),
        asks: Vec::new(),
    }
}

#[tokio::test]
async fn test_buy_amount_converted_at_best_bid() {
    let fx = Fixture::new().await;
    fx.ledger
        .set_order_book(Asset::Native, usd(), bids(&["0.5", "0.45"]))
        .await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    // buy 100 USD using XLM
    let assembled = engine
        .assemble(
            &offer(OfferKind::Buy, "USD", "XLM", "100", AmountKind::Buying, None),
            &RequestContext::new("test"),
        )
        .await
        .unwrap();

    assert_eq!(
        assembled.builder.operations(),
        &[Operation::ManageSellOffer {
            selling: Asset::Native,
            buying: usd(),
            amount: 2_000_000_000,
            price: Price { n: 1, d: 2 },
            offer_id: 0,
        }]
    );
    assert!(assembled
        .summary
        .rows()
        .any(|(f, v)| f == "Amount" && v == "100 USD = 200.0000000 XLM"));
    assert_eq!(fx.ledger.book_lookups(), 1);
}

#[tokio::test]
async fn test_sell_reads_bids_without_conversion() {
    let fx = Fixture::new().await;
    fx.ledger
        .set_order_book(usd(), Asset::Native, bids(&["4"]))
        .await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    // sell 100 USD for XLM
    let assembled = engine
        .assemble(
            &offer(OfferKind::Sell, "XLM", "USD", "100", AmountKind::Selling, None),
            &RequestContext::new("test"),
        )
        .await
        .unwrap();

    assert!(matches!(
        &assembled.builder.operations()[0],
        Operation::ManageSellOffer { amount: 1_000_000_000, price: Price { n: 4, d: 1 }, .. }
    ));
}

#[tokio::test]
async fn test_empty_book_no_liquidity() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&offer(OfferKind::Buy, "USD", "XLM", "100", AmountKind::Buying, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::NoLiquidity { .. }));
    assert_eq!(fx.ledger.submit_count().await, 0);
}

#[tokio::test]
async fn test_oversized_buy_amount_rejected() {
    let fx = Fixture::new().await;
    fx.ledger
        .set_order_book(Asset::Native, usd(), bids(&["0.5"]))
        .await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&offer(
            OfferKind::Buy,
            "USD",
            "XLM",
            "79228162514264337593543950335",
            AmountKind::Buying,
            None,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidOperation(_)));
    assert_eq!(fx.ledger.submit_count().await, 0);
}

#[tokio::test]
async fn test_explicit_price_skips_book() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let assembled = engine
        .assemble(
            &offer(OfferKind::Buy, "USD", "XLM", "100", AmountKind::Buying, Some("0.25")),
            &RequestContext::new("test"),
        )
        .await
        .unwrap();

    assert!(matches!(
        &assembled.builder.operations()[0],
        Operation::ManageSellOffer { amount: 1_000_000_000, price: Price { n: 1, d: 4 }, .. }
    ));
    assert_eq!(fx.ledger.book_lookups(), 0);
}

#[tokio::test]
async fn test_ambiguous_asset_is_disambiguated() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new().with_choice(1);
    let engine = fx.engine(&selector, test_config());

    let assembled = engine
        .assemble(
            &offer(OfferKind::Buy, "EUR", "XLM", "10", AmountKind::Buying, Some("1")),
            &RequestContext::new("test"),
        )
        .await
        .unwrap();
    assert!(matches!(
        &assembled.builder.operations()[0],
        Operation::ManageSellOffer { buying, .. } if buying == &eur(EUR_ISSUER_B)
    ));
    assert_eq!(selector.select_calls(), 1);

    let policy = PolicySelector::new(true);
    let engine = fx.engine(&policy, test_config());
    let err = engine
        .execute(&offer(OfferKind::Buy, "EUR", "XLM", "10", AmountKind::Buying, Some("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Selection(_)));
}

#[tokio::test]
async fn test_unknown_asset_unsupported() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&offer(OfferKind::Buy, "DOGE", "XLM", "10", AmountKind::Buying, None))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "asset DOGE is not supported right now");
}

#[tokio::test]
async fn test_same_asset_rejected() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&offer(OfferKind::Sell, "XLM", "lumens", "10", AmountKind::Selling, Some("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_offer_submits() {
    let fx = Fixture::new().await;
    fx.ledger
        .set_order_book(Asset::Native, usd(), bids(&["0.5"]))
        .await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let result = engine
        .execute(&offer(OfferKind::Buy, "USD", "XLM", "100", AmountKind::Buying, None))
        .await
        .unwrap();
    assert_eq!(result.ledger, Some(1001));
    assert_eq!(fx.ledger.submit_count().await, 1);
}
