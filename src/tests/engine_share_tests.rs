//! ShareAccount statement tests

use super::test_helpers::*;
use crate::engine::share_threshold;
use crate::errors::RequestError;
use crate::ledger::AccountSigner;
use crate::structured_logging::RequestContext;
use crate::test_utils::ScriptedSelector;
use crate::tx_builder::{Operation, SetOptions, SignerWeight};
use crate::types::{ShareAccountRequest, Statement};

fn share(account: &str, signers: &[&str]) -> Statement {
    Statement::ShareAccount(ShareAccountRequest {
        account: account.to_string(),
        additional_signers: signers.iter().map(|s| s.to_string()).collect(),
    })
}

#[tokio::test]
async fn test_two_new_signers_threshold_three() {
    let fx = Fixture::new().await;
    fx.ledger.add_account(funded(SAVINGS, 1, &[])).await;
    fx.ledger.add_account(funded(BOB, 1, &[])).await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let assembled = engine
        .assemble(
            &share("master", &["savings", "bob"]),
            &RequestContext::new("test"),
        )
        .await
        .unwrap();

    assert_eq!(
        assembled.builder.operations(),
        &[
            Operation::add_signer(key(SAVINGS), 1),
            Operation::add_signer(key(BOB), 1),
            Operation::SetOptions(SetOptions {
                master_weight: Some(3),
                low_threshold: Some(3),
                med_threshold: Some(3),
                high_threshold: Some(3),
                signer: None,
            }),
        ]
    );
    assert_eq!(share_threshold(2, 0), 3);
}

#[tokio::test]
async fn test_existing_signers_count_toward_threshold() {
    let fx = Fixture::new().await;
    let mut master = funded(MASTER, 100, &[]);
    master.signers.push(AccountSigner {
        key: key(JENNIFER).address(),
        weight: 1,
    });
    fx.ledger.add_account(master).await;
    fx.ledger.add_account(funded(BOB, 1, &[])).await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let assembled = engine
        .assemble(&share("master", &["bob"]), &RequestContext::new("test"))
        .await
        .unwrap();

    match assembled.builder.operations().last() {
        Some(Operation::SetOptions(opts)) => assert_eq!(opts.master_weight, Some(3)),
        other => panic!("unexpected last operation {:?}", other),
    }
    assert!(matches!(
        assembled.builder.operations()[0],
        Operation::SetOptions(SetOptions {
            signer: Some(SignerWeight { weight: 1, .. }),
            ..
        })
    ));
}

#[tokio::test]
async fn test_existing_signer_cannot_be_added_again() {
    let fx = Fixture::new().await;
    let mut master = funded(MASTER, 100, &[]);
    master.signers.push(AccountSigner {
        key: key(BOB).address(),
        weight: 1,
    });
    fx.ledger.add_account(master).await;
    fx.ledger.add_account(funded(BOB, 1, &[])).await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine.execute(&share("master", &["bob"])).await.unwrap_err();
    assert!(matches!(err, RequestError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_unfunded_signer() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&share("master", &["jennifer"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::SignerNotFunded(ref name) if name == "jennifer"));
    assert_eq!(fx.ledger.submit_count().await, 0);
}

#[tokio::test]
async fn test_unfunded_account() {
    let fx = Fixture::new().await;
    fx.ledger.add_account(funded(BOB, 1, &[])).await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&share("savings", &["bob"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::SourceNotFunded(_)));
}

#[tokio::test]
async fn test_account_must_be_local_wallet() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine.execute(&share("bob", &["master"])).await.unwrap_err();
    assert!(matches!(err, RequestError::NotFound { what: "wallet", .. }));
}

#[tokio::test]
async fn test_unknown_signer_not_found() {
    let fx = Fixture::new().await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    let err = engine
        .execute(&share("master", &["mallory"]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "signer 'mallory' not found");
}

#[tokio::test]
async fn test_share_submits() {
    let fx = Fixture::new().await;
    fx.ledger.add_account(funded(SAVINGS, 1, &[])).await;
    let selector = ScriptedSelector::new();
    let engine = fx.engine(&selector, test_config());

    engine
        .execute(&share("master", &["savings"]))
        .await
        .unwrap();
    assert_eq!(fx.ledger.submit_count().await, 1);
}
