//! XDR conversion and signing of transaction envelopes
//!
//! Drafts are converted to `stellar-xdr` types. The ledger identifies a
//! transaction by the SHA-256 of its `TransactionSignaturePayload`, which
//! binds the transaction to the network id. Each signature is an ed25519
//! signature over that hash, decorated with the last four bytes of the
//! signer's public key as a hint.

use crate::assets::Asset;
use crate::keys::{Keypair, PublicKey};
use crate::tx_builder::builder::TransactionDraft;
use crate::tx_builder::errors::EnvelopeError;
use crate::tx_builder::operations::{Operation, SetOptions};
use crate::tx_builder::output::{DecoratedSignature, SignedTransaction};
use crate::types::{Memo, Network};
use sha2::{Digest, Sha256};
use stellar_xdr::curr as xdr;
use stellar_xdr::curr::{Limits, WriteXdr};

fn encoding(what: &str, err: xdr::Error) -> EnvelopeError {
    EnvelopeError::Encoding(format!("{}: {}", what, err))
}

fn account_id(key: &PublicKey) -> xdr::AccountId {
    xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(
        *key.as_bytes(),
    )))
}

fn muxed_account(key: &PublicKey) -> xdr::MuxedAccount {
    xdr::MuxedAccount::Ed25519(xdr::Uint256(*key.as_bytes()))
}

fn padded_code<const N: usize>(code: &str) -> [u8; N] {
    let mut out = [0u8; N];
    out[..code.len()].copy_from_slice(code.as_bytes());
    out
}

fn xdr_asset(asset: &Asset) -> Result<xdr::Asset, EnvelopeError> {
    match asset {
        Asset::Native => Ok(xdr::Asset::Native),
        Asset::Credit { code, issuer } => match code.len() {
            1..=4 => Ok(xdr::Asset::CreditAlphanum4(xdr::AlphaNum4 {
                asset_code: xdr::AssetCode4(padded_code(code)),
                issuer: account_id(issuer),
            })),
            5..=12 => Ok(xdr::Asset::CreditAlphanum12(xdr::AlphaNum12 {
                asset_code: xdr::AssetCode12(padded_code(code)),
                issuer: account_id(issuer),
            })),
            _ => Err(EnvelopeError::invalid(format!(
                "asset code '{}' must be 1-12 characters",
                code
            ))),
        },
    }
}

fn trust_asset(asset: &Asset) -> Result<xdr::ChangeTrustAsset, EnvelopeError> {
    Ok(match xdr_asset(asset)? {
        xdr::Asset::Native => xdr::ChangeTrustAsset::Native,
        xdr::Asset::CreditAlphanum4(a) => xdr::ChangeTrustAsset::CreditAlphanum4(a),
        xdr::Asset::CreditAlphanum12(a) => xdr::ChangeTrustAsset::CreditAlphanum12(a),
    })
}

fn xdr_memo(memo: Option<&Memo>) -> Result<xdr::Memo, EnvelopeError> {
    Ok(match memo {
        None => xdr::Memo::None,
        Some(Memo::Text(text)) => xdr::Memo::Text(
            text.as_str()
                .try_into()
                .map_err(|_| EnvelopeError::invalid(format!("text memo '{}' is too long", text)))?,
        ),
        Some(Memo::Id(id)) => xdr::Memo::Id(*id),
        Some(Memo::Hash(hash)) => xdr::Memo::Hash(xdr::Hash(*hash)),
        Some(Memo::Return(hash)) => xdr::Memo::Return(xdr::Hash(*hash)),
    })
}

fn xdr_set_options(opts: &SetOptions) -> xdr::SetOptionsOp {
    xdr::SetOptionsOp {
        inflation_dest: None,
        clear_flags: None,
        set_flags: None,
        master_weight: opts.master_weight,
        low_threshold: opts.low_threshold,
        med_threshold: opts.med_threshold,
        high_threshold: opts.high_threshold,
        home_domain: None,
        signer: opts.signer.map(|s| xdr::Signer {
            key: xdr::SignerKey::Ed25519(xdr::Uint256(*s.key.as_bytes())),
            weight: s.weight,
        }),
    }
}

fn xdr_operation(op: &Operation) -> Result<xdr::Operation, EnvelopeError> {
    let body = match op {
        Operation::CreateAccount {
            destination,
            starting_balance,
        } => xdr::OperationBody::CreateAccount(xdr::CreateAccountOp {
            destination: account_id(destination),
            starting_balance: *starting_balance,
        }),
        Operation::Payment {
            destination,
            asset,
            amount,
        } => xdr::OperationBody::Payment(xdr::PaymentOp {
            destination: muxed_account(destination),
            asset: xdr_asset(asset)?,
            amount: *amount,
        }),
        Operation::ManageSellOffer {
            selling,
            buying,
            amount,
            price,
            offer_id,
        } => xdr::OperationBody::ManageSellOffer(xdr::ManageSellOfferOp {
            selling: xdr_asset(selling)?,
            buying: xdr_asset(buying)?,
            amount: *amount,
            price: xdr::Price {
                n: price.n,
                d: price.d,
            },
            offer_id: *offer_id,
        }),
        Operation::SetOptions(opts) => xdr::OperationBody::SetOptions(xdr_set_options(opts)),
        Operation::ChangeTrust { asset, limit } => {
            xdr::OperationBody::ChangeTrust(xdr::ChangeTrustOp {
                line: trust_asset(asset)?,
                limit: *limit,
            })
        }
        Operation::ManageData { name, value } => {
            let data_name = xdr::String64(
                name.as_str()
                    .try_into()
                    .map_err(|_| EnvelopeError::invalid(format!("data name '{}' is too long", name)))?,
            );
            let data_value = value
                .as_ref()
                .map(|bytes| {
                    bytes
                        .clone()
                        .try_into()
                        .map(xdr::DataValue)
                        .map_err(|_| EnvelopeError::invalid(format!("data value for '{}' is too long", name)))
                })
                .transpose()?;
            xdr::OperationBody::ManageData(xdr::ManageDataOp {
                data_name,
                data_value,
            })
        }
    };
    Ok(xdr::Operation {
        source_account: None,
        body,
    })
}

/// Ledger representation of the draft's transaction body
pub fn to_xdr_transaction(draft: &TransactionDraft) -> Result<xdr::Transaction, EnvelopeError> {
    let operations: xdr::VecM<xdr::Operation, 100> = draft
        .operations
        .iter()
        .map(xdr_operation)
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|e| encoding("operations", e))?;

    Ok(xdr::Transaction {
        source_account: muxed_account(&draft.source),
        fee: draft.fee,
        seq_num: xdr::SequenceNumber(draft.sequence),
        cond: xdr::Preconditions::None,
        memo: xdr_memo(draft.memo.as_ref())?,
        operations,
        ext: xdr::TransactionExt::V0,
    })
}

/// XDR of the `Transaction` body
pub fn encode_transaction(draft: &TransactionDraft) -> Result<Vec<u8>, EnvelopeError> {
    to_xdr_transaction(draft)?
        .to_xdr(Limits::none())
        .map_err(|e| encoding("transaction", e))
}

/// SHA-256 of the network passphrase
pub fn network_id(network: Network) -> [u8; 32] {
    Sha256::digest(network.passphrase().as_bytes()).into()
}

/// Hash that every signer signs
pub fn signature_payload(
    network: Network,
    tx: &xdr::Transaction,
) -> Result<[u8; 32], EnvelopeError> {
    let payload = xdr::TransactionSignaturePayload {
        network_id: xdr::Hash(network_id(network)),
        tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let bytes = payload
        .to_xdr(Limits::none())
        .map_err(|e| encoding("signature payload", e))?;
    Ok(Sha256::digest(bytes).into())
}

/// Sign `draft` with the source account's key
pub fn sign(draft: TransactionDraft, keypair: &Keypair) -> Result<SignedTransaction, EnvelopeError> {
    let signer = keypair.public_key();
    if signer != draft.source {
        return Err(EnvelopeError::Signing(format!(
            "key {} does not match source account {}",
            signer, draft.source
        )));
    }
    let tx = to_xdr_transaction(&draft)?;
    let hash = signature_payload(draft.network, &tx)?;
    let signature = DecoratedSignature {
        hint: signer.signature_hint(),
        signature: keypair.sign(&hash),
    };
    Ok(SignedTransaction::new(draft, tx, hash, vec![signature]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Price;
    use crate::tx_builder::builder::TxBuilder;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use stellar_xdr::curr::ReadXdr;

    fn keypair(n: u8) -> Keypair {
        Keypair::from_seed_bytes(&[n; 32])
    }

    fn payment_draft(memo: Option<Memo>) -> TransactionDraft {
        let mut builder = TxBuilder::new(keypair(1).public_key()).memo(memo);
        builder.push(Operation::transfer(keypair(2).public_key(), Asset::Native, 10, true).unwrap());
        builder.build(7, 100, Network::Test).unwrap()
    }

    #[test]
    fn test_transaction_fields() {
        let tx = to_xdr_transaction(&payment_draft(Some(Memo::Id(42)))).unwrap();
        assert_eq!(tx.fee, 100);
        assert_eq!(tx.seq_num, xdr::SequenceNumber(7));
        assert_eq!(tx.memo, xdr::Memo::Id(42));
        assert_eq!(
            tx.source_account,
            xdr::MuxedAccount::Ed25519(xdr::Uint256(*keypair(1).public_key().as_bytes()))
        );
        assert_eq!(tx.operations.len(), 1);
    }

    #[test]
    fn test_credit_asset_codes_padded() {
        let issuer = keypair(3).public_key();
        match xdr_asset(&Asset::credit("USD", issuer).unwrap()).unwrap() {
            xdr::Asset::CreditAlphanum4(a) => assert_eq!(a.asset_code.0, *b"USD\0"),
            other => panic!("unexpected {:?}", other),
        }
        match xdr_asset(&Asset::credit("LONGCODE", issuer).unwrap()).unwrap() {
            xdr::Asset::CreditAlphanum12(a) => assert_eq!(&a.asset_code.0[..9], b"LONGCODE\0"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_signature_verifies_against_payload() {
        let draft = payment_draft(Some(Memo::Text("rent".into())));
        let signed = sign(draft, &keypair(1)).unwrap();

        let tx = to_xdr_transaction(signed.draft()).unwrap();
        let payload = signature_payload(Network::Test, &tx).unwrap();
        assert_eq!(signed.hash(), &payload);

        let vk = VerifyingKey::from_bytes(keypair(1).public_key().as_bytes()).unwrap();
        let sig = Signature::from_bytes(&signed.signatures()[0].signature);
        assert!(vk.verify(&payload, &sig).is_ok());
    }

    #[test]
    fn test_network_changes_payload() {
        let tx = to_xdr_transaction(&payment_draft(None)).unwrap();
        assert_ne!(
            signature_payload(Network::Test, &tx).unwrap(),
            signature_payload(Network::Public, &tx).unwrap()
        );
    }

    #[test]
    fn test_wrong_key_refused() {
        let err = sign(payment_draft(None), &keypair(9)).unwrap_err();
        assert!(matches!(err, EnvelopeError::Signing(_)));
    }

    #[test]
    fn test_envelope_decodes_back() {
        let usd = Asset::credit("USD", keypair(3).public_key()).unwrap();
        let mut builder = TxBuilder::new(keypair(1).public_key()).memo(Some(Memo::Text("rent".into())));
        builder
            .push(Operation::trust(usd.clone()).unwrap())
            .push(Operation::transfer(keypair(2).public_key(), usd.clone(), 50, true).unwrap())
            .push(Operation::transfer(keypair(5).public_key(), Asset::Native, 10, false).unwrap())
            .push(Operation::add_signer(keypair(4).public_key(), 1))
            .push(Operation::set_weights(2).unwrap())
            .push(Operation::manage_data("note", b"hi".to_vec()).unwrap())
            .push(Operation::manage_data("old", Vec::new()).unwrap())
            .push(Operation::sell_offer(
                Asset::Native,
                usd,
                50,
                Price { n: 1, d: 2 },
            ));
        let draft = builder.build(1, 100, Network::Public).unwrap();
        let signed = sign(draft, &keypair(1)).unwrap();

        let decoded =
            xdr::TransactionEnvelope::from_xdr_base64(signed.to_base64().unwrap(), Limits::none())
                .unwrap();
        let xdr::TransactionEnvelope::Tx(envelope) = decoded else {
            panic!("expected a v1 envelope");
        };
        assert_eq!(envelope.tx, to_xdr_transaction(signed.draft()).unwrap());
        assert_eq!(envelope.tx.fee, 800);
        assert_eq!(envelope.signatures.len(), 1);
        assert_eq!(
            envelope.signatures[0].hint.0,
            keypair(1).public_key().signature_hint()
        );
        assert!(matches!(
            envelope.tx.operations[6].body,
            xdr::OperationBody::ManageData(xdr::ManageDataOp { data_value: None, .. })
        ));

        // Re-hashing the decoded body reproduces the signed hash
        assert_eq!(
            &signature_payload(Network::Public, &envelope.tx).unwrap(),
            signed.hash()
        );
    }
}
