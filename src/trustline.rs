//! Trustline checks

use crate::assets::Asset;
use crate::ledger::AccountSnapshot;

/// Whether `account` can hold `asset`.
///
/// The native asset is always held, even by an account that does not exist
/// yet. A credit asset needs a balance entry with the same code and issuer.
pub fn has_trustline(account: Option<&AccountSnapshot>, asset: &Asset) -> bool {
    match asset {
        Asset::Native => true,
        Asset::Credit { .. } => account
            .map(|acc| acc.balances.iter().any(|b| &b.asset == asset))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Keypair, PublicKey};
    use crate::ledger::Balance;
    use proptest::prelude::*;

    fn key(n: u8) -> PublicKey {
        Keypair::from_seed_bytes(&[n; 32]).public_key()
    }

    #[test]
    fn test_exact_code_and_issuer_match() {
        let mut account = AccountSnapshot::new(key(1), 10);
        let usd = Asset::credit("USD", key(2)).unwrap();
        account.balances.push(Balance {
            asset: usd.clone(),
            amount: "1.0000000".into(),
        });

        assert!(has_trustline(Some(&account), &usd));
        // Same code, other issuer
        assert!(!has_trustline(
            Some(&account),
            &Asset::credit("USD", key(3)).unwrap()
        ));
        // Same issuer, other code
        assert!(!has_trustline(
            Some(&account),
            &Asset::credit("EUR", key(2)).unwrap()
        ));
        assert!(!has_trustline(None, &usd));
    }

    proptest! {
        #[test]
        fn prop_native_always_trusted(seed in any::<u8>(), funded in any::<bool>(), credits in 0usize..4) {
            let mut account = AccountSnapshot::new(key(seed), 1);
            account.balances.clear();
            for i in 0..credits {
                account.balances.push(Balance {
                    asset: Asset::credit("TOK", key(i as u8)).unwrap(),
                    amount: "0".into(),
                });
            }
            let snapshot = if funded { Some(&account) } else { None };
            prop_assert!(has_trustline(snapshot, &Asset::Native));
        }
    }
}
