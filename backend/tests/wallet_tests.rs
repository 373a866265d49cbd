//! Customer wallet ledger tests
//!
//! Covers signed ledger deltas, ledger replay verification, and the
//! non-negative balance invariant.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{verify_ledger, WalletTransactionKind};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_deposit_is_positive_delta() {
        assert_eq!(
            WalletTransactionKind::Deposit.signed(dec("250")),
            dec("250")
        );
    }

    #[test]
    fn test_withdrawal_is_negative_delta() {
        assert_eq!(
            WalletTransactionKind::Withdrawal.signed(dec("250")),
            dec("-250")
        );
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            WalletTransactionKind::Deposit,
            WalletTransactionKind::Withdrawal,
        ] {
            assert_eq!(WalletTransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(WalletTransactionKind::parse("transfer"), None);
    }

    #[test]
    fn test_replay_consistent_ledger() {
        let entries = [
            (WalletTransactionKind::Deposit, dec("1000"), dec("1000")),
            (WalletTransactionKind::Withdrawal, dec("400"), dec("600")),
            (WalletTransactionKind::Withdrawal, dec("600"), dec("0")),
        ];
        assert_eq!(verify_ledger(Decimal::ZERO, &entries), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_replay_flags_first_bad_entry() {
        let entries = [
            (WalletTransactionKind::Deposit, dec("1000"), dec("1000")),
            // balance_after drifts by 10 here
            (WalletTransactionKind::Withdrawal, dec("400"), dec("590")),
            (WalletTransactionKind::Deposit, dec("10"), dec("600")),
        ];
        assert_eq!(verify_ledger(Decimal::ZERO, &entries), Err(1));
    }

    #[test]
    fn test_replay_with_opening_balance() {
        let entries = [(WalletTransactionKind::Withdrawal, dec("75"), dec("25"))];
        assert_eq!(verify_ledger(dec("100"), &entries), Ok(dec("25")));
    }

    #[test]
    fn test_empty_ledger_keeps_opening_balance() {
        assert_eq!(verify_ledger(dec("42"), &[]), Ok(dec("42")));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000).prop_map(|n| Decimal::new(n, 2))
    }

    fn kind_strategy() -> impl Strategy<Value = WalletTransactionKind> {
        prop_oneof![
            Just(WalletTransactionKind::Deposit),
            Just(WalletTransactionKind::Withdrawal),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A ledger built by applying signed deltas always replays cleanly
        #[test]
        fn honest_ledger_always_verifies(
            opening in amount_strategy(),
            movements in prop::collection::vec((kind_strategy(), amount_strategy()), 0..12),
        ) {
            let mut balance = opening;
            let entries: Vec<_> = movements
                .into_iter()
                .map(|(kind, amount)| {
                    balance += kind.signed(amount);
                    (kind, amount, balance)
                })
                .collect();

            prop_assert_eq!(verify_ledger(opening, &entries), Ok(balance));
        }

        /// Corrupting any single balance_after is detected at that index
        #[test]
        fn corrupted_entry_is_located(
            opening in amount_strategy(),
            movements in prop::collection::vec((kind_strategy(), amount_strategy()), 1..8),
            corrupt_at in 0usize..8,
        ) {
            prop_assume!(corrupt_at < movements.len());

            let mut balance = opening;
            let mut entries: Vec<_> = movements
                .into_iter()
                .map(|(kind, amount)| {
                    balance += kind.signed(amount);
                    (kind, amount, balance)
                })
                .collect();

            entries[corrupt_at].2 += dec("0.01");

            prop_assert_eq!(verify_ledger(opening, &entries), Err(corrupt_at));
        }

        /// Deposit then equal withdrawal is a no-op on the balance
        #[test]
        fn deposit_withdraw_round_trip(opening in amount_strategy(), amount in amount_strategy()) {
            let after_deposit = opening + WalletTransactionKind::Deposit.signed(amount);
            let entries = [
                (WalletTransactionKind::Deposit, amount, after_deposit),
                (WalletTransactionKind::Withdrawal, amount, opening),
            ];
            prop_assert_eq!(verify_ledger(opening, &entries), Ok(opening));
        }
    }
}
