//! Customer wallet ledger models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a wallet ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletTransactionKind {
    Deposit,
    Withdrawal,
}

impl WalletTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletTransactionKind::Deposit => "deposit",
            WalletTransactionKind::Withdrawal => "withdrawal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(WalletTransactionKind::Deposit),
            "withdrawal" => Some(WalletTransactionKind::Withdrawal),
            _ => None,
        }
    }

    /// Signed delta this entry applies to the balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            WalletTransactionKind::Deposit => amount,
            WalletTransactionKind::Withdrawal => -amount,
        }
    }
}

/// Replay a ledger and confirm each entry's `balance_after` is consistent
/// with the running balance. Returns the final balance, or the index of the
/// first inconsistent entry.
pub fn verify_ledger(
    opening_balance: Decimal,
    entries: &[(WalletTransactionKind, Decimal, Decimal)],
) -> Result<Decimal, usize> {
    let mut balance = opening_balance;
    for (i, (kind, amount, balance_after)) in entries.iter().enumerate() {
        balance += kind.signed(*amount);
        if balance != *balance_after {
            return Err(i);
        }
    }
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(
            WalletTransactionKind::Deposit.signed(dec("100")),
            dec("100")
        );
        assert_eq!(
            WalletTransactionKind::Withdrawal.signed(dec("100")),
            dec("-100")
        );
    }

    #[test]
    fn test_verify_consistent_ledger() {
        let entries = [
            (WalletTransactionKind::Deposit, dec("1000"), dec("1000")),
            (WalletTransactionKind::Withdrawal, dec("250"), dec("750")),
            (WalletTransactionKind::Deposit, dec("50"), dec("800")),
        ];
        assert_eq!(verify_ledger(Decimal::ZERO, &entries), Ok(dec("800")));
    }

    #[test]
    fn test_verify_detects_inconsistency() {
        let entries = [
            (WalletTransactionKind::Deposit, dec("1000"), dec("1000")),
            (WalletTransactionKind::Withdrawal, dec("250"), dec("700")),
        ];
        assert_eq!(verify_ledger(Decimal::ZERO, &entries), Err(1));
    }
}
