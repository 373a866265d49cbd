//! Refund computation tests
//!
//! Covers refund amount precedence (custom override, selected lines, full
//! total), amount bounds against the original sale, and receipt numbering.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{
    compute_refund_amount, generate_receipt_number, refund_amount_is_valid, RefundKind, RefundLine,
};
use shared::validation::validate_receipt_number;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn refund_line(sold: i32, price: &str, refund: i32) -> RefundLine {
    RefundLine {
        sold_quantity: sold,
        unit_price: dec(price),
        refund_quantity: refund,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_full_refund_returns_sale_total() {
        let amount = compute_refund_amount(RefundKind::Full, dec("50000"), &[], None);
        assert_eq!(amount, dec("50000"));
        assert!(refund_amount_is_valid(amount, dec("50000")));
    }

    #[test]
    fn test_item_refund_uses_sale_time_prices() {
        // Two of three sold at 1000, one of one sold at 2000
        let lines = [refund_line(3, "1000", 2), refund_line(1, "2000", 1)];
        let amount = compute_refund_amount(RefundKind::Items, dec("5000"), &lines, None);
        assert_eq!(amount, dec("4000"));
    }

    #[test]
    fn test_custom_amount_wins_over_line_sum() {
        let lines = [refund_line(2, "1000", 2)];
        let amount =
            compute_refund_amount(RefundKind::Custom, dec("2000"), &lines, Some(dec("500")));
        assert_eq!(amount, dec("500"));
    }

    #[test]
    fn test_custom_without_amount_falls_back_to_lines() {
        let lines = [refund_line(2, "1000", 1)];
        let amount = compute_refund_amount(RefundKind::Custom, dec("2000"), &lines, None);
        assert_eq!(amount, dec("1000"));
    }

    #[test]
    fn test_zero_refund_rejected() {
        assert!(!refund_amount_is_valid(Decimal::ZERO, dec("100")));
    }

    #[test]
    fn test_refund_equal_to_total_allowed() {
        assert!(refund_amount_is_valid(dec("100"), dec("100")));
    }

    #[test]
    fn test_refund_over_total_rejected() {
        assert!(!refund_amount_is_valid(dec("100.01"), dec("100")));
    }

    #[test]
    fn test_receipt_number_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        let receipt = generate_receipt_number(date, 7);
        assert_eq!(receipt, "RCP-20250825-0007");
        assert!(validate_receipt_number(&receipt).is_ok());
    }

    #[test]
    fn test_receipt_sequence_grows_past_four_digits() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        // Busy days run past 9999; the number widens rather than wrapping
        let receipt = generate_receipt_number(date, 10000);
        assert_eq!(receipt, "RCP-20250825-10000");
        assert!(validate_receipt_number(&receipt).is_ok());
    }

    #[test]
    fn test_caller_supplied_receipt_numbers_are_checked() {
        // A pre-printed receipt book entry is accepted as-is
        assert!(validate_receipt_number("RCP-20250825-0042").is_ok());
        // Free-form strings are not
        assert!(validate_receipt_number("receipt-42").is_err());
        assert!(validate_receipt_number("RCP-20250825-42").is_err());
        assert!(validate_receipt_number("RCP-20250825-42A0").is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Prices in whole cents, 0.01 to 1000.00
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000).prop_map(|n| Decimal::new(n, 2))
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<RefundLine>> {
        prop::collection::vec(
            (1i32..=20, price_strategy()).prop_flat_map(|(sold, price)| {
                (1..=sold).prop_map(move |refund| RefundLine {
                    sold_quantity: sold,
                    unit_price: price,
                    refund_quantity: refund,
                })
            }),
            1..6,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A full refund is always exactly the sale total
        #[test]
        fn full_refund_is_total(total in price_strategy()) {
            let amount = compute_refund_amount(RefundKind::Full, total, &[], None);
            prop_assert_eq!(amount, total);
        }

        /// Refunding every sold unit of every line equals the line-value sum
        #[test]
        fn item_refund_sums_lines(lines in lines_strategy()) {
            let expected: Decimal = lines
                .iter()
                .map(|l| l.unit_price * Decimal::from(l.refund_quantity))
                .sum();
            let amount = compute_refund_amount(RefundKind::Items, expected, &lines, None);
            prop_assert_eq!(amount, expected);
        }

        /// A custom override is returned verbatim regardless of the lines
        #[test]
        fn custom_override_ignores_lines(lines in lines_strategy(), custom in price_strategy()) {
            let amount =
                compute_refund_amount(RefundKind::Custom, dec("999999"), &lines, Some(custom));
            prop_assert_eq!(amount, custom);
        }

        /// The validity bound accepts exactly 0 < amount <= total
        #[test]
        fn bounds_accept_only_positive_up_to_total(
            amount in 0i64..=200000,
            total in 1i64..=100000,
        ) {
            let amount = Decimal::new(amount, 2);
            let total = Decimal::new(total, 2);
            let expected = amount > Decimal::ZERO && amount <= total;
            prop_assert_eq!(refund_amount_is_valid(amount, total), expected);
        }

        /// Generated receipt numbers always validate, widened sequences included
        #[test]
        fn generated_receipts_validate(days in 0i64..=3650, seq in 1i64..=99999) {
            let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                + chrono::Duration::days(days);
            let receipt = generate_receipt_number(date, seq);
            prop_assert!(validate_receipt_number(&receipt).is_ok());
        }

        /// Distinct daily sequences never produce the same receipt number, so
        /// a concurrent collision can only come from an identical sequence and
        /// is caught by the unique index
        #[test]
        fn receipt_numbers_distinct_per_sequence(
            seq_a in 1i64..=99999,
            seq_b in 1i64..=99999,
        ) {
            prop_assume!(seq_a != seq_b);
            let date = chrono::NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
            prop_assert_ne!(
                generate_receipt_number(date, seq_a),
                generate_receipt_number(date, seq_b)
            );
        }
    }
}
