//! Sale and refund models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a refund amount was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundKind {
    /// Reverse the full sale total
    Full,
    /// Sum of selected line quantities at their sale-time unit price
    Items,
    /// Manually entered amount overriding the line sum
    Custom,
}

impl RefundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundKind::Full => "full",
            RefundKind::Items => "items",
            RefundKind::Custom => "custom",
        }
    }
}

/// One sale line with the quantity selected for refund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundLine {
    pub sold_quantity: i32,
    pub unit_price: Decimal,
    pub refund_quantity: i32,
}

impl RefundLine {
    pub fn line_amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.refund_quantity)
    }
}

/// Compute the refund amount for a sale.
///
/// Precedence: a custom override wins over the selected-line sum, which wins
/// over the full total. The caller still validates the result against the
/// sale total before persisting.
pub fn compute_refund_amount(
    kind: RefundKind,
    sale_total: Decimal,
    lines: &[RefundLine],
    custom_amount: Option<Decimal>,
) -> Decimal {
    match kind {
        RefundKind::Full => sale_total,
        RefundKind::Custom => custom_amount.unwrap_or_else(|| line_sum(lines)),
        RefundKind::Items => line_sum(lines),
    }
}

fn line_sum(lines: &[RefundLine]) -> Decimal {
    lines.iter().map(RefundLine::line_amount).sum()
}

/// Check a proposed refund amount against the sale it reverses.
pub fn refund_amount_is_valid(amount: Decimal, sale_total: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= sale_total
}

/// Generate a receipt number: `RCP-YYYYMMDD-NNNN`
pub fn generate_receipt_number(date: NaiveDate, sequence: i64) -> String {
    format!("RCP-{}-{:04}", date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

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

    #[test]
    fn test_full_refund_is_sale_total() {
        let amount = compute_refund_amount(RefundKind::Full, dec("50000"), &[], None);
        assert_eq!(amount, dec("50000"));
    }

    #[test]
    fn test_item_refund_sums_selected_lines() {
        let lines = [refund_line(2, "1000", 1), refund_line(1, "2000", 1)];
        let amount = compute_refund_amount(RefundKind::Items, dec("4000"), &lines, None);
        assert_eq!(amount, dec("3000"));
    }

    #[test]
    fn test_custom_amount_overrides_line_sum() {
        let lines = [refund_line(2, "1000", 2)];
        let amount =
            compute_refund_amount(RefundKind::Custom, dec("2000"), &lines, Some(dec("1500")));
        assert_eq!(amount, dec("1500"));
    }

    #[test]
    fn test_custom_without_override_falls_back_to_lines() {
        let lines = [refund_line(2, "1000", 2)];
        let amount = compute_refund_amount(RefundKind::Custom, dec("2000"), &lines, None);
        assert_eq!(amount, dec("2000"));
    }

    #[test]
    fn test_refund_amount_bounds() {
        assert!(refund_amount_is_valid(dec("1"), dec("100")));
        assert!(refund_amount_is_valid(dec("100"), dec("100")));
        assert!(!refund_amount_is_valid(dec("0"), dec("100")));
        assert!(!refund_amount_is_valid(dec("-5"), dec("100")));
        assert!(!refund_amount_is_valid(dec("101"), dec("100")));
    }

    #[test]
    fn test_receipt_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(generate_receipt_number(date, 12), "RCP-20240307-0012");
    }
}
