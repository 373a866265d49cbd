//! Stock receiving tests
//!
//! Covers the purchase order receiving arithmetic: line fill counters,
//! quantity clamping for scanned intake, and order status derivation.

use proptest::prelude::*;
use shared::models::{clamp_receiving, derive_order_status, LineFill, PurchaseOrderStatus};

fn line(ordered: i32, received: i32) -> LineFill {
    LineFill { ordered, received }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fresh_order_is_pending() {
        let lines = [line(10, 0), line(4, 0)];
        assert_eq!(derive_order_status(&lines), PurchaseOrderStatus::Pending);
    }

    #[test]
    fn test_any_receipt_makes_order_partial() {
        let lines = [line(10, 1), line(4, 0)];
        assert_eq!(
            derive_order_status(&lines),
            PurchaseOrderStatus::PartiallyReceived
        );
    }

    #[test]
    fn test_all_lines_full_makes_order_received() {
        let lines = [line(10, 10), line(4, 4)];
        assert_eq!(derive_order_status(&lines), PurchaseOrderStatus::Received);
    }

    #[test]
    fn test_one_short_line_keeps_order_partial() {
        // 10-of-10 on one line, 3-of-4 on the other
        let lines = [line(10, 10), line(4, 3)];
        assert_eq!(
            derive_order_status(&lines),
            PurchaseOrderStatus::PartiallyReceived
        );
    }

    #[test]
    fn test_remaining_never_negative() {
        assert_eq!(line(5, 7).remaining(), 0);
        assert_eq!(line(5, 5).remaining(), 0);
        assert_eq!(line(5, 2).remaining(), 3);
    }

    #[test]
    fn test_scan_clamped_to_remaining() {
        // Scanning a 13th unit against a 12-unit line receives nothing extra
        assert_eq!(clamp_receiving(line(12, 12), 1), 0);
        assert_eq!(clamp_receiving(line(12, 11), 1), 1);
    }

    #[test]
    fn test_bulk_receive_clamped() {
        assert_eq!(clamp_receiving(line(20, 5), 100), 15);
    }

    #[test]
    fn test_negative_request_receives_nothing() {
        assert_eq!(clamp_receiving(line(20, 5), -3), 0);
    }

    #[test]
    fn test_empty_order_is_pending() {
        assert_eq!(derive_order_status(&[]), PurchaseOrderStatus::Pending);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn line_strategy() -> impl Strategy<Value = LineFill> {
        (1i32..=500, 0i32..=500).prop_map(|(ordered, received)| LineFill {
            ordered,
            received: received.min(ordered),
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Clamped quantity never exceeds what the line still needs
        #[test]
        fn clamp_never_exceeds_remaining(l in line_strategy(), requested in -100i32..=1000) {
            let granted = clamp_receiving(l, requested);
            prop_assert!(granted >= 0);
            prop_assert!(granted <= l.remaining());
            prop_assert!(l.received + granted <= l.ordered);
        }

        /// Receiving the clamped quantity never overshoots the order
        #[test]
        fn receiving_clamped_amount_keeps_line_valid(l in line_strategy(), requested in 0i32..=1000) {
            let granted = clamp_receiving(l, requested);
            let after = LineFill {
                ordered: l.ordered,
                received: l.received + granted,
            };
            prop_assert!(after.received <= after.ordered);
        }

        /// An order is `received` exactly when every line is full
        #[test]
        fn status_received_iff_all_lines_full(lines in prop::collection::vec(line_strategy(), 1..8)) {
            let status = derive_order_status(&lines);
            let all_full = lines.iter().all(|l| l.is_full());
            prop_assert_eq!(status == PurchaseOrderStatus::Received, all_full);
        }

        /// An order with any received stock is never `pending`
        #[test]
        fn status_not_pending_after_any_receipt(lines in prop::collection::vec(line_strategy(), 1..8)) {
            prop_assume!(lines.iter().any(|l| l.received > 0));
            prop_assert_ne!(derive_order_status(&lines), PurchaseOrderStatus::Pending);
        }
    }
}
