//! Purchase order models and receiving arithmetic

use serde::{Deserialize, Serialize};

/// Status of a supplier purchase order, derived from how much of each line
/// has been received.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    PartiallyReceived,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::PartiallyReceived => "partially_received",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered/received counters for one purchase order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineFill {
    pub ordered: i32,
    pub received: i32,
}

impl LineFill {
    pub fn remaining(&self) -> i32 {
        (self.ordered - self.received).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.received >= self.ordered
    }
}

/// Derive the order status from its line fill counters.
///
/// `received` when every line is fully received, `partially_received` when
/// anything has arrived, `pending` otherwise.
pub fn derive_order_status(lines: &[LineFill]) -> PurchaseOrderStatus {
    if !lines.is_empty() && lines.iter().all(LineFill::is_full) {
        return PurchaseOrderStatus::Received;
    }
    if lines.iter().any(|l| l.received > 0) {
        return PurchaseOrderStatus::PartiallyReceived;
    }
    PurchaseOrderStatus::Pending
}

/// Cap a requested receiving quantity at the line's remaining capacity.
/// Returns 0 for non-positive requests or already-full lines.
pub fn clamp_receiving(line: LineFill, requested: i32) -> i32 {
    requested.max(0).min(line.remaining())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ordered: i32, received: i32) -> LineFill {
        LineFill { ordered, received }
    }

    #[test]
    fn test_status_all_lines_full() {
        let lines = [line(10, 10), line(5, 5)];
        assert_eq!(derive_order_status(&lines), PurchaseOrderStatus::Received);
    }

    #[test]
    fn test_status_partial() {
        let lines = [line(10, 10), line(5, 2)];
        assert_eq!(
            derive_order_status(&lines),
            PurchaseOrderStatus::PartiallyReceived
        );
    }

    #[test]
    fn test_status_nothing_received() {
        let lines = [line(10, 0), line(5, 0)];
        assert_eq!(derive_order_status(&lines), PurchaseOrderStatus::Pending);
    }

    #[test]
    fn test_status_empty_order_is_pending() {
        assert_eq!(derive_order_status(&[]), PurchaseOrderStatus::Pending);
    }

    #[test]
    fn test_clamp_within_remaining() {
        assert_eq!(clamp_receiving(line(10, 4), 6), 6);
        assert_eq!(clamp_receiving(line(10, 4), 3), 3);
    }

    #[test]
    fn test_clamp_over_remaining() {
        assert_eq!(clamp_receiving(line(10, 4), 9), 6);
        assert_eq!(clamp_receiving(line(10, 10), 1), 0);
    }

    #[test]
    fn test_clamp_negative_request() {
        assert_eq!(clamp_receiving(line(10, 4), -2), 0);
    }
}
