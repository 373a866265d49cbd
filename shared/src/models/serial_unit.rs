//! Serial-tracked inventory unit models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days a sold unit is kept before the retention sweep removes it
pub const SOLD_UNIT_RETENTION_DAYS: i64 = 4;

/// Lifecycle status of a physically tracked unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialUnitStatus {
    InStock,
    Sold,
    Reserved,
    InRepair,
    Returned,
    Damaged,
    Lost,
}

impl SerialUnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerialUnitStatus::InStock => "in_stock",
            SerialUnitStatus::Sold => "sold",
            SerialUnitStatus::Reserved => "reserved",
            SerialUnitStatus::InRepair => "in_repair",
            SerialUnitStatus::Returned => "returned",
            SerialUnitStatus::Damaged => "damaged",
            SerialUnitStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(SerialUnitStatus::InStock),
            "sold" => Some(SerialUnitStatus::Sold),
            "reserved" => Some(SerialUnitStatus::Reserved),
            "in_repair" => Some(SerialUnitStatus::InRepair),
            "returned" => Some(SerialUnitStatus::Returned),
            "damaged" => Some(SerialUnitStatus::Damaged),
            "lost" => Some(SerialUnitStatus::Lost),
            _ => None,
        }
    }
}

impl std::fmt::Display for SerialUnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a location name refers to the sales floor.
///
/// Moving a unit to such a location marks the owning product visible in the
/// storefront catalog. Matching is a case-insensitive substring check for
/// "store" or "shop".
pub fn location_is_storefront(location: &str) -> bool {
    let lower = location.to_lowercase();
    lower.contains("store") || lower.contains("shop")
}

/// Whether a sold unit has aged past the retention window and should be
/// removed by the cleanup sweep.
pub fn past_retention(sold_date: DateTime<Utc>, now: DateTime<Utc>, retention_days: i64) -> bool {
    now - sold_date > chrono::Duration::days(retention_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SerialUnitStatus::InStock,
            SerialUnitStatus::Sold,
            SerialUnitStatus::Reserved,
            SerialUnitStatus::InRepair,
            SerialUnitStatus::Returned,
            SerialUnitStatus::Damaged,
            SerialUnitStatus::Lost,
        ] {
            assert_eq!(SerialUnitStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SerialUnitStatus::parse("melted"), None);
    }

    #[test]
    fn test_storefront_locations() {
        assert!(location_is_storefront("Main Store"));
        assert!(location_is_storefront("shopfront"));
        assert!(location_is_storefront("STORE-2"));
    }

    #[test]
    fn test_non_storefront_locations() {
        assert!(!location_is_storefront("Warehouse B"));
        assert!(!location_is_storefront("repair bench"));
        assert!(!location_is_storefront(""));
    }

    #[test]
    fn test_retention_cutoff() {
        let now = Utc::now();
        assert!(past_retention(
            now - Duration::days(5),
            now,
            SOLD_UNIT_RETENTION_DAYS
        ));
        assert!(!past_retention(
            now - Duration::days(3),
            now,
            SOLD_UNIT_RETENTION_DAYS
        ));
        // Exactly at the boundary is retained
        assert!(!past_retention(
            now - Duration::days(SOLD_UNIT_RETENTION_DAYS),
            now,
            SOLD_UNIT_RETENTION_DAYS
        ));
    }
}
