//! Serial unit lifecycle tests
//!
//! Covers status parsing, storefront location detection, the sold-unit
//! retention cutoff, and barcode/serial validation for registration.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use shared::models::{
    location_is_storefront, past_retention, SerialUnitStatus, SOLD_UNIT_RETENTION_DAYS,
};
use shared::validation::validate_barcode;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_all_statuses_round_trip() {
        let statuses = [
            SerialUnitStatus::InStock,
            SerialUnitStatus::Sold,
            SerialUnitStatus::Reserved,
            SerialUnitStatus::InRepair,
            SerialUnitStatus::Returned,
            SerialUnitStatus::Damaged,
            SerialUnitStatus::Lost,
        ];
        for status in statuses {
            assert_eq!(SerialUnitStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(SerialUnitStatus::parse("on_loan"), None);
        assert_eq!(SerialUnitStatus::parse(""), None);
        assert_eq!(SerialUnitStatus::parse("SOLD"), None);
    }

    #[test]
    fn test_storefront_location_names() {
        assert!(location_is_storefront("Store Front"));
        assert!(location_is_storefront("main store"));
        assert!(location_is_storefront("Shop Floor"));
        assert!(location_is_storefront("WEBSHOP"));
    }

    #[test]
    fn test_back_office_location_names() {
        assert!(!location_is_storefront("Warehouse B"));
        assert!(!location_is_storefront("Receiving dock"));
        assert!(!location_is_storefront("repair bench"));
    }

    #[test]
    fn test_sold_unit_kept_within_window() {
        let now = Utc::now();
        let sold = now - Duration::days(SOLD_UNIT_RETENTION_DAYS - 1);
        assert!(!past_retention(sold, now, SOLD_UNIT_RETENTION_DAYS));
    }

    #[test]
    fn test_sold_unit_removed_after_window() {
        let now = Utc::now();
        let sold = now - Duration::days(SOLD_UNIT_RETENTION_DAYS + 1);
        assert!(past_retention(sold, now, SOLD_UNIT_RETENTION_DAYS));
    }

    #[test]
    fn test_boundary_day_is_retained() {
        let now = Utc::now();
        let sold = now - Duration::days(SOLD_UNIT_RETENTION_DAYS);
        assert!(!past_retention(sold, now, SOLD_UNIT_RETENTION_DAYS));
    }

    #[test]
    fn test_serial_number_validation() {
        assert!(validate_barcode("SN-2025-00917").is_ok());
        assert!(validate_barcode("4006381333931").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("SN 123").is_err());
        assert!(validate_barcode(&"9".repeat(65)).is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = SerialUnitStatus> {
        prop_oneof![
            Just(SerialUnitStatus::InStock),
            Just(SerialUnitStatus::Sold),
            Just(SerialUnitStatus::Reserved),
            Just(SerialUnitStatus::InRepair),
            Just(SerialUnitStatus::Returned),
            Just(SerialUnitStatus::Damaged),
            Just(SerialUnitStatus::Lost),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Status serialization round-trips for every variant
        #[test]
        fn status_round_trips(status in status_strategy()) {
            prop_assert_eq!(SerialUnitStatus::parse(status.as_str()), Some(status));
        }

        /// Retention is monotone: an older sale date is removed whenever a
        /// newer one is
        #[test]
        fn retention_is_monotone(age_days in 0i64..=30, extra in 1i64..=30) {
            let now = Utc::now();
            let newer = now - Duration::days(age_days);
            let older = now - Duration::days(age_days + extra);
            if past_retention(newer, now, SOLD_UNIT_RETENTION_DAYS) {
                prop_assert!(past_retention(older, now, SOLD_UNIT_RETENTION_DAYS));
            }
        }

        /// Units inside the window survive, units past it do not
        #[test]
        fn retention_cutoff_is_exact(age_days in 0i64..=30) {
            let now = Utc::now();
            let sold = now - Duration::days(age_days);
            prop_assert_eq!(
                past_retention(sold, now, SOLD_UNIT_RETENTION_DAYS),
                age_days > SOLD_UNIT_RETENTION_DAYS
            );
        }

        /// Valid printable-ASCII codes of length 1-64 pass validation
        #[test]
        fn printable_codes_validate(code in "[!-~]{1,64}") {
            prop_assert!(validate_barcode(&code).is_ok());
        }
    }
}
