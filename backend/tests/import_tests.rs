//! Product CSV import tests
//!
//! Covers the heuristic column matcher used to map arbitrary supplier
//! spreadsheets onto catalog fields.

use proptest::prelude::*;
use shared::models::{match_product_column, ProductColumn};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_canonical_headers_match() {
        assert_eq!(match_product_column("sku"), Some(ProductColumn::Sku));
        assert_eq!(match_product_column("name"), Some(ProductColumn::Name));
        assert_eq!(match_product_column("price"), Some(ProductColumn::Price));
        assert_eq!(
            match_product_column("stock_quantity"),
            Some(ProductColumn::StockQuantity)
        );
        assert_eq!(match_product_column("barcode"), Some(ProductColumn::Barcode));
    }

    #[test]
    fn test_supplier_spreadsheet_aliases() {
        // Headers seen in real supplier sheets
        assert_eq!(match_product_column("Item Code"), Some(ProductColumn::Sku));
        assert_eq!(
            match_product_column("Product Name"),
            Some(ProductColumn::Name)
        );
        assert_eq!(
            match_product_column("Selling Price"),
            Some(ProductColumn::Price)
        );
        assert_eq!(
            match_product_column("Purchase Price"),
            Some(ProductColumn::CostPrice)
        );
        assert_eq!(match_product_column("Qty"), Some(ProductColumn::StockQuantity));
        assert_eq!(match_product_column("EAN"), Some(ProductColumn::Barcode));
        assert_eq!(match_product_column("UPC"), Some(ProductColumn::Barcode));
        assert_eq!(
            match_product_column("Manufacturer"),
            Some(ProductColumn::Brand)
        );
        assert_eq!(match_product_column("Shelf"), Some(ProductColumn::Location));
    }

    #[test]
    fn test_separators_and_case_ignored() {
        assert_eq!(
            match_product_column("STOCK-QUANTITY"),
            Some(ProductColumn::StockQuantity)
        );
        assert_eq!(
            match_product_column("cost.price"),
            Some(ProductColumn::CostPrice)
        );
        assert_eq!(
            match_product_column("Product_Category"),
            Some(ProductColumn::Category)
        );
    }

    #[test]
    fn test_unrelated_headers_ignored() {
        assert_eq!(match_product_column("warranty"), None);
        assert_eq!(match_product_column("supplier email"), None);
        assert_eq!(match_product_column(""), None);
    }

    #[test]
    fn test_header_row_mapping() {
        // A full header row from a typical import file
        let headers = ["Item Code", "Product Name", "Brand", "Price", "Qty", "Notes"];
        let columns: Vec<Option<ProductColumn>> =
            headers.iter().map(|h| match_product_column(h)).collect();

        assert_eq!(
            columns,
            vec![
                Some(ProductColumn::Sku),
                Some(ProductColumn::Name),
                Some(ProductColumn::Brand),
                Some(ProductColumn::Price),
                Some(ProductColumn::StockQuantity),
                None,
            ]
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Matching is insensitive to case and separator noise
        #[test]
        fn separator_noise_does_not_change_match(
            base in prop_oneof![
                Just("name"), Just("price"), Just("barcode"),
                Just("category"), Just("brand"), Just("location"),
            ],
            upper in any::<bool>(),
            sep in prop_oneof![Just(""), Just(" "), Just("_"), Just("-")],
        ) {
            let noisy: String = base
                .chars()
                .flat_map(|c| {
                    let c = if upper { c.to_ascii_uppercase() } else { c };
                    std::iter::once(c).chain(sep.chars())
                })
                .collect();
            prop_assert_eq!(match_product_column(&noisy), match_product_column(base));
        }

        /// Random alphabetic garbage never maps to a column by accident
        /// unless it happens to equal a known alias
        #[test]
        fn match_is_deterministic(header in "[a-zA-Z _-]{0,20}") {
            prop_assert_eq!(match_product_column(&header), match_product_column(&header));
        }
    }
}
