//! Product catalog and stock movement models

use serde::{Deserialize, Serialize};

/// Kinds of stock movements recorded against a product.
///
/// Every mutation of `products.stock_quantity` appends one of these to the
/// `stock_transactions` log; the log itself is never updated or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTransactionKind {
    Receive,
    Sale,
    RefundRestock,
    Adjustment,
    Import,
}

impl StockTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockTransactionKind::Receive => "receive",
            StockTransactionKind::Sale => "sale",
            StockTransactionKind::RefundRestock => "refund_restock",
            StockTransactionKind::Adjustment => "adjustment",
            StockTransactionKind::Import => "import",
        }
    }
}

/// Columns recognized by the CSV product importer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Sku,
    Name,
    Description,
    Category,
    Brand,
    Price,
    CostPrice,
    StockQuantity,
    Barcode,
    Location,
}

/// Match a CSV header against the known product columns.
///
/// Matching is heuristic: headers are lowercased and stripped of spaces,
/// underscores and dashes before comparison, so "Product Name", "product_name"
/// and "name" all map to [`ProductColumn::Name`].
pub fn match_product_column(header: &str) -> Option<ProductColumn> {
    let key: String = header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .collect::<String>()
        .to_lowercase();

    match key.as_str() {
        "sku" | "productcode" | "itemcode" | "code" => Some(ProductColumn::Sku),
        "name" | "productname" | "itemname" | "item" | "title" => Some(ProductColumn::Name),
        "description" | "desc" | "details" => Some(ProductColumn::Description),
        "category" | "type" | "productcategory" => Some(ProductColumn::Category),
        "brand" | "manufacturer" | "make" => Some(ProductColumn::Brand),
        "price" | "sellingprice" | "saleprice" | "unitprice" => Some(ProductColumn::Price),
        "cost" | "costprice" | "buyprice" | "purchaseprice" => Some(ProductColumn::CostPrice),
        "stock" | "stockquantity" | "qty" | "quantity" | "stockqty" => {
            Some(ProductColumn::StockQuantity)
        }
        "barcode" | "ean" | "upc" => Some(ProductColumn::Barcode),
        "location" | "shelf" | "bin" => Some(ProductColumn::Location),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_exact_headers() {
        assert_eq!(match_product_column("name"), Some(ProductColumn::Name));
        assert_eq!(match_product_column("price"), Some(ProductColumn::Price));
        assert_eq!(match_product_column("barcode"), Some(ProductColumn::Barcode));
    }

    #[test]
    fn test_match_is_case_and_separator_insensitive() {
        assert_eq!(
            match_product_column("Product Name"),
            Some(ProductColumn::Name)
        );
        assert_eq!(
            match_product_column("STOCK_QUANTITY"),
            Some(ProductColumn::StockQuantity)
        );
        assert_eq!(
            match_product_column("cost-price"),
            Some(ProductColumn::CostPrice)
        );
    }

    #[test]
    fn test_match_aliases() {
        assert_eq!(match_product_column("qty"), Some(ProductColumn::StockQuantity));
        assert_eq!(match_product_column("EAN"), Some(ProductColumn::Barcode));
        assert_eq!(match_product_column("manufacturer"), Some(ProductColumn::Brand));
    }

    #[test]
    fn test_unknown_header() {
        assert_eq!(match_product_column("warranty provider"), None);
        assert_eq!(match_product_column(""), None);
    }
}
