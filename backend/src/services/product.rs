//! Product catalog service: storefront queries, admin CRUD, stock
//! adjustments, and CSV import

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{match_product_column, ProductColumn, StockTransactionKind};
use shared::validation::validate_barcode;

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Catalog product record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub location: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub barcode: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Input for updating a product; omitted fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub barcode: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Storefront/admin catalog filter
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Free-text search over name, sku, and brand
    pub q: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    /// Admin only; the storefront always sees active products
    pub include_inactive: Option<bool>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    /// Signed quantity change; negative values remove stock
    pub delta: i32,
    pub notes: Option<String>,
}

/// Result of a CSV import
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<ImportSkip>,
}

/// A row the importer could not use, with the reason
#[derive(Debug, Serialize)]
pub struct ImportSkip {
    pub row: usize,
    pub reason: String,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products. The storefront path forces `is_active = true`.
    pub async fn list(&self, filter: &ProductFilter, storefront: bool) -> AppResult<Vec<Product>> {
        let include_inactive = !storefront && filter.include_inactive.unwrap_or(false);
        let search = filter.q.as_ref().map(|q| format!("%{}%", q));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, description, category, brand, price, cost_price,
                   stock_quantity, barcode, supplier_id, location, is_active, is_featured,
                   created_at, updated_at
            FROM products
            WHERE ($1 OR is_active = true)
              AND ($2::text IS NULL OR name ILIKE $2 OR sku ILIKE $2 OR brand ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::boolean IS NULL OR is_featured = $4)
            ORDER BY name
            "#,
        )
        .bind(include_inactive)
        .bind(search)
        .bind(&filter.category)
        .bind(filter.featured)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Get a product by id
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, description, category, brand, price, cost_price,
                   stock_quantity, barcode, supplier_id, location, is_active, is_featured,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Distinct categories currently in the catalog
    pub async fn list_categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category FROM products
            WHERE category IS NOT NULL AND is_active = true
            ORDER BY category
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        Self::check_input(&input)?;

        let mut tx = self.db.begin().await?;
        let product = Self::insert_product(&mut tx, &input).await?;
        tx.commit().await?;

        Ok(product)
    }

    fn check_input(input: &CreateProductInput) -> AppResult<()> {
        if input.price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price cannot be negative".to_string(),
            });
        }
        if let Some(barcode) = &input.barcode {
            validate_barcode(barcode).map_err(|msg| AppError::Validation {
                field: "barcode".to_string(),
                message: msg.to_string(),
            })?;
        }
        Ok(())
    }

    async fn insert_product(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateProductInput,
    ) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                sku, name, description, category, brand, price, cost_price,
                stock_quantity, barcode, supplier_id, location, is_active, is_featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, sku, name, description, category, brand, price, cost_price,
                      stock_quantity, barcode, supplier_id, location, is_active, is_featured,
                      created_at, updated_at
            "#,
        )
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock_quantity.unwrap_or(0))
        .bind(&input.barcode)
        .bind(input.supplier_id)
        .bind(&input.location)
        .bind(input.is_active.unwrap_or(true))
        .bind(input.is_featured.unwrap_or(false))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("sku/barcode".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        Ok(product)
    }

    /// Update a product
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        // Ensure it exists first for a clean 404
        self.get(product_id).await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                brand = COALESCE($5, brand),
                price = COALESCE($6, price),
                cost_price = COALESCE($7, cost_price),
                barcode = COALESCE($8, barcode),
                supplier_id = COALESCE($9, supplier_id),
                location = COALESCE($10, location),
                is_active = COALESCE($11, is_active),
                is_featured = COALESCE($12, is_featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, sku, name, description, category, brand, price, cost_price,
                      stock_quantity, barcode, supplier_id, location, is_active, is_featured,
                      created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(&input.barcode)
        .bind(input.supplier_id)
        .bind(&input.location)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Delete a product
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Apply a manual stock adjustment.
    ///
    /// The counter change and the sufficiency check happen in one statement;
    /// an adjustment that would drive stock negative matches zero rows.
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<Product> {
        if input.delta == 0 {
            return Err(AppError::Validation {
                field: "delta".to_string(),
                message: "Adjustment delta cannot be zero".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2, updated_at = NOW()
            WHERE id = $1 AND stock_quantity + $2 >= 0
            RETURNING id, sku, name, description, category, brand, price, cost_price,
                      stock_quantity, barcode, supplier_id, location, is_active, is_featured,
                      created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(input.delta)
        .fetch_optional(&mut *tx)
        .await?;

        let product = match product {
            Some(p) => p,
            None => {
                // Distinguish a missing product from an underflowing adjustment
                let exists =
                    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                        .bind(product_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::InsufficientStock(
                        "Adjustment would make stock negative".to_string(),
                    )
                } else {
                    AppError::NotFound("Product".to_string())
                });
            }
        };

        record_stock_transaction(
            &mut tx,
            product_id,
            StockTransactionKind::Adjustment,
            input.delta,
            None,
            None,
            input.notes.as_deref(),
            Some(user_id),
        )
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Import products from CSV text.
    ///
    /// Column headers are matched heuristically (see
    /// [`shared::models::match_product_column`]); a row missing a usable name
    /// or price is skipped and reported rather than aborting the batch.
    pub async fn import_csv(&self, user_id: Uuid, csv_text: &str) -> AppResult<ImportReport> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::Validation {
                field: "csv".to_string(),
                message: format!("Unreadable CSV header: {}", e),
            })?
            .clone();

        let columns: Vec<Option<ProductColumn>> =
            headers.iter().map(match_product_column).collect();

        if !columns.contains(&Some(ProductColumn::Name)) {
            return Err(AppError::Validation {
                field: "csv".to_string(),
                message: "No recognizable product name column".to_string(),
            });
        }

        let mut imported = 0usize;
        let mut skipped = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let row_number = idx + 2; // 1-based, after the header row
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    skipped.push(ImportSkip {
                        row: row_number,
                        reason: format!("Unparseable row: {}", e),
                    });
                    continue;
                }
            };

            match self.import_row(user_id, &columns, &record).await {
                Ok(()) => imported += 1,
                Err(reason) => skipped.push(ImportSkip {
                    row: row_number,
                    reason,
                }),
            }
        }

        tracing::info!(imported, skipped = skipped.len(), "product CSV import finished");

        Ok(ImportReport { imported, skipped })
    }

    async fn import_row(
        &self,
        user_id: Uuid,
        columns: &[Option<ProductColumn>],
        record: &csv::StringRecord,
    ) -> Result<(), String> {
        let mut input = CreateProductInput {
            sku: String::new(),
            name: String::new(),
            description: None,
            category: None,
            brand: None,
            price: Decimal::ZERO,
            cost_price: None,
            stock_quantity: None,
            barcode: None,
            supplier_id: None,
            location: None,
            is_active: None,
            is_featured: None,
        };

        for (column, value) in columns.iter().zip(record.iter()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match column {
                Some(ProductColumn::Sku) => input.sku = value.to_string(),
                Some(ProductColumn::Name) => input.name = value.to_string(),
                Some(ProductColumn::Description) => input.description = Some(value.to_string()),
                Some(ProductColumn::Category) => input.category = Some(value.to_string()),
                Some(ProductColumn::Brand) => input.brand = Some(value.to_string()),
                Some(ProductColumn::Price) => {
                    input.price = Decimal::from_str(value)
                        .map_err(|_| format!("Invalid price '{}'", value))?;
                }
                Some(ProductColumn::CostPrice) => {
                    input.cost_price = Some(
                        Decimal::from_str(value)
                            .map_err(|_| format!("Invalid cost price '{}'", value))?,
                    );
                }
                Some(ProductColumn::StockQuantity) => {
                    input.stock_quantity = Some(
                        value
                            .parse::<i32>()
                            .map_err(|_| format!("Invalid quantity '{}'", value))?,
                    );
                }
                Some(ProductColumn::Barcode) => input.barcode = Some(value.to_string()),
                Some(ProductColumn::Location) => input.location = Some(value.to_string()),
                None => {}
            }
        }

        if input.name.is_empty() {
            return Err("Missing product name".to_string());
        }
        if input.sku.is_empty() {
            // Derive a SKU from the name when the sheet has none
            input.sku = input
                .name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(24)
                .collect::<String>()
                .to_uppercase();
        }

        Self::check_input(&input).map_err(|e| e.to_string())?;

        // The product and its initial-stock ledger row commit together
        let initial_stock = input.stock_quantity.unwrap_or(0);
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| format!("Insert failed: {}", e))?;
        let product = Self::insert_product(&mut tx, &input)
            .await
            .map_err(|e| format!("Insert failed: {}", e))?;

        if initial_stock > 0 {
            record_stock_transaction(
                &mut tx,
                product.id,
                StockTransactionKind::Import,
                initial_stock,
                None,
                None,
                Some("CSV import"),
                Some(user_id),
            )
            .await
            .map_err(|e| format!("Insert failed: {}", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| format!("Insert failed: {}", e))?;

        Ok(())
    }
}

/// Append a row to the append-only stock transaction log.
///
/// Shared by every service that mutates `products.stock_quantity`; always
/// called inside the same transaction as the counter update.
pub(crate) async fn record_stock_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: Uuid,
    kind: StockTransactionKind,
    quantity_delta: i32,
    reference_type: Option<&str>,
    reference_id: Option<Uuid>,
    notes: Option<&str>,
    created_by: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transactions
            (product_id, transaction_type, quantity_delta, reference_type, reference_id, notes, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(product_id)
    .bind(kind.as_str())
    .bind(quantity_delta)
    .bind(reference_type)
    .bind(reference_id)
    .bind(notes)
    .bind(created_by)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
