//! Sales service
//!
//! Records point-of-sale transactions. A sale commits atomically: the sale
//! header and lines, the stock decrements (guarded in SQL so stock never goes
//! negative), the stock transaction log, and any serial units marked sold.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::product::record_stock_transaction;
use shared::models::{generate_receipt_number, StockTransactionKind};
use shared::types::{DateRange, PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_receipt_number;

/// Sales service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Sale header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub receipt_number: String,
    pub customer_id: Option<Uuid>,
    pub total: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub sold_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Sale line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Sale with its lines
#[derive(Debug, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub customer_id: Option<Uuid>,
    /// Pre-printed receipt number; one is generated when absent
    pub receipt_number: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<CreateSaleItemInput>,
    /// Serial units handed over with this sale; marked sold atomically
    #[serde(default)]
    pub serial_unit_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Defaults to the product's current price
    pub unit_price: Option<Decimal>,
}

/// Filter for sale listings
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SaleFilter {
    fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }

    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale.
    ///
    /// Unit prices default to the product's current price. Stock is
    /// decremented with an in-SQL sufficiency guard; a line that would drive
    /// stock negative fails the whole transaction.
    pub async fn create(&self, user_id: Uuid, input: CreateSaleInput) -> AppResult<SaleDetail> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A sale needs at least one line".to_string(),
            });
        }
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                });
            }
        }
        if let Some(receipt) = &input.receipt_number {
            validate_receipt_number(receipt).map_err(|msg| AppError::Validation {
                field: "receipt_number".to_string(),
                message: msg.to_string(),
            })?;
        }

        let mut tx = self.db.begin().await?;

        // Price and decrement each line first so a stock failure rolls back
        // before the header exists
        let mut priced = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let unit_price = match item.unit_price {
                Some(price) => {
                    if price < Decimal::ZERO {
                        return Err(AppError::Validation {
                            field: "unit_price".to_string(),
                            message: "Unit price cannot be negative".to_string(),
                        });
                    }
                    price
                }
                None => sqlx::query_scalar::<_, Decimal>(
                    "SELECT price FROM products WHERE id = $1 AND is_active = true",
                )
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?,
            };

            let updated = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $2, updated_at = NOW()
                WHERE id = $1 AND stock_quantity >= $2
                "#,
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
                )
                .bind(item.product_id)
                .fetch_one(&mut *tx)
                .await?;
                return Err(if exists {
                    AppError::InsufficientStock(format!(
                        "Not enough stock to sell {} of product {}",
                        item.quantity, item.product_id
                    ))
                } else {
                    AppError::NotFound("Product".to_string())
                });
            }

            priced.push((item.product_id, item.quantity, unit_price));
        }

        let total: Decimal = priced
            .iter()
            .map(|(_, qty, price)| *price * Decimal::from(*qty))
            .sum();

        let receipt_number = match &input.receipt_number {
            Some(receipt) => receipt.clone(),
            None => self.next_receipt_number(&mut tx).await?,
        };

        // Concurrent same-day sales can collide on a generated number; the
        // unique index catches the loser
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (receipt_number, customer_id, total, payment_method, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, receipt_number, customer_id, total, payment_method, notes, sold_at, created_by
            "#,
        )
        .bind(&receipt_number)
        .bind(input.customer_id)
        .bind(total)
        .bind(&input.payment_method)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("receipt_number".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        let mut items = Vec::with_capacity(priced.len());
        for (product_id, quantity, unit_price) in &priced {
            let line = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, sale_id, product_id, quantity, unit_price
                "#,
            )
            .bind(sale.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;

            record_stock_transaction(
                &mut tx,
                *product_id,
                StockTransactionKind::Sale,
                -quantity,
                Some("sale"),
                Some(sale.id),
                None,
                Some(user_id),
            )
            .await?;

            items.push(line);
        }

        for unit_id in &input.serial_unit_ids {
            self.mark_unit_sold(&mut tx, *unit_id, sale.id, user_id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(receipt = %sale.receipt_number, %total, "sale recorded");

        Ok(SaleDetail { sale, items })
    }

    /// Get a sale with its lines by id
    pub async fn get(&self, sale_id: Uuid) -> AppResult<SaleDetail> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, customer_id, total, payment_method, notes, sold_at, created_by
            FROM sales WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = self.sale_items(sale.id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// Look up a sale by its receipt number
    pub async fn get_by_receipt(&self, receipt_number: &str) -> AppResult<SaleDetail> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, customer_id, total, payment_method, notes, sold_at, created_by
            FROM sales WHERE receipt_number = $1
            "#,
        )
        .bind(receipt_number)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = self.sale_items(sale.id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// List sales as a page, optionally within a date range or for a customer
    pub async fn list(&self, filter: &SaleFilter) -> AppResult<PaginatedResponse<Sale>> {
        if !filter.range().is_valid() {
            return Err(AppError::Validation {
                field: "from".to_string(),
                message: "Date range start is after its end".to_string(),
            });
        }
        let pagination = filter.pagination();

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE ($1::date IS NULL OR sold_at::date >= $1)
              AND ($2::date IS NULL OR sold_at::date <= $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.customer_id)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, customer_id, total, payment_method, notes, sold_at, created_by
            FROM sales
            WHERE ($1::date IS NULL OR sold_at::date >= $1)
              AND ($2::date IS NULL OR sold_at::date <= $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            ORDER BY sold_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.customer_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: sales,
            pagination: PaginationMeta::new(&pagination, total_items as u64),
        })
    }

    /// Next receipt number for today: RCP-YYYYMMDD-NNNN.
    ///
    /// The daily sequence is derived from today's sale count inside the
    /// transaction; the unique index on receipt_number backstops races.
    async fn next_receipt_number(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<String> {
        let today_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sales WHERE sold_at::date = CURRENT_DATE",
        )
        .fetch_one(&mut **tx)
        .await?;

        Ok(generate_receipt_number(
            Utc::now().date_naive(),
            today_count + 1,
        ))
    }

    /// Mark a serial unit sold as part of a sale, with its audit row
    async fn mark_unit_sold(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        unit_id: Uuid,
        sale_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let old_status = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE serial_units su
            SET status = 'sold', sale_id = $2, sold_date = NOW(), updated_at = NOW()
            FROM (SELECT id, status FROM serial_units WHERE id = $1 FOR UPDATE) prev
            WHERE su.id = prev.id AND prev.status IN ('in_stock', 'reserved')
            RETURNING prev.status
            "#,
        )
        .bind(unit_id)
        .bind(sale_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition(format!("Unit {} is not available for sale", unit_id))
        })?;

        sqlx::query(
            r#"
            INSERT INTO serial_unit_history (unit_id, field, old_value, new_value, notes, changed_by)
            VALUES ($1, 'status', $2, 'sold', $3, $4)
            "#,
        )
        .bind(unit_id)
        .bind(&old_status)
        .bind(format!("sale {}", sale_id))
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn sale_items(&self, sale_id: Uuid) -> AppResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }
}
