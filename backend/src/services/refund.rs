//! Refund service
//!
//! Reverses a completed sale, fully or per line, with an optional custom
//! amount. At most one refund exists per sale (enforced by a unique index on
//! refunds.sale_id). Refunded quantities are restocked atomically with the
//! refund record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::product::record_stock_transaction;
use crate::services::sale::SaleService;
use shared::models::{
    compute_refund_amount, refund_amount_is_valid, RefundKind, RefundLine, StockTransactionKind,
};

/// Refund service
#[derive(Clone)]
pub struct RefundService {
    db: PgPool,
}

/// Refund header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Refund {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub refund_kind: String,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Refunded line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RefundItem {
    pub id: Uuid,
    pub refund_id: Uuid,
    pub sale_item_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Refund with its lines
#[derive(Debug, Serialize)]
pub struct RefundDetail {
    #[serde(flatten)]
    pub refund: Refund,
    pub items: Vec<RefundItem>,
}

/// Input for creating a refund against a receipt
#[derive(Debug, Deserialize)]
pub struct CreateRefundInput {
    pub receipt_number: String,
    pub kind: RefundKind,
    /// Lines to refund; required for `items`, optional for `custom`
    #[serde(default)]
    pub items: Vec<RefundItemInput>,
    /// Manual override amount for `custom` refunds
    pub custom_amount: Option<Decimal>,
    pub reason: Option<String>,
    /// Skip restocking, e.g. for damaged goods
    #[serde(default)]
    pub no_restock: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefundItemInput {
    pub sale_item_id: Uuid,
    pub quantity: i32,
}

impl RefundService {
    /// Create a new RefundService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Refund a sale identified by its receipt number.
    ///
    /// The amount precedence is custom override, then the selected-line sum,
    /// then the full sale total. The refund must satisfy
    /// `0 < amount <= sale total`, and each refunded quantity must not exceed
    /// the quantity sold on its line.
    pub async fn create(&self, user_id: Uuid, input: CreateRefundInput) -> AppResult<RefundDetail> {
        let sale = SaleService::new(self.db.clone())
            .get_by_receipt(&input.receipt_number)
            .await?;

        if let Some(custom) = input.custom_amount {
            if custom <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "custom_amount".to_string(),
                    message: "Custom amount must be positive".to_string(),
                });
            }
        }

        // Resolve selected lines against the sale and build refund lines at
        // sale-time prices
        let mut selected = Vec::with_capacity(input.items.len());
        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let sold = sale
                .items
                .iter()
                .find(|s| s.id == item.sale_item_id)
                .ok_or_else(|| AppError::NotFound("Sale line".to_string()))?;

            if item.quantity <= 0 || item.quantity > sold.quantity {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: format!(
                        "Refund quantity {} is outside 1..={} for line {}",
                        item.quantity, sold.quantity, sold.id
                    ),
                });
            }

            lines.push(RefundLine {
                sold_quantity: sold.quantity,
                unit_price: sold.unit_price,
                refund_quantity: item.quantity,
            });
            selected.push((sold.id, sold.product_id, item.quantity, sold.unit_price));
        }

        if input.kind == RefundKind::Items && selected.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "An item refund needs at least one line".to_string(),
            });
        }

        let amount =
            compute_refund_amount(input.kind, sale.sale.total, &lines, input.custom_amount);

        if !refund_amount_is_valid(amount, sale.sale.total) {
            return Err(AppError::RefundExceedsSale);
        }

        let mut tx = self.db.begin().await?;

        let refund = sqlx::query_as::<_, Refund>(
            r#"
            INSERT INTO refunds (sale_id, refund_kind, amount, reason, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sale_id, refund_kind, amount, reason, created_by, created_at
            "#,
        )
        .bind(sale.sale.id)
        .bind(input.kind.as_str())
        .bind(amount)
        .bind(&input.reason)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Sale has already been refunded".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        // A full refund with no explicit lines restocks every sale line
        let restock: Vec<(Uuid, Uuid, i32, Decimal)> =
            if selected.is_empty() && input.kind == RefundKind::Full {
                sale.items
                    .iter()
                    .map(|s| (s.id, s.product_id, s.quantity, s.unit_price))
                    .collect()
            } else {
                selected
            };

        let mut items = Vec::with_capacity(restock.len());
        for (sale_item_id, product_id, quantity, unit_price) in &restock {
            let line = sqlx::query_as::<_, RefundItem>(
                r#"
                INSERT INTO refund_items (refund_id, sale_item_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, refund_id, sale_item_id, product_id, quantity, unit_price
                "#,
            )
            .bind(refund.id)
            .bind(sale_item_id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;

            if !input.no_restock {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock_quantity = stock_quantity + $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;

                record_stock_transaction(
                    &mut tx,
                    *product_id,
                    StockTransactionKind::RefundRestock,
                    *quantity,
                    Some("refund"),
                    Some(refund.id),
                    None,
                    Some(user_id),
                )
                .await?;
            }

            items.push(line);
        }

        tx.commit().await?;

        tracing::info!(
            receipt = %sale.sale.receipt_number,
            %amount,
            kind = refund.refund_kind,
            "refund recorded"
        );

        Ok(RefundDetail { refund, items })
    }

    /// Get a refund with its lines
    pub async fn get(&self, refund_id: Uuid) -> AppResult<RefundDetail> {
        let refund = sqlx::query_as::<_, Refund>(
            r#"
            SELECT id, sale_id, refund_kind, amount, reason, created_by, created_at
            FROM refunds WHERE id = $1
            "#,
        )
        .bind(refund_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Refund".to_string()))?;

        let items = self.refund_items(refund.id).await?;

        Ok(RefundDetail { refund, items })
    }

    /// The refund for a sale, if one exists
    pub async fn for_sale(&self, sale_id: Uuid) -> AppResult<Option<RefundDetail>> {
        let refund = sqlx::query_as::<_, Refund>(
            r#"
            SELECT id, sale_id, refund_kind, amount, reason, created_by, created_at
            FROM refunds WHERE sale_id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?;

        match refund {
            Some(refund) => {
                let items = self.refund_items(refund.id).await?;
                Ok(Some(RefundDetail { refund, items }))
            }
            None => Ok(None),
        }
    }

    /// List refunds, newest first
    pub async fn list(&self) -> AppResult<Vec<Refund>> {
        let refunds = sqlx::query_as::<_, Refund>(
            r#"
            SELECT id, sale_id, refund_kind, amount, reason, created_by, created_at
            FROM refunds
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(refunds)
    }

    async fn refund_items(&self, refund_id: Uuid) -> AppResult<Vec<RefundItem>> {
        let items = sqlx::query_as::<_, RefundItem>(
            r#"
            SELECT id, refund_id, sale_item_id, product_id, quantity, unit_price
            FROM refund_items
            WHERE refund_id = $1
            ORDER BY id
            "#,
        )
        .bind(refund_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }
}
