//! Purchase order and stock receiving service
//!
//! Receiving is fully transactional: line counters, product stock, the stock
//! transaction log, and the derived order status commit or roll back
//! together.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::product::record_stock_transaction;
use shared::models::{
    clamp_receiving, derive_order_status, LineFill, PurchaseOrderStatus, StockTransactionKind,
};

/// Receiving service
#[derive(Clone)]
pub struct ReceivingService {
    db: PgPool,
}

/// Purchase order header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub ordered_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase order line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub barcode: Option<String>,
    pub ordered_quantity: i32,
    pub received_quantity: i32,
    pub unit_cost: Option<Decimal>,
}

/// Order with its lines
#[derive(Debug, Serialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub supplier_id: Uuid,
    pub order_number: String,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    pub ordered_quantity: i32,
    pub unit_cost: Option<Decimal>,
}

/// Input for updating an order header
#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Per-line receiving quantities for the receive operation
#[derive(Debug, Deserialize)]
pub struct ReceiveInput {
    pub lines: Vec<ReceiveLineInput>,
    /// Optional new location applied to the received products
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Outcome of matching a scanned barcode during intake
#[derive(Debug, Serialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum IntakeMatch {
    /// The code matched a line on the active order
    ActiveOrderLine {
        item_id: Uuid,
        product_id: Uuid,
        remaining: i32,
    },
    /// The code matched a line on another open order; the caller should
    /// switch to that order
    OtherOrder { order_id: Uuid, item_id: Uuid },
}

impl ReceivingService {
    /// Create a new ReceivingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase order with its lines
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<PurchaseOrderDetail> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A purchase order needs at least one line".to_string(),
            });
        }
        for item in &input.items {
            if item.ordered_quantity <= 0 {
                return Err(AppError::Validation {
                    field: "ordered_quantity".to_string(),
                    message: "Ordered quantity must be positive".to_string(),
                });
            }
        }

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (supplier_id, order_number, expected_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, order_number, status, ordered_date, expected_date,
                      notes, created_by, created_at, updated_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(&input.order_number)
        .bind(input.expected_date)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("order_number".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            // Line barcode comes from the product so scanned codes match
            let line = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                INSERT INTO purchase_order_items (order_id, product_id, barcode, ordered_quantity, unit_cost)
                SELECT $1, p.id, p.barcode, $3, $4
                FROM products p WHERE p.id = $2
                RETURNING id, order_id, product_id, barcode, ordered_quantity, received_quantity, unit_cost
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.ordered_quantity)
            .bind(item.unit_cost)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            items.push(line);
        }

        tx.commit().await?;

        Ok(PurchaseOrderDetail { order, items })
    }

    /// List purchase orders, optionally restricted to open ones
    pub async fn list_orders(&self, open_only: bool) -> AppResult<Vec<PurchaseOrder>> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, supplier_id, order_number, status, ordered_date, expected_date,
                   notes, created_by, created_at, updated_at
            FROM purchase_orders
            WHERE NOT $1 OR status IN ('pending', 'partially_received')
            ORDER BY ordered_date DESC, created_at DESC
            "#,
        )
        .bind(open_only)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Get an order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<PurchaseOrderDetail> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, supplier_id, order_number, status, ordered_date, expected_date,
                   notes, created_by, created_at, updated_at
            FROM purchase_orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let items = self.order_items(order_id).await?;

        Ok(PurchaseOrderDetail { order, items })
    }

    /// Update an order's expected date or notes
    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: UpdateOrderInput,
    ) -> AppResult<PurchaseOrderDetail> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders
            SET expected_date = COALESCE($2, expected_date),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, supplier_id, order_number, status, ordered_date, expected_date,
                      notes, created_by, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(input.expected_date)
        .bind(&input.notes)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let items = self.order_items(order_id).await?;

        Ok(PurchaseOrderDetail { order, items })
    }

    /// Cancel an order that has not received anything yet
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let detail = self.get_order(order_id).await?;

        if detail.items.iter().any(|i| i.received_quantity > 0) {
            return Err(AppError::InvalidStateTransition(
                "Cannot cancel an order that has already received stock".to_string(),
            ));
        }
        if detail.order.status == PurchaseOrderStatus::Cancelled.as_str() {
            return Err(AppError::InvalidStateTransition(
                "Order is already cancelled".to_string(),
            ));
        }

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING id, supplier_id, order_number, status, ordered_date, expected_date,
                      notes, created_by, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        Ok(order)
    }

    /// Receive stock against an order.
    ///
    /// For each line: validates the quantity against `ordered - received`,
    /// advances the line counter, increments product stock, and appends a
    /// stock transaction. The order status is recomputed from the resulting
    /// line fills. Everything happens in one transaction.
    pub async fn receive(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        input: ReceiveInput,
    ) -> AppResult<PurchaseOrderDetail> {
        let detail = self.get_order(order_id).await?;

        if detail.order.status == PurchaseOrderStatus::Cancelled.as_str() {
            return Err(AppError::InvalidStateTransition(
                "Cannot receive against a cancelled order".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        for line in &input.lines {
            if line.quantity <= 0 {
                continue;
            }

            let item = detail
                .items
                .iter()
                .find(|i| i.id == line.item_id)
                .ok_or_else(|| AppError::NotFound("Purchase order line".to_string()))?;

            let fill = LineFill {
                ordered: item.ordered_quantity,
                received: item.received_quantity,
            };
            if line.quantity > fill.remaining() {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: format!(
                        "Receiving {} exceeds remaining {} on line {}",
                        line.quantity,
                        fill.remaining(),
                        item.id
                    ),
                });
            }

            sqlx::query(
                r#"
                UPDATE purchase_order_items
                SET received_quantity = received_quantity + $2
                WHERE id = $1
                "#,
            )
            .bind(line.item_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity + $2,
                    location = COALESCE($3, location),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(item.product_id)
            .bind(line.quantity)
            .bind(&input.location)
            .execute(&mut *tx)
            .await?;

            record_stock_transaction(
                &mut tx,
                item.product_id,
                StockTransactionKind::Receive,
                line.quantity,
                Some("purchase_order"),
                Some(order_id),
                None,
                Some(user_id),
            )
            .await?;
        }

        // Recompute order status from the updated line fills
        let fills = sqlx::query_as::<_, (i32, i32)>(
            "SELECT ordered_quantity, received_quantity FROM purchase_order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(ordered, received)| LineFill { ordered, received })
        .collect::<Vec<_>>();

        let status = derive_order_status(&fills);

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, supplier_id, order_number, status, ordered_date, expected_date,
                      notes, created_by, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let items = self.order_items(order_id).await?;

        Ok(PurchaseOrderDetail { order, items })
    }

    /// Match a scanned barcode during intake.
    ///
    /// The active order's lines are checked first; an unmatched code is then
    /// searched across all open orders so the caller can switch to the order
    /// it belongs to. Matching is by barcode equality only.
    pub async fn match_barcode(
        &self,
        active_order_id: Option<Uuid>,
        code: &str,
    ) -> AppResult<IntakeMatch> {
        if let Some(order_id) = active_order_id {
            let line = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                SELECT id, order_id, product_id, barcode, ordered_quantity, received_quantity, unit_cost
                FROM purchase_order_items
                WHERE order_id = $1 AND barcode = $2
                "#,
            )
            .bind(order_id)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;

            if let Some(line) = line {
                let fill = LineFill {
                    ordered: line.ordered_quantity,
                    received: line.received_quantity,
                };
                return Ok(IntakeMatch::ActiveOrderLine {
                    item_id: line.id,
                    product_id: line.product_id,
                    remaining: fill.remaining(),
                });
            }
        }

        let other = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT poi.order_id, poi.id
            FROM purchase_order_items poi
            JOIN purchase_orders po ON po.id = poi.order_id
            WHERE poi.barcode = $1
              AND po.status IN ('pending', 'partially_received')
              AND ($2::uuid IS NULL OR poi.order_id <> $2)
            ORDER BY po.ordered_date
            LIMIT 1
            "#,
        )
        .bind(code)
        .bind(active_order_id)
        .fetch_optional(&self.db)
        .await?;

        match other {
            Some((order_id, item_id)) => Ok(IntakeMatch::OtherOrder { order_id, item_id }),
            None => Err(AppError::NotFound("Barcode".to_string())),
        }
    }

    /// Receive a single scanned unit against an order line, capped at the
    /// line's remaining quantity
    pub async fn receive_scanned(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<PurchaseOrderDetail> {
        let detail = self.get_order(order_id).await?;
        let item = detail
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound("Purchase order line".to_string()))?;

        let fill = LineFill {
            ordered: item.ordered_quantity,
            received: item.received_quantity,
        };
        let quantity = clamp_receiving(fill, 1);
        if quantity == 0 {
            return Err(AppError::Conflict(
                "Line is already fully received".to_string(),
            ));
        }

        self.receive(
            order_id,
            user_id,
            ReceiveInput {
                lines: vec![ReceiveLineInput { item_id, quantity }],
                location: None,
            },
        )
        .await
    }

    async fn order_items(&self, order_id: Uuid) -> AppResult<Vec<PurchaseOrderItem>> {
        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            SELECT id, order_id, product_id, barcode, ordered_quantity, received_quantity, unit_cost
            FROM purchase_order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }
}
