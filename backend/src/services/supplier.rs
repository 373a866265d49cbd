//! Supplier service
//!
//! Supplier records, payments made to suppliers, and the per-supplier
//! statement of received purchase-order value versus payments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_phone, validate_positive_amount};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment made to a supplier
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierPayment {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Received-value versus payments for one supplier
#[derive(Debug, Serialize)]
pub struct SupplierStatement {
    pub supplier: Supplier,
    /// Value of goods received across this supplier's orders, at line cost
    pub received_value: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
}

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for recording a payment
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

const SUPPLIER_COLUMNS: &str =
    "id, name, contact_person, phone, email, address, is_active, created_at, updated_at";

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers, optionally including deactivated ones
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM suppliers
            WHERE $1 OR is_active = true
            ORDER BY name
            "#,
        ))
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Get a supplier by id
    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1",
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Create a supplier
    pub async fn create(&self, input: SupplierInput) -> AppResult<Supplier> {
        Self::check_input(&input)?;

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SUPPLIER_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Update a supplier
    pub async fn update(&self, supplier_id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        Self::check_input(&input)?;

        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $2, contact_person = $3, phone = $4, email = $5, address = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#,
        ))
        .bind(supplier_id)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Deactivate a supplier (kept for history, hidden from pickers)
    pub async fn deactivate(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#,
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Record a payment to a supplier
    pub async fn record_payment(
        &self,
        supplier_id: Uuid,
        user_id: Uuid,
        input: PaymentInput,
    ) -> AppResult<SupplierPayment> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        self.get(supplier_id).await?;

        let payment = sqlx::query_as::<_, SupplierPayment>(
            r#"
            INSERT INTO supplier_payments
                (supplier_id, amount, payment_date, method, reference, notes, created_by)
            VALUES ($1, $2, COALESCE($3, CURRENT_DATE), $4, $5, $6, $7)
            RETURNING id, supplier_id, amount, payment_date, method, reference, notes,
                      created_by, created_at
            "#,
        )
        .bind(supplier_id)
        .bind(input.amount)
        .bind(input.payment_date)
        .bind(&input.method)
        .bind(&input.reference)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(payment)
    }

    /// Payments to a supplier, newest first
    pub async fn list_payments(&self, supplier_id: Uuid) -> AppResult<Vec<SupplierPayment>> {
        self.get(supplier_id).await?;

        let payments = sqlx::query_as::<_, SupplierPayment>(
            r#"
            SELECT id, supplier_id, amount, payment_date, method, reference, notes,
                   created_by, created_at
            FROM supplier_payments
            WHERE supplier_id = $1
            ORDER BY payment_date DESC, created_at DESC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }

    /// Statement for a supplier: received order value against payments.
    ///
    /// Received value counts only quantities actually received, at the
    /// line's unit cost; lines without a cost contribute nothing.
    pub async fn statement(&self, supplier_id: Uuid) -> AppResult<SupplierStatement> {
        let supplier = self.get(supplier_id).await?;

        let received_value = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(poi.received_quantity * poi.unit_cost), 0)
            FROM purchase_order_items poi
            JOIN purchase_orders po ON po.id = poi.order_id
            WHERE po.supplier_id = $1 AND poi.unit_cost IS NOT NULL
            "#,
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        let total_paid = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM supplier_payments WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(SupplierStatement {
            supplier,
            received_value,
            total_paid,
            outstanding: received_value - total_paid,
        })
    }

    fn check_input(input: &SupplierInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name is required".to_string(),
            });
        }
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }
        Ok(())
    }
}
