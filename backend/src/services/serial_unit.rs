//! Serial unit lifecycle service
//!
//! Registers barcode/serial-tagged inventory units, mutates their status and
//! location, and appends an audit row for every mutation. Also owns the
//! retention sweep that removes sold units after the retention window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;
use shared::models::{location_is_storefront, SerialUnitStatus};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_barcode;

/// Serial unit service
#[derive(Clone)]
pub struct SerialUnitService {
    db: PgPool,
}

/// A physically tracked inventory unit
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SerialUnit {
    pub id: Uuid,
    pub product_id: Uuid,
    pub serial_number: String,
    pub barcode: Option<String>,
    pub status: String,
    pub condition: String,
    pub location: Option<String>,
    pub cost: Option<Decimal>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
    pub sale_id: Option<Uuid>,
    pub sold_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit log entry for a unit mutation
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SerialUnitHistoryEntry {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

/// Input for registering units
#[derive(Debug, Deserialize)]
pub struct RegisterUnitsInput {
    pub product_id: Uuid,
    pub serial_numbers: Vec<String>,
    pub barcode: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub cost: Option<Decimal>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
}

/// Input for a status change
#[derive(Debug, Deserialize)]
pub struct ChangeStatusInput {
    pub status: SerialUnitStatus,
    pub notes: Option<String>,
}

/// Input for a location transfer
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub location: String,
    pub notes: Option<String>,
}

/// Filter for unit listings
#[derive(Debug, Default, Deserialize)]
pub struct UnitFilter {
    pub product_id: Option<Uuid>,
    pub status: Option<SerialUnitStatus>,
    pub location: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl UnitFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

const UNIT_COLUMNS: &str = "id, product_id, serial_number, barcode, status, condition, location, \
                            cost, warranty_start, warranty_end, sale_id, sold_date, created_at, updated_at";

impl SerialUnitService {
    /// Create a new SerialUnitService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register one or more units of a product
    pub async fn register(
        &self,
        user_id: Uuid,
        input: RegisterUnitsInput,
    ) -> AppResult<Vec<SerialUnit>> {
        if input.serial_numbers.is_empty() {
            return Err(AppError::Validation {
                field: "serial_numbers".to_string(),
                message: "At least one serial number is required".to_string(),
            });
        }
        for serial in &input.serial_numbers {
            validate_barcode(serial).map_err(|msg| AppError::Validation {
                field: "serial_numbers".to_string(),
                message: format!("'{}': {}", serial, msg),
            })?;
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let mut tx = self.db.begin().await?;
        let mut units = Vec::with_capacity(input.serial_numbers.len());

        for serial in &input.serial_numbers {
            let unit = sqlx::query_as::<_, SerialUnit>(&format!(
                r#"
                INSERT INTO serial_units
                    (product_id, serial_number, barcode, condition, location, cost,
                     warranty_start, warranty_end)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {UNIT_COLUMNS}
                "#,
            ))
            .bind(input.product_id)
            .bind(serial)
            .bind(&input.barcode)
            .bind(input.condition.as_deref().unwrap_or("new"))
            .bind(&input.location)
            .bind(input.cost)
            .bind(input.warranty_start)
            .bind(input.warranty_end)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::DuplicateEntry("serial_number".to_string())
                }
                _ => AppError::DatabaseError(e),
            })?;

            append_history(
                &mut tx,
                unit.id,
                "status",
                None,
                Some(unit.status.as_str()),
                Some("registered"),
                Some(user_id),
            )
            .await?;

            units.push(unit);
        }

        tx.commit().await?;

        Ok(units)
    }

    /// List units matching a filter, one page at a time
    pub async fn list(&self, filter: &UnitFilter) -> AppResult<PaginatedResponse<SerialUnit>> {
        let pagination = filter.pagination();

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM serial_units
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR location = $3)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(&filter.location)
        .fetch_one(&self.db)
        .await?;

        let units = sqlx::query_as::<_, SerialUnit>(&format!(
            r#"
            SELECT {UNIT_COLUMNS}
            FROM serial_units
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR location = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(filter.product_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(&filter.location)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: units,
            pagination: PaginationMeta::new(&pagination, total_items as u64),
        })
    }

    /// Get a unit by id
    pub async fn get(&self, unit_id: Uuid) -> AppResult<SerialUnit> {
        sqlx::query_as::<_, SerialUnit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM serial_units WHERE id = $1",
        ))
        .bind(unit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Serial unit".to_string()))
    }

    /// Look up a unit by scanned barcode or serial number (equality only)
    pub async fn find_by_code(&self, code: &str) -> AppResult<SerialUnit> {
        sqlx::query_as::<_, SerialUnit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM serial_units WHERE serial_number = $1 OR barcode = $1",
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Serial unit".to_string()))
    }

    /// Change a unit's status, appending the audit row in the same
    /// transaction. Marking a unit `sold` stamps its sold date.
    pub async fn change_status(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        input: ChangeStatusInput,
    ) -> AppResult<SerialUnit> {
        let current = self.get(unit_id).await?;
        let new_status = input.status;

        if current.status == new_status.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Unit is already {}",
                new_status
            )));
        }

        let mut tx = self.db.begin().await?;

        let unit = sqlx::query_as::<_, SerialUnit>(&format!(
            r#"
            UPDATE serial_units
            SET status = $2,
                sold_date = CASE WHEN $2 = 'sold' THEN NOW() ELSE sold_date END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {UNIT_COLUMNS}
            "#,
        ))
        .bind(unit_id)
        .bind(new_status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        append_history(
            &mut tx,
            unit_id,
            "status",
            Some(&current.status),
            Some(new_status.as_str()),
            input.notes.as_deref(),
            Some(user_id),
        )
        .await?;

        tx.commit().await?;

        Ok(unit)
    }

    /// Move a unit to a new location.
    ///
    /// If the destination name refers to the sales floor ("store"/"shop"),
    /// the owning product is made visible in the storefront catalog.
    pub async fn transfer(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        input: TransferInput,
    ) -> AppResult<SerialUnit> {
        let current = self.get(unit_id).await?;

        let mut tx = self.db.begin().await?;

        let unit = sqlx::query_as::<_, SerialUnit>(&format!(
            r#"
            UPDATE serial_units
            SET location = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {UNIT_COLUMNS}
            "#,
        ))
        .bind(unit_id)
        .bind(&input.location)
        .fetch_one(&mut *tx)
        .await?;

        append_history(
            &mut tx,
            unit_id,
            "location",
            current.location.as_deref(),
            Some(&input.location),
            input.notes.as_deref(),
            Some(user_id),
        )
        .await?;

        if location_is_storefront(&input.location) {
            sqlx::query(
                "UPDATE products SET is_active = true, updated_at = NOW() WHERE id = $1",
            )
            .bind(unit.product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(unit)
    }

    /// Audit history for a unit, newest first
    pub async fn history(&self, unit_id: Uuid) -> AppResult<Vec<SerialUnitHistoryEntry>> {
        // 404 for unknown units rather than an empty history
        self.get(unit_id).await?;

        let entries = sqlx::query_as::<_, SerialUnitHistoryEntry>(
            r#"
            SELECT id, unit_id, field, old_value, new_value, notes, changed_by, changed_at
            FROM serial_unit_history
            WHERE unit_id = $1
            ORDER BY changed_at DESC
            "#,
        )
        .bind(unit_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Delete sold units whose sold date is older than the retention window.
    /// Returns the number of units removed.
    pub async fn sweep_sold_units(&self, retention_days: i64) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(retention_days);

        let result = sqlx::query(
            "DELETE FROM serial_units WHERE status = 'sold' AND sold_date < $1",
        )
        .bind(cutoff)
        .execute(&self.db)
        .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            tracing::info!(removed, %cutoff, "retention sweep removed sold serial units");
        }

        Ok(removed)
    }
}

/// Spawn the periodic retention sweep task
pub fn spawn_retention_sweep(state: AppState) {
    let retention_days = state.config.store.sold_unit_retention_days;
    let interval = std::time::Duration::from_secs(state.config.store.retention_sweep_interval_secs);

    tokio::spawn(async move {
        let service = SerialUnitService::new(state.db.clone());
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = service.sweep_sold_units(retention_days).await {
                tracing::warn!("retention sweep failed: {}", e);
            }
        }
    });
}

/// Append a row to the append-only unit history log
async fn append_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    unit_id: Uuid,
    field: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    notes: Option<&str>,
    changed_by: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO serial_unit_history (unit_id, field, old_value, new_value, notes, changed_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(unit_id)
    .bind(field)
    .bind(old_value)
    .bind(new_value)
    .bind(notes)
    .bind(changed_by)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
