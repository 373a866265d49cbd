//! Customer and storefront inquiry service
//!
//! Customers are back-office records used by sales and wallets. Inquiries
//! come in unauthenticated from the storefront cart and are worked by staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_email, validate_phone};

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storefront inquiry header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Inquiry line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InquiryItem {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Inquiry with its lines
#[derive(Debug, Serialize)]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub items: Vec<InquiryItem>,
}

/// Input for creating or updating a customer
#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Unauthenticated inquiry submission from the storefront
#[derive(Debug, Deserialize)]
pub struct CreateInquiryInput {
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub items: Vec<CreateInquiryItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInquiryItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

const INQUIRY_STATUSES: &[&str] = &["new", "contacted", "closed"];

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List customers, optionally matching a name/phone/email search
    pub async fn list(&self, q: Option<&str>) -> AppResult<Vec<Customer>> {
        let pattern = q.map(|q| format!("%{}%", q));

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at, updated_at
            FROM customers
            WHERE $1::text IS NULL
               OR name ILIKE $1 OR phone ILIKE $1 OR email ILIKE $1
            ORDER BY name
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Get a customer by id
    pub async fn get(&self, customer_id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at, updated_at
            FROM customers WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Create a customer
    pub async fn create(&self, input: CustomerInput) -> AppResult<Customer> {
        Self::check_contact(&input.name, input.phone.as_deref(), input.email.as_deref())?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, email, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// Update a customer
    pub async fn update(&self, customer_id: Uuid, input: CustomerInput) -> AppResult<Customer> {
        Self::check_contact(&input.name, input.phone.as_deref(), input.email.as_deref())?;

        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, email = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, phone, email, address, created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Create an inquiry from the storefront cart.
    ///
    /// Every referenced product must exist and be visible in the storefront.
    pub async fn create_inquiry(&self, input: CreateInquiryInput) -> AppResult<InquiryDetail> {
        Self::check_contact(
            &input.customer_name,
            input.phone.as_deref(),
            input.email.as_deref(),
        )?;
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "An inquiry needs at least one item".to_string(),
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

        let mut tx = self.db.begin().await?;

        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (customer_name, phone, email, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_name, phone, email, message, status, created_at
            "#,
        )
        .bind(&input.customer_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.message)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let line = sqlx::query_as::<_, InquiryItem>(
                r#"
                INSERT INTO inquiry_items (inquiry_id, product_id, quantity)
                SELECT $1, p.id, $3
                FROM products p
                WHERE p.id = $2 AND p.is_active = true
                RETURNING id, inquiry_id, product_id, quantity
                "#,
            )
            .bind(inquiry.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            items.push(line);
        }

        tx.commit().await?;

        Ok(InquiryDetail { inquiry, items })
    }

    /// List inquiries, optionally filtered by status, newest first
    pub async fn list_inquiries(&self, status: Option<&str>) -> AppResult<Vec<Inquiry>> {
        let inquiries = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT id, customer_name, phone, email, message, status, created_at
            FROM inquiries
            WHERE $1::text IS NULL OR status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(inquiries)
    }

    /// Get an inquiry with its lines
    pub async fn get_inquiry(&self, inquiry_id: Uuid) -> AppResult<InquiryDetail> {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT id, customer_name, phone, email, message, status, created_at
            FROM inquiries WHERE id = $1
            "#,
        )
        .bind(inquiry_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inquiry".to_string()))?;

        let items = sqlx::query_as::<_, InquiryItem>(
            r#"
            SELECT id, inquiry_id, product_id, quantity
            FROM inquiry_items
            WHERE inquiry_id = $1
            ORDER BY id
            "#,
        )
        .bind(inquiry_id)
        .fetch_all(&self.db)
        .await?;

        Ok(InquiryDetail { inquiry, items })
    }

    /// Move an inquiry to a new workflow status
    pub async fn update_inquiry_status(&self, inquiry_id: Uuid, status: &str) -> AppResult<Inquiry> {
        if !INQUIRY_STATUSES.contains(&status) {
            return Err(AppError::Validation {
                field: "status".to_string(),
                message: format!("Status must be one of: {}", INQUIRY_STATUSES.join(", ")),
            });
        }

        sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries SET status = $2
            WHERE id = $1
            RETURNING id, customer_name, phone, email, message, status, created_at
            "#,
        )
        .bind(inquiry_id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inquiry".to_string()))
    }

    fn check_contact(name: &str, phone: Option<&str>, email: Option<&str>) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        if let Some(phone) = phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(email) = email {
            validate_email(email).map_err(|msg| AppError::Validation {
                field: "email".to_string(),
                message: msg.to_string(),
            })?;
        }
        Ok(())
    }
}
