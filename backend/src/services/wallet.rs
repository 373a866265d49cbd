//! Customer wallet service
//!
//! Store-credit wallets with an append-only transaction ledger. Withdrawals
//! are guarded in SQL (`balance >= amount`) so the balance can never go
//! negative, and every mutation writes its ledger row in the same
//! transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::WalletTransactionKind;
use shared::validation::validate_positive_amount;

/// Wallet service
#[derive(Clone)]
pub struct WalletService {
    db: PgPool,
}

/// A customer's store-credit wallet
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for a deposit or withdrawal
#[derive(Debug, Deserialize)]
pub struct WalletMovementInput {
    pub amount: Decimal,
    pub notes: Option<String>,
}

impl WalletService {
    /// Create a new WalletService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a customer's wallet
    pub async fn get(&self, customer_id: Uuid) -> AppResult<Wallet> {
        sqlx::query_as::<_, Wallet>(
            r#"
            SELECT id, customer_id, balance, created_at, updated_at
            FROM customer_wallets
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Wallet".to_string()))
    }

    /// Deposit store credit.
    ///
    /// The wallet is created on first deposit.
    pub async fn deposit(
        &self,
        customer_id: Uuid,
        user_id: Uuid,
        input: WalletMovementInput,
    ) -> AppResult<WalletTransaction> {
        Self::check_amount(input.amount)?;

        let customer_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(customer_id)
                .fetch_one(&self.db)
                .await?;
        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let (wallet_id, balance_after) = sqlx::query_as::<_, (Uuid, Decimal)>(
            r#"
            INSERT INTO customer_wallets (customer_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (customer_id)
            DO UPDATE SET balance = customer_wallets.balance + $2, updated_at = NOW()
            RETURNING id, balance
            "#,
        )
        .bind(customer_id)
        .bind(input.amount)
        .fetch_one(&mut *tx)
        .await?;

        let entry = Self::append_ledger(
            &mut tx,
            wallet_id,
            WalletTransactionKind::Deposit,
            input.amount,
            balance_after,
            input.notes.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        Ok(entry)
    }

    /// Withdraw store credit.
    ///
    /// Fails with InsufficientBalance when the wallet does not cover the
    /// amount; the check and the debit are a single conditional UPDATE.
    pub async fn withdraw(
        &self,
        customer_id: Uuid,
        user_id: Uuid,
        input: WalletMovementInput,
    ) -> AppResult<WalletTransaction> {
        Self::check_amount(input.amount)?;

        // Distinguish a missing wallet from an underfunded one
        let wallet = self.get(customer_id).await?;

        let mut tx = self.db.begin().await?;

        let balance_after = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE customer_wallets
            SET balance = balance - $2, updated_at = NOW()
            WHERE id = $1 AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(wallet.id)
        .bind(input.amount)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::InsufficientBalance)?;

        let entry = Self::append_ledger(
            &mut tx,
            wallet.id,
            WalletTransactionKind::Withdrawal,
            input.amount,
            balance_after,
            input.notes.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        Ok(entry)
    }

    /// Ledger for a customer's wallet, newest first
    pub async fn ledger(&self, customer_id: Uuid) -> AppResult<Vec<WalletTransaction>> {
        let wallet = self.get(customer_id).await?;

        let entries = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, wallet_id, kind, amount, balance_after, notes, created_by, created_at
            FROM wallet_transactions
            WHERE wallet_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(wallet.id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    fn check_amount(amount: Decimal) -> AppResult<()> {
        validate_positive_amount(amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })
    }

    async fn append_ledger(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        wallet_id: Uuid,
        kind: WalletTransactionKind,
        amount: Decimal,
        balance_after: Decimal,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> AppResult<WalletTransaction> {
        let entry = sqlx::query_as::<_, WalletTransaction>(
            r#"
            INSERT INTO wallet_transactions (wallet_id, kind, amount, balance_after, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, wallet_id, kind, amount, balance_after, notes, created_by, created_at
            "#,
        )
        .bind(wallet_id)
        .bind(kind.as_str())
        .bind(amount)
        .bind(balance_after)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(entry)
    }
}
