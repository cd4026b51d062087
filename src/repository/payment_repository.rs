use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentMethod},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    order_id: String,
    user_id: String,
    payment_method: String,
    gateway_token: Option<String>,
    confirmed: i32,
    amount: i64,
    confirmed_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            order_id: Uuid::parse_str(&row.order_id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            payment_method: PaymentMethod::from_str(&row.payment_method).ok_or_else(|| {
                AppError::Database(format!("Invalid payment method: {}", row.payment_method))
            })?,
            gateway_token: row.gateway_token,
            confirmed: row.confirmed != 0,
            amount: row.amount,
            confirmed_at: row.confirmed_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn find_where(&self, column: &'static str, value: String) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            &format!(
                r#"
                SELECT id, order_id, user_id, payment_method, gateway_token,
                       confirmed, amount, confirmed_at, created_at, updated_at
                FROM payments
                WHERE {} = ?
                ORDER BY created_at DESC
                LIMIT 1
                "#,
                column
            )
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        self.find_where("id", id.to_string()).await
    }

    async fn find_by_order(&self, order_id: Uuid) -> Result<Option<Payment>> {
        self.find_where("order_id", order_id.to_string()).await
    }

    async fn find_by_gateway_token(&self, token: &str) -> Result<Option<Payment>> {
        // Any token ever issued for the payment identifies it, not only the latest.
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.id, p.order_id, p.user_id, p.payment_method, p.gateway_token,
                   p.confirmed, p.amount, p.confirmed_at, p.created_at, p.updated_at
            FROM payments p
            JOIN payment_gateway_tokens t ON t.payment_id = p.id
            WHERE t.token = ?
            "#
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn record_gateway_token(&self, id: Uuid, method: PaymentMethod, token: &str) -> Result<Payment> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_method = ?,
                gateway_token = ?,
                updated_at = ?
            WHERE id = ? AND confirmed = 0
            "#
        )
        .bind(method.as_str())
        .bind(token)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation("Payment already confirmed".to_string()));
        }

        sqlx::query(
            "INSERT INTO payment_gateway_tokens (token, payment_id, created_at) VALUES (?, ?, ?)"
        )
        .bind(token)
        .bind(id.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated payment".to_string())
        })
    }
}

pub async fn insert_payment(conn: &mut SqliteConnection, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, order_id, user_id, payment_method, gateway_token,
            confirmed, amount, confirmed_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(payment.id.to_string())
    .bind(payment.order_id.to_string())
    .bind(payment.user_id.to_string())
    .bind(payment.payment_method.as_str())
    .bind(&payment.gateway_token)
    .bind(if payment.confirmed { 1i32 } else { 0i32 })
    .bind(payment.amount)
    .bind(payment.confirmed_at.map(|dt| dt.naive_utc()))
    .bind(payment.created_at.naive_utc())
    .bind(payment.updated_at.naive_utc())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Flips a payment to confirmed, recording the method it was settled with.
///
/// Returns `false` when the payment was already confirmed, leaving it as is.
pub async fn mark_confirmed(
    conn: &mut SqliteConnection,
    payment_id: Uuid,
    method: PaymentMethod,
) -> Result<bool> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET confirmed = 1,
            payment_method = ?,
            confirmed_at = ?,
            updated_at = ?
        WHERE id = ? AND confirmed = 0
        "#
    )
    .bind(method.as_str())
    .bind(now)
    .bind(now)
    .bind(payment_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
