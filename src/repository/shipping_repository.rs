use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CreateShippingRequest, ShippingDetails, UpdateShippingRequest},
    error::{AppError, Result},
    repository::ShippingRepository,
};

#[derive(FromRow)]
struct ShippingRow {
    id: String,
    user_id: String,
    address: String,
    city: String,
    province: String,
    phone: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteShippingRepository {
    pool: SqlitePool,
}

impl SqliteShippingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_shipping(row: ShippingRow) -> Result<ShippingDetails> {
        Ok(ShippingDetails {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            address: row.address,
            city: row.city,
            province: row.province,
            phone: row.phone,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl ShippingRepository for SqliteShippingRepository {
    async fn create(&self, user_id: Uuid, request: CreateShippingRequest) -> Result<ShippingDetails> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO shipping_details (
                id, user_id, address, city, province, phone, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.province)
        .bind(&request.phone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(user_id, id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created shipping details".to_string())
        })
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<ShippingDetails>> {
        let row = sqlx::query_as::<_, ShippingRow>(
            r#"
            SELECT id, user_id, address, city, province, phone, created_at, updated_at
            FROM shipping_details
            WHERE id = ? AND user_id = ?
            "#
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_shipping).transpose()
    }

    async fn find_by_phone(&self, user_id: Uuid, phone: &str) -> Result<Option<ShippingDetails>> {
        // A user may save the same phone on several addresses; the newest wins.
        let row = sqlx::query_as::<_, ShippingRow>(
            r#"
            SELECT id, user_id, address, city, province, phone, created_at, updated_at
            FROM shipping_details
            WHERE user_id = ? AND phone = ?
            ORDER BY updated_at DESC
            LIMIT 1
            "#
        )
        .bind(user_id.to_string())
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_shipping).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ShippingDetails>> {
        let rows = sqlx::query_as::<_, ShippingRow>(
            r#"
            SELECT id, user_id, address, city, province, phone, created_at, updated_at
            FROM shipping_details
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_shipping)
            .collect()
    }

    async fn update(&self, user_id: Uuid, id: Uuid, update: UpdateShippingRequest) -> Result<ShippingDetails> {
        let result = sqlx::query(
            r#"
            UPDATE shipping_details
            SET address = COALESCE(?, address),
                city = COALESCE(?, city),
                province = COALESCE(?, province),
                phone = COALESCE(?, phone),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#
        )
        .bind(&update.address)
        .bind(&update.city)
        .bind(&update.province)
        .bind(&update.phone)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shipping details not found".to_string()));
        }

        self.find_by_id(user_id, id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated shipping details".to_string())
        })
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM shipping_details WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.message().contains("FOREIGN KEY") => {
                    AppError::Validation(
                        "Shipping details are referenced by an order".to_string(),
                    )
                }
                other => AppError::from(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shipping details not found".to_string()));
        }

        Ok(())
    }
}
