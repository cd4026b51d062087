use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Coupon, CreateCouponRequest},
    error::{AppError, Result},
    repository::CouponRepository,
};

#[derive(FromRow)]
struct CouponRow {
    id: String,
    code: String,
    discount_percent: i64,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteCouponRepository {
    pool: SqlitePool,
}

impl SqliteCouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_coupon(row: CouponRow) -> Result<Coupon> {
        Ok(Coupon {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            code: row.code,
            discount_percent: row.discount_percent,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl CouponRepository for SqliteCouponRepository {
    async fn create(&self, request: CreateCouponRequest) -> Result<Coupon> {
        if !(1..=100).contains(&request.discount_percent) {
            return Err(AppError::Validation(
                "Discount percent must be between 1 and 100".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let code = Coupon::normalize_code(&request.code);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_percent, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&code)
        .bind(request.discount_percent)
        .bind(if request.is_active { 1i32 } else { 0i32 })
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_code(&code).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created coupon".to_string())
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, discount_percent, is_active, created_at, updated_at
            FROM coupons
            WHERE code = ?
            "#
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_coupon).transpose()
    }
}
