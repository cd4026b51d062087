use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CreateProductRequest, Product},
    error::{AppError, Result},
    repository::ProductRepository,
};

#[derive(FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    price: i64,
    quantity: i64,
    is_featured: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: ProductRow) -> Result<Product> {
        Ok(Product {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            is_featured: row.is_featured != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn create(&self, request: CreateProductRequest) -> Result<Product> {
        if request.price < 0 || request.quantity < 0 {
            return Err(AppError::Validation(
                "Price and quantity must not be negative".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, quantity, is_featured,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.quantity)
        .bind(if request.is_featured { 1i32 } else { 0i32 })
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created product".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, quantity, is_featured,
                   created_at, updated_at
            FROM products
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, quantity, is_featured,
                   created_at, updated_at
            FROM products
            ORDER BY created_at DESC, name ASC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_product)
            .collect()
    }

    async fn list_featured(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, quantity, is_featured,
                   created_at, updated_at
            FROM products
            WHERE is_featured = 1
            ORDER BY name ASC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_product)
            .collect()
    }
}

/// Takes `quantity` units out of stock if that many are available.
///
/// The availability check and the decrement are one statement, so callers
/// inside a transaction never race another checkout for the same units.
/// Returns `false` when the product is missing or short on stock.
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: Uuid,
    quantity: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity - ?,
            updated_at = ?
        WHERE id = ? AND quantity >= ?
        "#
    )
    .bind(quantity)
    .bind(Utc::now().naive_utc())
    .bind(product_id.to_string())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
