use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CartItem, CartLine},
    error::{AppError, Result},
    repository::CartRepository,
};

#[derive(FromRow)]
struct CartItemRow {
    id: String,
    user_id: String,
    product_id: String,
    quantity: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CartLineRow {
    id: String,
    product_id: String,
    product_name: String,
    unit_price: i64,
    quantity: i64,
    stock: i64,
}

const LINE_QUERY: &str = r#"
    SELECT c.id, c.product_id, p.name AS product_name, p.price AS unit_price,
           c.quantity, p.quantity AS stock
    FROM cart_items c
    JOIN products p ON p.id = c.product_id
"#;

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub struct SqliteCartRepository {
    pool: SqlitePool,
}

impl SqliteCartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: CartItemRow) -> Result<CartItem> {
        Ok(CartItem {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            product_id: parse_uuid(&row.product_id)?,
            quantity: row.quantity,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_line(row: CartLineRow) -> Result<CartLine> {
        Ok(CartLine {
            id: parse_uuid(&row.id)?,
            product_id: parse_uuid(&row.product_id)?,
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            total_price: row.unit_price.saturating_mul(row.quantity),
            available: row.stock >= row.quantity,
        })
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn upsert(&self, user_id: Uuid, product_id: Uuid, quantity: i64) -> Result<CartItem> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(product_id.to_string())
        .bind(quantity)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE user_id = ? AND product_id = ?
            "#
        )
        .bind(user_id.to_string())
        .bind(product_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_item(row)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<CartItem>> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE id = ? AND user_id = ?
            "#
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn find_line(&self, user_id: Uuid, id: Uuid) -> Result<Option<CartLine>> {
        let row = sqlx::query_as::<_, CartLineRow>(
            &format!("{} WHERE c.id = ? AND c.user_id = ?", LINE_QUERY)
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_line).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            &format!("{} WHERE c.user_id = ? ORDER BY c.created_at ASC", LINE_QUERY)
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_line)
            .collect()
    }

    async fn update_quantity(&self, user_id: Uuid, id: Uuid, quantity: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        )
        .bind(quantity)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        Ok(())
    }
}

/// Drops the given products from the user's cart, inside the caller's
/// checkout transaction.
pub async fn remove_products(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    product_ids: &[Uuid],
) -> Result<u64> {
    if product_ids.is_empty() {
        return Ok(0);
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("DELETE FROM cart_items WHERE user_id = ");
    query.push_bind(user_id.to_string());
    query.push(" AND product_id IN (");
    let mut ids = query.separated(", ");
    for id in product_ids {
        ids.push_bind(id.to_string());
    }
    ids.push_unseparated(")");

    let result = query.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}
