use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{
        DeliveryStatus, Order, OrderDetails, OrderFilter, OrderItem, OrderLine, OrderStatus,
    },
    error::{AppError, Result},
    repository::{
        OrderRepository, PaymentRepository, ShippingRepository, SqlitePaymentRepository,
        SqliteShippingRepository,
    },
};

const ORDER_COLUMNS: &str = r#"
    id, user_id, shipping_details_id, coupon_id,
    total_amount, discount_amount, final_amount,
    order_status, delivery_status, created_at, updated_at
"#;

#[derive(FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    shipping_details_id: String,
    coupon_id: Option<String>,
    total_amount: i64,
    discount_amount: i64,
    final_amount: i64,
    order_status: String,
    delivery_status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct OrderLineRow {
    id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price: i64,
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: OrderRow) -> Result<Order> {
        Ok(Order {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            shipping_details_id: parse_uuid(&row.shipping_details_id)?,
            coupon_id: row.coupon_id.as_deref().map(parse_uuid).transpose()?,
            total_amount: row.total_amount,
            discount_amount: row.discount_amount,
            final_amount: row.final_amount,
            order_status: OrderStatus::from_str(&row.order_status).ok_or_else(|| {
                AppError::Database(format!("Invalid order status: {}", row.order_status))
            })?,
            delivery_status: DeliveryStatus::from_str(&row.delivery_status).ok_or_else(|| {
                AppError::Database(format!("Invalid delivery status: {}", row.delivery_status))
            })?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn lines_for(&self, order_id: Uuid) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT oi.id, oi.product_id, p.name AS product_name,
                   oi.quantity, oi.unit_price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ?
            ORDER BY oi.rowid ASC
            "#
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OrderLine {
                    id: parse_uuid(&row.id)?,
                    product_id: parse_uuid(&row.product_id)?,
                    product_name: row.product_name,
                    quantity: row.quantity,
                    unit_price: row.unit_price,
                })
            })
            .collect()
    }

    async fn assemble(&self, order: Order) -> Result<OrderDetails> {
        let shipping = SqliteShippingRepository::new(self.pool.clone())
            .find_by_id(order.user_id, order.shipping_details_id)
            .await?
            .ok_or_else(|| {
                AppError::Database(format!("Order {} has no shipping details", order.id))
            })?;
        let lines = self.lines_for(order.id).await?;
        let payment = SqlitePaymentRepository::new(self.pool.clone())
            .find_by_order(order.id)
            .await?;

        Ok(OrderDetails { order, shipping, lines, payment })
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            &format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_details(&self, id: Uuid) -> Result<Option<OrderDetails>> {
        match self.find_by_id(id).await? {
            Some(order) => Ok(Some(self.assemble(order).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid, filter: OrderFilter) -> Result<Vec<OrderDetails>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM orders WHERE user_id = ",
            ORDER_COLUMNS
        ));
        query.push_bind(user_id.to_string());

        // Only these columns are filterable.
        if let Some(status) = filter.order_status {
            query.push(" AND order_status = ").push_bind(status.as_str());
        }
        if let Some(status) = filter.delivery_status {
            query.push(" AND delivery_status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.assemble(Self::row_to_order(row)?).await?);
        }
        Ok(orders)
    }
}

pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
    sqlx::query(
        &format!("INSERT INTO orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)", ORDER_COLUMNS)
    )
    .bind(order.id.to_string())
    .bind(order.user_id.to_string())
    .bind(order.shipping_details_id.to_string())
    .bind(order.coupon_id.map(|id| id.to_string()))
    .bind(order.total_amount)
    .bind(order.discount_amount)
    .bind(order.final_amount)
    .bind(order.order_status.as_str())
    .bind(order.delivery_status.as_str())
    .bind(order.created_at.naive_utc())
    .bind(order.updated_at.naive_utc())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn insert_items(conn: &mut SqliteConnection, items: &[OrderItem]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, created_at, updated_at) ",
    );
    query.push_values(items, |mut row, item| {
        let created = item.created_at.naive_utc();
        row.push_bind(item.id.to_string())
            .push_bind(item.order_id.to_string())
            .push_bind(item.product_id.to_string())
            .push_bind(item.quantity)
            .push_bind(item.unit_price)
            .push_bind(created)
            .push_bind(created);
    });
    query.build().execute(&mut *conn).await?;

    Ok(())
}

/// Moves an order to CONFIRMED. Confirmed orders are left untouched.
pub async fn mark_confirmed(conn: &mut SqliteConnection, order_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE orders
        SET order_status = ?, updated_at = ?
        WHERE id = ? AND order_status = ?
        "#
    )
    .bind(OrderStatus::Confirmed.as_str())
    .bind(Utc::now().naive_utc())
    .bind(order_id.to_string())
    .bind(OrderStatus::Pending.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
