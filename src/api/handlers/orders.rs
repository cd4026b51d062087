use axum::extract::{Extension, State};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{
        extract::{Json, Query},
        handlers::{payments::PaymentDto, shipping::ShippingDto},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{DeliveryStatus, OrderDetails, OrderFilter, OrderLine, OrderStatus},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    id: Uuid,
    product: OrderItemProductDto,
    quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderItemProductDto {
    id: Uuid,
    name: String,
    price: i64,
}

impl From<OrderLine> for OrderItemDto {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            product: OrderItemProductDto {
                id: line.product_id,
                name: line.product_name,
                price: line.unit_price,
            },
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    id: Uuid,
    shipping_details: ShippingDto,
    order_items: Vec<OrderItemDto>,
    coupon_id: Option<Uuid>,
    total_amount: i64,
    discount_amount: i64,
    final_amount: i64,
    order_status: OrderStatus,
    delivery_status: DeliveryStatus,
    payment: Option<PaymentDto>,
    created_at: String,
}

impl From<OrderDetails> for OrderDto {
    fn from(details: OrderDetails) -> Self {
        let OrderDetails { order, shipping, lines, payment } = details;
        Self {
            id: order.id,
            shipping_details: shipping.into(),
            order_items: lines.into_iter().map(Into::into).collect(),
            coupon_id: order.coupon_id,
            total_amount: order.total_amount,
            discount_amount: order.discount_amount,
            final_amount: order.final_amount,
            order_status: order.order_status,
            delivery_status: order.delivery_status,
            payment: payment.map(Into::into),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// Lists the caller's orders, optionally narrowed by `order_status` and
/// `delivery_status`. Any other query parameter is rejected.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderDto>>> {
    let orders = state.service_context.order_repo
        .list_for_user(current.user.id, filter)
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}
