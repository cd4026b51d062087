use axum::{
    extract::{Extension, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{extract::{Json, Path}, middleware::auth::CurrentUser, state::AppState},
    domain::{AddToCartRequest, CartLine, UpdateCartRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct CartProductDto {
    id: Uuid,
    name: String,
    price: i64,
}

#[derive(Debug, Serialize)]
pub struct CartItemDto {
    id: Uuid,
    product: CartProductDto,
    quantity: i64,
    total_price: i64,
    available: bool,
}

impl From<CartLine> for CartItemDto {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            product: CartProductDto {
                id: line.product_id,
                name: line.product_name,
                price: line.unit_price,
            },
            quantity: line.quantity,
            total_price: line.total_price,
            available: line.available,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<CartItemDto>>> {
    let lines = state.service_context.cart_service
        .list(current.user.id)
        .await?;

    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItemDto>)> {
    let line = state.service_context.cart_service
        .add(current.user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(line.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartItemDto>> {
    let line = state.service_context.cart_service
        .update(current.user.id, id, request)
        .await?;

    Ok(Json(line.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.service_context.cart_service
        .remove(current.user.id, id)
        .await?;

    Ok(Json(json!({ "message": "Product removed from cart" })))
}
