use axum::{
    extract::{Extension, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{extract::{Json, Path}, middleware::auth::CurrentUser, state::AppState},
    domain::{CreateShippingRequest, ShippingDetails, UpdateShippingRequest},
    error::Result,
};

#[derive(Debug, Clone, Serialize)]
pub struct ShippingDto {
    pub id: Uuid,
    pub address: String,
    pub city: String,
    pub province: String,
    pub phone: String,
}

impl From<ShippingDetails> for ShippingDto {
    fn from(details: ShippingDetails) -> Self {
        Self {
            id: details.id,
            address: details.address,
            city: details.city,
            province: details.province,
            phone: details.phone,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ShippingDto>>> {
    let details = state.service_context.shipping_service
        .list(current.user.id)
        .await?;

    Ok(Json(details.into_iter().map(Into::into).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateShippingRequest>,
) -> Result<(StatusCode, Json<ShippingDto>)> {
    let details = state.service_context.shipping_service
        .create(current.user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(details.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateShippingRequest>,
) -> Result<Json<ShippingDto>> {
    let details = state.service_context.shipping_service
        .update(current.user.id, id, update)
        .await?;

    Ok(Json(details.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.service_context.shipping_service
        .delete(current.user.id, id)
        .await?;

    Ok(Json(json!({ "message": "Shipping details deleted" })))
}
