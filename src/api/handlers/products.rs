use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{extract::{Json, Path, Query}, state::AppState},
    domain::Product,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i64,
    pub is_featured: bool,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            is_featured: product.is_featured,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductDto>>> {
    let products = state.service_context.product_repo
        .list(params.limit.clamp(1, 200), params.offset.max(0))
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>> {
    let products = state.service_context.product_repo.list_featured().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDto>> {
    let product = state.service_context.product_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

    Ok(Json(product.into()))
}
