use axum::{
    extract::{Extension, State},
    http::StatusCode,
};

use crate::{
    api::{extract::Json, handlers::orders::OrderDto, middleware::auth::CurrentUser, state::AppState},
    domain::CheckoutRequest,
    error::Result,
};

pub async fn checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDto>)> {
    let order = state.service_context.checkout_service
        .checkout(current.user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}
