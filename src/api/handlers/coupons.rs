use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{extract::Json, middleware::auth::CurrentUser, state::AppState},
    domain::Coupon,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct CouponCheckRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CouponDto {
    id: Uuid,
    code: String,
    discount_percent: i64,
    is_active: bool,
}

impl From<Coupon> for CouponDto {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            discount_percent: coupon.discount_percent,
            is_active: coupon.is_active,
        }
    }
}

pub async fn check(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(request): Json<CouponCheckRequest>,
) -> Result<Json<CouponDto>> {
    let coupon = state.service_context.coupon_service
        .validate(&request.code)
        .await?;

    Ok(Json(coupon.into()))
}
