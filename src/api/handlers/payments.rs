use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::{extract::{Json, Query}, middleware::auth::CurrentUser, state::AppState},
    domain::{Payment, PaymentMethod, PaymentOutcome, PaymentRequest},
    error::Result,
};

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDto {
    id: Uuid,
    order: Uuid,
    payment_method: PaymentMethod,
    confirmed: bool,
    amount: i64,
    confirmed_at: Option<String>,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            order: payment.order_id,
            payment_method: payment.payment_method,
            confirmed: payment.confirmed,
            amount: payment.amount,
            confirmed_at: payment.confirmed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    #[serde(alias = "pidx")]
    token: Option<String>,
}

/// Cash on delivery settles immediately and returns the payment; wallet
/// payments return the gateway URL the buyer must visit.
pub async fn pay(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<PaymentRequest>,
) -> Result<Response> {
    let outcome = state.service_context.payment_service
        .initiate(current.user.id, request.payment_id, request.payment_method)
        .await?;

    Ok(match outcome {
        PaymentOutcome::Confirmed(payment) => Json(PaymentDto::from(payment)).into_response(),
        PaymentOutcome::Redirect { url, .. } => Json(json!({ "url": url })).into_response(),
    })
}

/// Return leg of the wallet gateway. Public: the buyer's browser lands
/// here straight from the gateway.
pub async fn confirm(
    State(state): State<AppState>,
    Query(params): Query<ConfirmParams>,
) -> Result<Json<serde_json::Value>> {
    state.service_context.payment_service
        .confirm_callback(params.token.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(json!({ "message": "Payment successful" })))
}
