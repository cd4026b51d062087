use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod khalti_client;

pub use khalti_client::KhaltiClient;

/// What the coordinator asks the wallet gateway to collect.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub amount: i64,
    pub order_id: Uuid,
    pub order_label: String,
}

/// A started gateway payment: where to send the buyer, and the token the
/// gateway will hand back on the return redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayInitiation {
    pub token: String,
    pub redirect_url: String,
}

/// The gateway could not start a payment. Carries no transport detail.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("payment gateway request failed")]
pub struct GatewayError;

impl From<GatewayError> for crate::error::AppError {
    fn from(_: GatewayError) -> Self {
        crate::error::AppError::Gateway
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: GatewayRequest) -> Result<GatewayInitiation, GatewayError>;
}

/// Stand-in used when no wallet gateway is configured.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn initiate(&self, request: GatewayRequest) -> Result<GatewayInitiation, GatewayError> {
        tracing::warn!("Wallet payment requested for order {} but the gateway is disabled", request.order_id);
        Err(GatewayError)
    }
}
