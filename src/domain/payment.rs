use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub payment_method: PaymentMethod,
    /// Correlation id issued by the wallet gateway, once initiation succeeds.
    pub gateway_token: Option<String>,
    pub confirmed: bool,
    pub amount: i64,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "WALLET", alias = "KHALTI")]
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Wallet => "WALLET",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "COD" => Some(PaymentMethod::Cod),
            "WALLET" | "KHALTI" => Some(PaymentMethod::Wallet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_id: Uuid,
    pub payment_method: PaymentMethod,
}

/// Result of asking to pay for an order.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// Settled on the spot (cash on delivery).
    Confirmed(Payment),
    /// The buyer must continue at the gateway.
    Redirect { payment: Payment, url: String },
}
