use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coupon, Payment, PaymentMethod, ShippingDetails};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Delivered => "DELIVERED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(DeliveryStatus::Pending),
            "DELIVERED" => Some(DeliveryStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_details_id: Uuid,
    pub coupon_id: Option<Uuid>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub order_status: OrderStatus,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    /// Price per unit at the time of purchase.
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
}

/// An order item joined with the product name it was bought under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
}

/// An order with everything a buyer sees on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub shipping: ShippingDetails,
    pub lines: Vec<OrderLine>,
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(alias = "product")]
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Selects one of the buyer's saved shipping addresses.
    pub shipping_phone: String,
    pub cart_items: Vec<LineItem>,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    /// Client-side figures; checked against the server totals, never stored.
    pub total_amount: Option<i64>,
    pub discount_amount: Option<i64>,
}

/// Allow-listed filters for order listing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderFilter {
    pub order_status: Option<OrderStatus>,
    pub delivery_status: Option<DeliveryStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
}

impl OrderTotals {
    /// Sums `(unit_price, quantity)` pairs and applies the coupon discount.
    ///
    /// `final_amount` is always `total_amount - discount_amount`, with the
    /// discount rounded down. Returns `None` on arithmetic overflow.
    pub fn compute(lines: &[(i64, i64)], coupon: Option<&Coupon>) -> Option<Self> {
        let mut total: i64 = 0;
        for (price, quantity) in lines {
            total = total.checked_add(price.checked_mul(*quantity)?)?;
        }

        let discount = match coupon {
            Some(c) => c.discount_for(total)?,
            None => 0,
        };

        Some(Self {
            total_amount: total,
            discount_amount: discount,
            final_amount: total - discount,
        })
    }
}
