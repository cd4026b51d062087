use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    /// Always stored uppercase.
    pub code: String,
    /// Between 1 and 100 inclusive.
    pub discount_percent: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Discount granted on `total`, rounded down to the smallest currency unit.
    pub fn discount_for(&self, total: i64) -> Option<i64> {
        total
            .checked_mul(self.discount_percent)
            .map(|scaled| scaled / 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percent: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Why a coupon code was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouponError {
    #[error("Coupon is invalid")]
    NotFound,
    #[error("Coupon is not active")]
    Inactive,
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::NotFound => AppError::NotFound(err.to_string()),
            CouponError::Inactive => AppError::CouponInactive,
        }
    }
}
