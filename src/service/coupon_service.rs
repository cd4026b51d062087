use std::sync::Arc;

use crate::{
    domain::{Coupon, CouponError},
    error::Result,
    repository::CouponRepository,
};

pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>) -> Self {
        Self { repo }
    }

    /// Resolves `code` to an active coupon, ignoring case and surrounding spaces.
    pub async fn validate(&self, code: &str) -> Result<Coupon> {
        let normalized = Coupon::normalize_code(code);
        let found = self.repo.find_by_code(&normalized).await?;

        check_active(found).map_err(|e| {
            tracing::debug!("Coupon {} rejected: {}", normalized, e);
            e.into()
        })
    }
}

pub fn check_active(found: Option<Coupon>) -> std::result::Result<Coupon, CouponError> {
    match found {
        None => Err(CouponError::NotFound),
        Some(coupon) if !coupon.is_active => Err(CouponError::Inactive),
        Some(coupon) => Ok(coupon),
    }
}
