use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub city: String,
    pub province: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShippingRequest {
    #[validate(length(min = 1, max = 100, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 50, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 50, message = "Province is required"))]
    pub province: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateShippingRequest {
    #[validate(length(min = 1, max = 100, message = "Address is required"))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 50, message = "City is required"))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Province is required"))]
    pub province: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
    }
}
