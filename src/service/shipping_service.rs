use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{is_valid_phone, CreateShippingRequest, ShippingDetails, UpdateShippingRequest},
    error::{AppError, Result},
    repository::ShippingRepository,
};

pub struct ShippingService {
    repo: Arc<dyn ShippingRepository>,
}

impl ShippingService {
    pub fn new(repo: Arc<dyn ShippingRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, request: CreateShippingRequest) -> Result<ShippingDetails> {
        request.validate()?;
        self.repo.create(user_id, request).await
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ShippingDetails>> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: UpdateShippingRequest,
    ) -> Result<ShippingDetails> {
        update.validate()?;
        self.repo.update(user_id, id, update).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.repo.delete(user_id, id).await
    }

    /// Finds the user's saved address registered under `phone`.
    pub async fn resolve(&self, user_id: Uuid, phone: &str) -> Result<ShippingDetails> {
        let phone = phone.trim();
        if !is_valid_phone(phone) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }

        self.repo
            .find_by_phone(user_id, phone)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipping details not found".to_string()))
    }
}
