use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{AddToCartRequest, CartLine, Product, UpdateCartRequest},
    error::{AppError, Result},
    repository::{CartRepository, ProductRepository},
};

/// The buyer's saved cart. Stock is checked when quantities change but only
/// reserved at checkout.
pub struct CartService {
    repo: Arc<dyn CartRepository>,
    product_repo: Arc<dyn ProductRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>, product_repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo, product_repo }
    }

    pub async fn add(&self, user_id: Uuid, request: AddToCartRequest) -> Result<CartLine> {
        let product = self.product_repo
            .find_by_id(request.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", request.product_id)))?;
        check_stock(&product, request.quantity)?;

        let item = self.repo.upsert(user_id, product.id, request.quantity).await?;
        self.line(user_id, item.id).await
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, request: UpdateCartRequest) -> Result<CartLine> {
        let item = self.repo
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;
        let product = self.product_repo
            .find_by_id(item.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", item.product_id)))?;
        check_stock(&product, request.quantity)?;

        self.repo.update_quantity(user_id, id, request.quantity).await?;
        self.line(user_id, id).await
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn remove(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.repo.delete(user_id, id).await
    }

    async fn line(&self, user_id: Uuid, id: Uuid) -> Result<CartLine> {
        self.repo.find_line(user_id, id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve cart item".to_string())
        })
    }
}

fn check_stock(product: &Product, quantity: i64) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    if product.quantity < quantity {
        return Err(AppError::Validation("Not enough stock to add".to_string()));
    }
    Ok(())
}
