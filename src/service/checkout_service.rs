use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{
        cart_repository, order_repository, product_repository, OrderRepository, ProductRepository,
    },
    service::{CouponService, PaymentService, ShippingService},
};

/// Turns a buyer's line items into a persisted order.
///
/// Stock, order, items, the pending payment and the cart cleanup are
/// written in one transaction: either all of them land or none do.
pub struct CheckoutService {
    pool: SqlitePool,
    product_repo: Arc<dyn ProductRepository>,
    order_repo: Arc<dyn OrderRepository>,
    coupon_service: Arc<CouponService>,
    shipping_service: Arc<ShippingService>,
    payment_service: Arc<PaymentService>,
}

impl CheckoutService {
    pub fn new(
        pool: SqlitePool,
        product_repo: Arc<dyn ProductRepository>,
        order_repo: Arc<dyn OrderRepository>,
        coupon_service: Arc<CouponService>,
        shipping_service: Arc<ShippingService>,
        payment_service: Arc<PaymentService>,
    ) -> Self {
        Self {
            pool,
            product_repo,
            order_repo,
            coupon_service,
            shipping_service,
            payment_service,
        }
    }

    pub async fn checkout(&self, user_id: Uuid, request: CheckoutRequest) -> Result<OrderDetails> {
        validate_line_items(&request.cart_items)?;

        let shipping = self.shipping_service
            .resolve(user_id, &request.shipping_phone)
            .await?;

        let coupon = match request.coupon_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(self.coupon_service.validate(code).await?),
            _ => None,
        };

        let mut products = Vec::with_capacity(request.cart_items.len());
        for item in &request.cart_items {
            let product = self.product_repo
                .find_by_id(item.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {} not found", item.product_id)))?;
            products.push((product, item.quantity));
        }

        let priced: Vec<(i64, i64)> = products.iter().map(|(p, qty)| (p.price, *qty)).collect();
        let totals = OrderTotals::compute(&priced, coupon.as_ref())
            .ok_or_else(|| AppError::Validation("Order total is too large".to_string()))?;
        check_submitted_totals(&request, &totals)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            shipping_details_id: shipping.id,
            coupon_id: coupon.as_ref().map(|c| c.id),
            total_amount: totals.total_amount,
            discount_amount: totals.discount_amount,
            final_amount: totals.final_amount,
            order_status: OrderStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let items: Vec<OrderItem> = products
            .iter()
            .map(|(product, quantity)| OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: product.id,
                quantity: *quantity,
                unit_price: product.price,
                created_at: now,
            })
            .collect();

        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        // Stock reservation must be the first statement so the write lock
        // is taken before anything is read inside the transaction.
        for (product, quantity) in &products {
            if !product_repository::reserve_stock(&mut *tx, product.id, *quantity).await? {
                tracing::info!(
                    "Checkout for user {} rejected: {} has fewer than {} units",
                    user_id, product.name, quantity
                );
                return Err(AppError::OutOfStock(product.name.clone()));
            }
        }

        order_repository::insert_order(&mut *tx, &order).await?;
        order_repository::insert_items(&mut *tx, &items).await?;
        self.payment_service
            .create_for_order(&mut *tx, &order, request.payment_method)
            .await?;

        // Purchased products leave the buyer's saved cart with the order.
        let purchased: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        cart_repository::remove_products(&mut *tx, user_id, &purchased).await?;

        tx.commit().await?;

        tracing::info!(
            "Order {} placed by user {}: total {}, discount {}, final {}",
            order.id, user_id, order.total_amount, order.discount_amount, order.final_amount
        );

        self.order_repo.find_details(order.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created order".to_string())
        })
    }
}

fn validate_line_items(items: &[LineItem]) -> Result<()> {
    if items.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }
    if let Some(item) = items.iter().find(|item| item.quantity < 1) {
        return Err(AppError::Validation(format!(
            "Quantity for product {} must be at least 1",
            item.product_id
        )));
    }
    Ok(())
}

/// Client figures are only a cross-check; the server totals are what gets stored.
fn check_submitted_totals(request: &CheckoutRequest, totals: &OrderTotals) -> Result<()> {
    let total_matches = request.total_amount.map_or(true, |t| t == totals.total_amount);
    let discount_matches = request.discount_amount.map_or(true, |d| d == totals.discount_amount);

    if total_matches && discount_matches {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Submitted totals do not match current prices".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(total: Option<i64>, discount: Option<i64>) -> CheckoutRequest {
        CheckoutRequest {
            shipping_phone: "9800000000".to_string(),
            cart_items: vec![LineItem { product_id: Uuid::new_v4(), quantity: 2 }],
            coupon_code: None,
            payment_method: PaymentMethod::Cod,
            total_amount: total,
            discount_amount: discount,
        }
    }

    const TOTALS: OrderTotals = OrderTotals {
        total_amount: 200,
        discount_amount: 20,
        final_amount: 180,
    };

    #[test]
    fn test_submitted_totals_are_optional() {
        assert!(check_submitted_totals(&request(None, None), &TOTALS).is_ok());
        assert!(check_submitted_totals(&request(Some(200), Some(20)), &TOTALS).is_ok());
    }

    #[test]
    fn test_submitted_totals_mismatch() {
        assert!(check_submitted_totals(&request(Some(150), None), &TOTALS).is_err());
        assert!(check_submitted_totals(&request(Some(200), Some(0)), &TOTALS).is_err());
    }

    #[test]
    fn test_line_item_validation() {
        assert!(validate_line_items(&[]).is_err());
        let zero = LineItem { product_id: Uuid::new_v4(), quantity: 0 };
        assert!(validate_line_items(&[zero]).is_err());
        let ok = LineItem { product_id: Uuid::new_v4(), quantity: 1 };
        assert!(validate_line_items(&[ok]).is_ok());
    }
}
