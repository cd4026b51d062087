pub mod cart_service;
pub mod coupon_service;
pub mod shipping_service;
pub mod checkout_service;
pub mod payment_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use crate::payments::PaymentGateway;

pub use cart_service::CartService;
pub use coupon_service::CouponService;
pub use shipping_service::ShippingService;
pub use checkout_service::CheckoutService;
pub use payment_service::PaymentService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub order_repo: Arc<dyn OrderRepository>,
    pub auth_service: Arc<AuthService>,
    pub cart_service: Arc<CartService>,
    pub coupon_service: Arc<CouponService>,
    pub shipping_service: Arc<ShippingService>,
    pub payment_service: Arc<PaymentService>,
    pub checkout_service: Arc<CheckoutService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        auth_service: Arc<AuthService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let product_repo: Arc<dyn ProductRepository> =
            Arc::new(SqliteProductRepository::new(db_pool.clone()));
        let cart_repo = Arc::new(SqliteCartRepository::new(db_pool.clone()));
        let coupon_repo = Arc::new(SqliteCouponRepository::new(db_pool.clone()));
        let shipping_repo = Arc::new(SqliteShippingRepository::new(db_pool.clone()));
        let order_repo: Arc<dyn OrderRepository> =
            Arc::new(SqliteOrderRepository::new(db_pool.clone()));
        let payment_repo = Arc::new(SqlitePaymentRepository::new(db_pool.clone()));

        let cart_service = Arc::new(CartService::new(cart_repo, product_repo.clone()));
        let coupon_service = Arc::new(CouponService::new(coupon_repo));
        let shipping_service = Arc::new(ShippingService::new(shipping_repo));
        let payment_service = Arc::new(PaymentService::new(
            db_pool.clone(),
            payment_repo,
            gateway,
        ));
        let checkout_service = Arc::new(CheckoutService::new(
            db_pool.clone(),
            product_repo.clone(),
            order_repo.clone(),
            coupon_service.clone(),
            shipping_service.clone(),
            payment_service.clone(),
        ));

        Self {
            user_repo,
            product_repo,
            order_repo,
            auth_service,
            cart_service,
            coupon_service,
            shipping_service,
            payment_service,
            checkout_service,
            db_pool,
        }
    }
}
