use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod product_repository;
pub mod cart_repository;
pub mod coupon_repository;
pub mod shipping_repository;
pub mod order_repository;
pub mod payment_repository;

pub use user_repository::SqliteUserRepository;
pub use product_repository::SqliteProductRepository;
pub use cart_repository::SqliteCartRepository;
pub use coupon_repository::SqliteCouponRepository;
pub use shipping_repository::SqliteShippingRepository;
pub use order_repository::SqliteOrderRepository;
pub use payment_repository::SqlitePaymentRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, request: CreateProductRequest) -> Result<Product>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>>;
    async fn list_featured(&self) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Puts `quantity` units of the product in the user's cart, replacing
    /// any quantity already there.
    async fn upsert(&self, user_id: Uuid, product_id: Uuid, quantity: i64) -> Result<CartItem>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<CartItem>>;
    async fn find_line(&self, user_id: Uuid, id: Uuid) -> Result<Option<CartLine>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartLine>>;
    async fn update_quantity(&self, user_id: Uuid, id: Uuid, quantity: i64) -> Result<()>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn create(&self, request: CreateCouponRequest) -> Result<Coupon>;
    /// Looks up by already-normalized (uppercase) code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>>;
}

#[async_trait]
pub trait ShippingRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, request: CreateShippingRequest) -> Result<ShippingDetails>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<ShippingDetails>>;
    async fn find_by_phone(&self, user_id: Uuid, phone: &str) -> Result<Option<ShippingDetails>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ShippingDetails>>;
    async fn update(&self, user_id: Uuid, id: Uuid, update: UpdateShippingRequest) -> Result<ShippingDetails>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;
    async fn find_details(&self, id: Uuid) -> Result<Option<OrderDetails>>;
    async fn list_for_user(&self, user_id: Uuid, filter: OrderFilter) -> Result<Vec<OrderDetails>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_order(&self, order_id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_gateway_token(&self, token: &str) -> Result<Option<Payment>>;
    async fn record_gateway_token(&self, id: Uuid, method: PaymentMethod, token: &str) -> Result<Payment>;
}
