#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use storefront::{
    auth::AuthService,
    db,
    domain::*,
    payments::{GatewayError, GatewayInitiation, GatewayRequest, PaymentGateway},
    repository::{CouponRepository, ProductRepository, SqliteCouponRepository, UserRepository},
    service::ServiceContext,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Scripted wallet gateway. Issues `pidx-<n>` tokens unless told to fail.
#[derive(Default)]
pub struct FakeGateway {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeGateway {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initiate(&self, request: GatewayRequest) -> Result<GatewayInitiation, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError);
        }
        Ok(GatewayInitiation {
            token: format!("pidx-{}", n),
            redirect_url: format!("https://pay.test/{}", request.order_id),
        })
    }
}

/// A file-backed database in a temp dir plus a fully wired service context.
///
/// File-backed rather than `:memory:` so pooled connections share one
/// database and WAL locking behaves as in production.
pub struct TestEnv {
    _dir: TempDir,
    pub pool: SqlitePool,
    pub ctx: Arc<ServiceContext>,
    pub gateway: Arc<FakeGateway>,
}

impl TestEnv {
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = db::init_db(&url, 5).await?;

        let gateway = Arc::new(FakeGateway::default());
        let auth_service = Arc::new(AuthService::new(pool.clone(), 24));
        let ctx = Arc::new(ServiceContext::new(
            pool.clone(),
            auth_service,
            gateway.clone(),
        ));

        Ok(Self { _dir: dir, pool, ctx, gateway })
    }

    pub async fn user(&self, name: &str) -> anyhow::Result<User> {
        Ok(self.ctx.user_repo
            .create(CreateUserRequest {
                email: format!("{}@example.com", name),
                username: name.to_string(),
                password: "secure_password123".to_string(),
            })
            .await?)
    }

    pub async fn product(&self, name: &str, price: i64, quantity: i64) -> anyhow::Result<Product> {
        Ok(self.ctx.product_repo
            .create(CreateProductRequest {
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                quantity,
                is_featured: false,
            })
            .await?)
    }

    pub async fn coupon(&self, code: &str, percent: i64, active: bool) -> anyhow::Result<Coupon> {
        let repo = SqliteCouponRepository::new(self.pool.clone());
        Ok(repo
            .create(CreateCouponRequest {
                code: code.to_string(),
                discount_percent: percent,
                is_active: active,
            })
            .await?)
    }

    pub async fn shipping(&self, user_id: Uuid, phone: &str) -> anyhow::Result<ShippingDetails> {
        Ok(self.ctx.shipping_service
            .create(user_id, CreateShippingRequest {
                address: "Thamel Marg 4".to_string(),
                city: "Kathmandu".to_string(),
                province: "Bagmati".to_string(),
                phone: phone.to_string(),
            })
            .await?)
    }

    pub async fn stock(&self, product_id: Uuid) -> anyhow::Result<i64> {
        let product = self.ctx.product_repo
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product {} vanished", product_id))?;
        Ok(product.quantity)
    }

    pub async fn count(&self, table: &str) -> anyhow::Result<i64> {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

pub fn cart(items: &[(Uuid, i64)]) -> Vec<LineItem> {
    items
        .iter()
        .map(|(product_id, quantity)| LineItem { product_id: *product_id, quantity: *quantity })
        .collect()
}

pub fn checkout_request(phone: &str, items: &[(Uuid, i64)], coupon: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        shipping_phone: phone.to_string(),
        cart_items: cart(items),
        coupon_code: coupon.map(str::to_string),
        payment_method: PaymentMethod::Cod,
        total_amount: None,
        discount_amount: None,
    }
}
