use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Order, Payment, PaymentMethod, PaymentOutcome},
    error::{AppError, Result},
    payments::{GatewayRequest, PaymentGateway},
    repository::{order_repository, payment_repository, PaymentRepository},
};

/// Owns the payment side of an order: creation at checkout, settlement by
/// cash on delivery or the wallet gateway, and the gateway's return callback.
pub struct PaymentService {
    pool: SqlitePool,
    payment_repo: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        payment_repo: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self { pool, payment_repo, gateway }
    }

    /// Records the unconfirmed payment for a freshly built order, inside the
    /// caller's checkout transaction.
    pub async fn create_for_order(
        &self,
        conn: &mut SqliteConnection,
        order: &Order,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id: order.id,
            user_id: order.user_id,
            payment_method: method,
            gateway_token: None,
            confirmed: false,
            amount: order.final_amount,
            confirmed_at: None,
            created_at: now,
            updated_at: now,
        };

        payment_repository::insert_payment(conn, &payment).await?;
        Ok(payment)
    }

    pub async fn initiate(
        &self,
        user_id: Uuid,
        payment_id: Uuid,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome> {
        let payment = self.payment_repo
            .find_by_id(payment_id)
            .await?
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.confirmed {
            return Err(AppError::Validation("Payment already confirmed".to_string()));
        }

        match method {
            PaymentMethod::Cod => {
                let payment = self.confirm(&payment, PaymentMethod::Cod).await?.ok_or_else(|| {
                    AppError::Validation("Payment already confirmed".to_string())
                })?;
                tracing::info!("Cash on delivery accepted for order {}", payment.order_id);
                Ok(PaymentOutcome::Confirmed(payment))
            }
            PaymentMethod::Wallet => {
                // Outside any transaction: a slow gateway must not hold the write lock.
                let started = self.gateway
                    .initiate(GatewayRequest {
                        amount: payment.amount,
                        order_id: payment.order_id,
                        order_label: format!("Order {}", payment.order_id),
                    })
                    .await?;

                let payment = self.payment_repo
                    .record_gateway_token(payment.id, PaymentMethod::Wallet, &started.token)
                    .await?;

                Ok(PaymentOutcome::Redirect {
                    payment,
                    url: started.redirect_url,
                })
            }
        }
    }

    /// Settles the payment the gateway issued `token` for.
    pub async fn confirm_callback(&self, token: &str) -> Result<Payment> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let payment = self.payment_repo
            .find_by_gateway_token(token)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Gateway callback with unknown token {}", token);
                AppError::InvalidToken
            })?;

        if payment.confirmed {
            return Ok(payment);
        }

        match self.confirm(&payment, payment.payment_method).await? {
            Some(confirmed) => {
                tracing::info!("Wallet payment {} confirmed for order {}", confirmed.id, confirmed.order_id);
                Ok(confirmed)
            }
            // Settled concurrently by another request; report it as it stands.
            None => self.reload(payment.id).await,
        }
    }

    /// Marks payment and order confirmed together.
    ///
    /// Returns `None`, writing nothing, when the payment was confirmed by
    /// someone else after the caller read it.
    async fn confirm(&self, payment: &Payment, method: PaymentMethod) -> Result<Option<Payment>> {
        let mut tx = self.pool.begin().await?;
        if !payment_repository::mark_confirmed(&mut *tx, payment.id, method).await? {
            tracing::debug!("Payment {} was already confirmed", payment.id);
            return Ok(None);
        }
        order_repository::mark_confirmed(&mut *tx, payment.order_id).await?;
        tx.commit().await?;

        self.reload(payment.id).await.map(Some)
    }

    async fn reload(&self, payment_id: Uuid) -> Result<Payment> {
        self.payment_repo.find_by_id(payment_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve confirmed payment".to_string())
        })
    }
}
