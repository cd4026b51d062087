mod common;

use common::{checkout_request, TestEnv};
use storefront::{
    domain::{OrderDetails, OrderStatus, PaymentMethod, PaymentOutcome},
    error::AppError,
    repository::OrderRepository,
};
use uuid::Uuid;

async fn place_order(env: &TestEnv, name: &str, phone: &str) -> anyhow::Result<(Uuid, OrderDetails)> {
    let user = env.user(name).await?;
    env.shipping(user.id, phone).await?;
    let product = env.product(&format!("{} item", name), 100, 5).await?;

    let details = env.ctx.checkout_service
        .checkout(user.id, checkout_request(phone, &[(product.id, 2)], None))
        .await?;
    Ok((user.id, details))
}

async fn reload(env: &TestEnv, order_id: Uuid) -> anyhow::Result<OrderDetails> {
    env.ctx.order_repo
        .find_details(order_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order {} vanished", order_id))
}

fn payment_id(details: &OrderDetails) -> Uuid {
    details.payment.as_ref().map(|p| p.id).expect("checkout records a payment")
}

#[tokio::test]
async fn test_cash_on_delivery_confirms_payment_and_order() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "alice", "9800000001").await?;

    let outcome = env.ctx.payment_service
        .initiate(user_id, payment_id(&details), PaymentMethod::Cod)
        .await?;

    match outcome {
        PaymentOutcome::Confirmed(payment) => {
            assert!(payment.confirmed);
            assert!(payment.confirmed_at.is_some());
            assert_eq!(payment.payment_method, PaymentMethod::Cod);
            assert_eq!(payment.amount, 200);
        }
        other => panic!("expected confirmation, got {:?}", other),
    }

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Confirmed);
    assert_eq!(env.gateway.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_wallet_payment_round_trip() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "bob", "9800000002").await?;

    let outcome = env.ctx.payment_service
        .initiate(user_id, payment_id(&details), PaymentMethod::Wallet)
        .await?;

    let token = match outcome {
        PaymentOutcome::Redirect { payment, url } => {
            assert!(!payment.confirmed);
            assert_eq!(payment.payment_method, PaymentMethod::Wallet);
            assert_eq!(url, format!("https://pay.test/{}", details.order.id));
            payment.gateway_token.expect("token stored after initiation")
        }
        other => panic!("expected redirect, got {:?}", other),
    };
    assert_eq!(token, "pidx-1");

    // Nothing is settled until the gateway sends the buyer back
    let pending = reload(&env, details.order.id).await?;
    assert_eq!(pending.order.order_status, OrderStatus::Pending);

    let confirmed = env.ctx.payment_service.confirm_callback(&token).await?;
    assert!(confirmed.confirmed);

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Confirmed);

    // A repeated callback is harmless
    let again = env.ctx.payment_service.confirm_callback(&token).await?;
    assert_eq!(again.id, confirmed.id);
    assert_eq!(again.confirmed_at, confirmed.confirmed_at);

    Ok(())
}

#[tokio::test]
async fn test_unknown_callback_token_changes_nothing() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "carol", "9800000003").await?;
    env.ctx.payment_service
        .initiate(user_id, payment_id(&details), PaymentMethod::Wallet)
        .await?;

    let err = env.ctx.payment_service.confirm_callback("pidx-bogus").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
    assert_eq!(err.to_string(), "Payment unsuccessful. Invalid token");

    let err = env.ctx.payment_service.confirm_callback("").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Pending);
    assert_eq!(reloaded.payment.map(|p| p.confirmed), Some(false));

    Ok(())
}

#[tokio::test]
async fn test_gateway_failure_leaves_order_pending() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "dave", "9800000004").await?;
    env.gateway.set_failing(true);

    let err = env.ctx.payment_service
        .initiate(user_id, payment_id(&details), PaymentMethod::Wallet)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Gateway));
    assert_eq!(err.to_string(), "Payment initiation failed");
    assert_eq!(env.gateway.calls(), 1);

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Pending);
    let payment = reloaded.payment.expect("payment kept");
    assert!(!payment.confirmed);
    assert!(payment.gateway_token.is_none());

    // The buyer can retry once the gateway recovers
    env.gateway.set_failing(false);
    let outcome = env.ctx.payment_service
        .initiate(user_id, payment.id, PaymentMethod::Wallet)
        .await?;
    assert!(matches!(outcome, PaymentOutcome::Redirect { .. }));

    Ok(())
}

#[tokio::test]
async fn test_confirmed_payment_cannot_be_paid_again() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "erin", "9800000005").await?;
    let id = payment_id(&details);

    env.ctx.payment_service.initiate(user_id, id, PaymentMethod::Cod).await?;

    let err = env.ctx.payment_service
        .initiate(user_id, id, PaymentMethod::Wallet)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Payment already confirmed");
    assert_eq!(env.gateway.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_payment_of_another_user_is_not_found() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (_owner, details) = place_order(&env, "frank", "9800000006").await?;
    let intruder = env.user("mallory").await?;

    let err = env.ctx.payment_service
        .initiate(intruder.id, payment_id(&details), PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Payment not found");

    let err = env.ctx.payment_service
        .initiate(intruder.id, Uuid::new_v4(), PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Payment not found");

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_callback_with_earlier_token_after_retry() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "grace", "9800000007").await?;
    let id = payment_id(&details);

    let first = env.ctx.payment_service.initiate(user_id, id, PaymentMethod::Wallet).await?;
    let second = env.ctx.payment_service.initiate(user_id, id, PaymentMethod::Wallet).await?;
    match (&first, &second) {
        (PaymentOutcome::Redirect { payment: a, .. }, PaymentOutcome::Redirect { payment: b, .. }) => {
            assert_eq!(a.gateway_token.as_deref(), Some("pidx-1"));
            assert_eq!(b.gateway_token.as_deref(), Some("pidx-2"));
        }
        other => panic!("expected two redirects, got {:?}", other),
    }

    // The buyer finishes on the first gateway tab
    let confirmed = env.ctx.payment_service.confirm_callback("pidx-1").await?;
    assert_eq!(confirmed.id, id);
    assert!(confirmed.confirmed);

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Confirmed);

    // The later token resolves to the same, already settled payment
    let again = env.ctx.payment_service.confirm_callback("pidx-2").await?;
    assert_eq!(again.id, id);
    assert_eq!(again.confirmed_at, confirmed.confirmed_at);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_cash_settlement_confirms_once() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let (user_id, details) = place_order(&env, "heidi", "9800000008").await?;
    let id = payment_id(&details);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = env.ctx.payment_service.clone();
            tokio::spawn(async move { service.initiate(user_id, id, PaymentMethod::Cod).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await?);
    }

    let settled = results
        .iter()
        .filter(|r| matches!(r, Ok(PaymentOutcome::Confirmed(_))))
        .count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.to_string() == "Payment already confirmed"))
        .count();
    assert_eq!(settled, 1);
    assert_eq!(rejected, 1);

    let reloaded = reload(&env, details.order.id).await?;
    assert_eq!(reloaded.order.order_status, OrderStatus::Confirmed);
    assert_eq!(reloaded.payment.map(|p| p.confirmed), Some(true));

    Ok(())
}
