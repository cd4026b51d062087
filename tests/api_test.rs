mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::TestEnv;
use serde_json::{json, Value};
use std::sync::Arc;
use storefront::{api::create_app, config::Settings};
use tower::ServiceExt;

fn app(env: &TestEnv) -> Router {
    create_app(env.ctx.clone(), Arc::new(Settings::default()))
}

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value, Option<String>)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, body, cookie))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("valid request")
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

async fn register_and_login(app: &Router, name: &str) -> anyhow::Result<String> {
    let (status, body, _) = send(app, json_request("POST", "/auth/register", None, json!({
        "email": format!("{}@example.com", name),
        "username": name,
        "password": "secure_password123",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let (status, _, cookie) = send(app, json_request("POST", "/auth/login", None, json!({
        "email": format!("{}@example.com", name),
        "password": "secure_password123",
    }))).await?;
    assert_eq!(status, StatusCode::OK);

    cookie.ok_or_else(|| anyhow::anyhow!("login did not set a session cookie"))
}

#[tokio::test]
async fn test_health_and_public_catalog() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let product = env.product("Pashmina", 1500, 4).await?;

    let (status, body, _) = send(&app, get_request("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body, _) = send(&app, get_request("/api/products", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body, _) = send(&app, get_request(&format!("/api/products/{}", product.id), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pashmina");

    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    register_and_login(&app, "alice").await?;

    let (status, body, _) = send(&app, json_request("POST", "/auth/register", None, json!({
        "email": "alice@example.com",
        "username": "alice2",
        "password": "secure_password123",
    }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    let (status, _, _) = send(&app, json_request("POST", "/auth/login", None, json!({
        "email": "alice@example.com",
        "password": "wrong_password",
    }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_shop_routes_require_a_session() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);

    let (status, _, _) = send(&app, get_request("/api/orders", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, json_request("POST", "/api/checkout", Some("session=forged"), json!({}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_checkout_and_cash_payment_over_http() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "bob").await?;
    let product = env.product("Lokta Notebook", 100, 3).await?;
    env.coupon("SAVE10", 10, true).await?;

    let (status, _, _) = send(&app, json_request("POST", "/api/shipping-details", Some(&cookie), json!({
        "address": "Jhamsikhel Road 12",
        "city": "Lalitpur",
        "province": "Bagmati",
        "phone": "9800000001",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, order, _) = send(&app, json_request("POST", "/api/checkout", Some(&cookie), json!({
        "shipping_phone": "9800000001",
        "cart_items": [{ "product": product.id, "quantity": 2 }],
        "coupon_code": "save10",
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", order);
    assert_eq!(order["total_amount"], 200);
    assert_eq!(order["discount_amount"], 20);
    assert_eq!(order["final_amount"], 180);
    assert_eq!(order["order_status"], "PENDING");
    assert_eq!(order["order_items"][0]["product"]["name"], "Lokta Notebook");

    let payment_id = order["payment"]["id"].clone();
    let (status, payment, _) = send(&app, json_request("POST", "/api/payments", Some(&cookie), json!({
        "payment_id": payment_id,
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["confirmed"], true);
    assert_eq!(payment["amount"], 180);

    let (status, orders, _) = send(&app, get_request("/api/orders?order_status=CONFIRMED", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(1));

    let (status, body, _) = send(&app, get_request("/api/orders?sort=price", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_checkout_failures_are_bad_requests() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "carol").await?;
    let product = env.product("Singing Bowl", 2500, 1).await?;

    let (status, body, _) = send(&app, json_request("POST", "/api/checkout", Some(&cookie), json!({
        "shipping_phone": "9800000009",
        "cart_items": [{ "product": product.id, "quantity": 1 }],
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Shipping details not found");

    let (status, _, _) = send(&app, json_request("POST", "/api/shipping-details", Some(&cookie), json!({
        "address": "Lakeside 7",
        "city": "Pokhara",
        "province": "Gandaki",
        "phone": "9800000009",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, _) = send(&app, json_request("POST", "/api/checkout", Some(&cookie), json!({
        "shipping_phone": "9800000009",
        "cart_items": [{ "product": product.id, "quantity": 2 }],
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product Singing Bowl out of stock");

    Ok(())
}

#[tokio::test]
async fn test_gateway_callback_is_public_and_rejects_unknown_tokens() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);

    let (status, body, _) = send(&app, get_request("/api/payments/confirm?pidx=unknown", None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Payment unsuccessful. Invalid token");

    Ok(())
}

#[tokio::test]
async fn test_malformed_input_is_a_json_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "dana").await?;

    let (status, body, _) = send(&app, json_request("POST", "/api/checkout", Some(&cookie), json!({
        "cart_items": [],
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("shipping_phone"), "unexpected error: {}", message);

    let (status, body, _) = send(&app, json_request("POST", "/api/payments", Some(&cookie), json!({
        "payment_id": "nope",
        "payment_method": "COD",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body, _) = send(&app, get_request("/api/orders?sort=price", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("sort"));

    let (status, body, _) = send(&app, get_request("/api/products/not-a-uuid", None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_coupon_check_over_http() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "eve").await?;
    env.coupon("SAVE10", 10, true).await?;
    env.coupon("OLD25", 25, false).await?;

    let (status, body, _) = send(&app, json_request("POST", "/api/coupons/check", Some(&cookie), json!({
        "code": " save10 ",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "SAVE10");
    assert_eq!(body["discount_percent"], 10);

    let (status, body, _) = send(&app, json_request("POST", "/api/coupons/check", Some(&cookie), json!({
        "code": "NOPE",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Coupon is invalid");

    let (status, body, _) = send(&app, json_request("POST", "/api/coupons/check", Some(&cookie), json!({
        "code": "old25",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Coupon is not active");

    Ok(())
}

async fn wallet_order(env: &TestEnv, app: &Router, cookie: &str, phone: &str) -> anyhow::Result<Value> {
    let product = env.product("Yak Wool Scarf", 700, 4).await?;

    let (status, _, _) = send(app, json_request("POST", "/api/shipping-details", Some(cookie), json!({
        "address": "Boudha 3",
        "city": "Kathmandu",
        "province": "Bagmati",
        "phone": phone,
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, order, _) = send(app, json_request("POST", "/api/checkout", Some(cookie), json!({
        "shipping_phone": phone,
        "cart_items": [{ "product": product.id, "quantity": 1 }],
        "payment_method": "WALLET",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", order);

    Ok(order)
}

#[tokio::test]
async fn test_wallet_payment_over_http() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "faye").await?;
    let order = wallet_order(&env, &app, &cookie, "9800000021").await?;

    let (status, body, _) = send(&app, json_request("POST", "/api/payments", Some(&cookie), json!({
        "payment_id": order["payment"]["id"],
        "payment_method": "KHALTI",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], format!("https://pay.test/{}", order["id"].as_str().unwrap_or_default()));

    let (status, body, _) = send(&app, get_request("/api/payments/confirm?pidx=pidx-1", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment successful");

    let (_, orders, _) = send(&app, get_request("/api/orders", Some(&cookie))).await?;
    assert_eq!(orders[0]["order_status"], "CONFIRMED");
    assert_eq!(orders[0]["payment"]["confirmed"], true);

    Ok(())
}

#[tokio::test]
async fn test_wallet_gateway_failure_over_http() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "gopal").await?;
    let order = wallet_order(&env, &app, &cookie, "9800000022").await?;
    env.gateway.set_failing(true);

    let (status, body, _) = send(&app, json_request("POST", "/api/payments", Some(&cookie), json!({
        "payment_id": order["payment"]["id"],
        "payment_method": "WALLET",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Payment initiation failed");

    let (_, orders, _) = send(&app, get_request("/api/orders", Some(&cookie))).await?;
    assert_eq!(orders[0]["order_status"], "PENDING");
    assert_eq!(orders[0]["payment"]["confirmed"], false);

    Ok(())
}

#[tokio::test]
async fn test_user_detail_and_cart_over_http() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let app = app(&env);
    let cookie = register_and_login(&app, "hema").await?;
    let product = env.product("Dhaka Topi", 400, 2).await?;

    let (status, body, _) = send(&app, get_request("/api/user", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "hema@example.com");
    assert_eq!(body["username"], "hema");

    let (status, line, _) = send(&app, json_request("POST", "/api/cart", Some(&cookie), json!({
        "product": product.id,
        "quantity": 2,
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(line["total_price"], 800);
    assert_eq!(line["available"], true);

    let (status, body, _) = send(&app, json_request("POST", "/api/cart", Some(&cookie), json!({
        "product": product.id,
        "quantity": 3,
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not enough stock to add");

    let (status, cart, _) = send(&app, get_request("/api/cart", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart.as_array().map(Vec::len), Some(1));
    assert_eq!(cart[0]["quantity"], 2);

    let item = cart[0]["id"].as_str().unwrap_or_default().to_string();
    let (status, body, _) = send(&app, json_request("DELETE", &format!("/api/cart/{}", item), Some(&cookie), json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product removed from cart");

    Ok(())
}
