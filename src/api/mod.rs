pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(shop_routes(state))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handlers::products::list))
        .route("/products/featured", get(handlers::products::featured))
        .route("/products/:id", get(handlers::products::get))
        // Gateway return URL; the buyer arrives here from the wallet site
        .route("/payments/confirm", get(handlers::payments::confirm))
}

fn shop_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/shipping-details",
            get(handlers::shipping::list).post(handlers::shipping::create),
        )
        .route(
            "/shipping-details/:id",
            put(handlers::shipping::update).delete(handlers::shipping::delete),
        )
        .route("/user", get(handlers::auth::me))
        .route(
            "/cart",
            get(handlers::cart::list).post(handlers::cart::add),
        )
        .route(
            "/cart/:id",
            put(handlers::cart::update).delete(handlers::cart::remove),
        )
        .route("/coupons/check", post(handlers::coupons::check))
        .route("/checkout", post(handlers::checkout::checkout))
        .route("/orders", get(handlers::orders::list))
        .route("/payments", post(handlers::payments::pay))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
