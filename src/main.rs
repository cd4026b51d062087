use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{
    api,
    auth::AuthService,
    config::Settings,
    db,
    payments::{DisabledGateway, KhaltiClient, PaymentGateway},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting storefront on {}:{}", settings.server.host, settings.server.port);

    let db_pool = db::init_db(&settings.database.url, settings.database.max_connections).await?;

    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        settings.auth.session_duration_hours,
    ));

    let gateway: Arc<dyn PaymentGateway> = if settings.gateway.enabled {
        if settings.gateway.secret_key.is_none() {
            tracing::warn!("Wallet gateway enabled but no secret key configured");
        }
        tracing::info!("Wallet payments enabled via {}", settings.gateway.base_url);
        Arc::new(KhaltiClient::new(settings.gateway.clone())?)
    } else {
        tracing::info!("Wallet payments disabled");
        Arc::new(DisabledGateway)
    };

    let service_context = Arc::new(ServiceContext::new(db_pool, auth_service, gateway));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
