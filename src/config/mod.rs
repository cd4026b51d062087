use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Wallet gateway (Khalti-style) connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default)]
    pub enabled: bool,
    pub secret_key: Option<String>,
    pub base_url: String,
    /// Where the gateway sends the buyer after payment; should point at
    /// `/api/payments/confirm`.
    pub return_url: String,
    pub website_url: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret_key: None,
            base_url: "https://a.khalti.com/api/v2".to_string(),
            return_url: "http://localhost:8080/api/payments/confirm".to_string(),
            website_url: "http://localhost:8080/".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://storefront.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("gateway.enabled", false)?
            .set_default("gateway.base_url", "https://a.khalti.com/api/v2")?
            .set_default("gateway.return_url", "http://localhost:8080/api/payments/confirm")?
            .set_default("gateway.website_url", "http://localhost:8080/")?
            .set_default("gateway.timeout_secs", 10)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Environment variables, e.g. STOREFRONT__GATEWAY__SECRET_KEY
            .add_source(Environment::with_prefix("STOREFRONT").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://storefront.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                secure_cookies: false,
            },
            gateway: GatewayConfig::default(),
        }
    }
}
