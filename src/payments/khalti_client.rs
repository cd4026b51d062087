use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    config::GatewayConfig,
    payments::{GatewayError, GatewayInitiation, GatewayRequest, PaymentGateway},
};

#[derive(Debug, Serialize)]
struct InitiateBody<'a> {
    return_url: &'a str,
    website_url: &'a str,
    amount: i64,
    purchase_order_id: String,
    purchase_order_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitiateResponse {
    pidx: Option<String>,
    payment_url: Option<String>,
}

/// HTTP client for the Khalti-style wallet initiation API.
pub struct KhaltiClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl KhaltiClient {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn initiate_url(&self) -> String {
        format!("{}/epayment/initiate/", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for KhaltiClient {
    async fn initiate(&self, request: GatewayRequest) -> Result<GatewayInitiation, GatewayError> {
        let secret_key = self.config.secret_key.as_deref().unwrap_or_default();
        let body = InitiateBody {
            return_url: &self.config.return_url,
            website_url: &self.config.website_url,
            amount: request.amount,
            purchase_order_id: request.order_id.to_string(),
            purchase_order_name: &request.order_label,
        };

        let response = self.client
            .post(self.initiate_url())
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", secret_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gateway request for order {} failed: {}", request.order_id, e);
                GatewayError
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Gateway rejected order {} with status {}", request.order_id, status);
            return Err(GatewayError);
        }

        let parsed: InitiateResponse = response.json().await.map_err(|e| {
            tracing::error!("Gateway response for order {} was malformed: {}", request.order_id, e);
            GatewayError
        })?;

        match (parsed.pidx, parsed.payment_url) {
            (Some(token), Some(redirect_url)) if !token.is_empty() => {
                tracing::info!("Gateway payment {} started for order {}", token, request.order_id);
                Ok(GatewayInitiation { token, redirect_url })
            }
            _ => {
                tracing::warn!("Gateway response for order {} is missing pidx or payment_url", request.order_id);
                Err(GatewayError)
            }
        }
    }
}
