//! Payments: subscription billing over shielded payment addresses.

use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ServiceEndpoint, ServiceHealth};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Basic,
    Pro,
}

impl FromStr for SubscriptionTier {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            other => Err(GatewayError::Validation(format!(
                "unknown subscription tier: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    user_id: &'a str,
    tier: SubscriptionTier,
}

#[derive(Debug, Serialize)]
struct AddressRequest<'a> {
    payment_address: &'a str,
}

/// Where and how much to pay for a new subscription
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub payment_address: String,
    pub amount_zec: f64,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentCheck {
    pub received: bool,
}

#[derive(Debug, Clone)]
pub struct PaymentsClient {
    endpoint: ServiceEndpoint,
}

impl PaymentsClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            endpoint: ServiceEndpoint::new("payments", base_url, client),
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
    ) -> GatewayResult<PaymentRequest> {
        if user_id.trim().is_empty() {
            return Err(GatewayError::Validation("userId must not be empty".to_string()));
        }

        let request: PaymentRequest = self
            .endpoint
            .post_json("/subscribe", &SubscribeRequest { user_id, tier })
            .await?;
        info!(
            "Subscription for {} awaiting {} ZEC at {}",
            user_id, request.amount_zec, request.payment_address
        );
        Ok(request)
    }

    pub async fn check_payment(&self, payment_address: &str) -> GatewayResult<PaymentCheck> {
        validate_address(payment_address)?;
        self.endpoint
            .post_json("/check", &AddressRequest { payment_address })
            .await
    }

    /// Dev-only: ask the payments service to mark an address as paid
    pub async fn simulate_payment(&self, payment_address: &str) -> GatewayResult<PaymentCheck> {
        validate_address(payment_address)?;
        self.endpoint
            .post_json("/simulate", &AddressRequest { payment_address })
            .await
    }

    pub async fn health(&self) -> ServiceHealth {
        self.endpoint.health().await
    }
}

fn validate_address(payment_address: &str) -> GatewayResult<()> {
    if payment_address.trim().is_empty() {
        return Err(GatewayError::Validation(
            "paymentAddress must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use mockito::Matcher;
    use std::time::Duration;

    fn client(url: &str) -> PaymentsClient {
        PaymentsClient::new(url, build_http_client(Duration::from_secs(2)).unwrap())
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("PRO".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Pro);
        assert!("enterprise".parse::<SubscriptionTier>().is_err());
    }

    #[tokio::test]
    async fn test_create_subscription() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .match_body(Matcher::Json(serde_json::json!({"user_id": "u1", "tier": "pro"})))
            .with_status(200)
            .with_body(
                r#"{"payment_address": "ua1abc", "amount_zec": 0.1,
                    "status": "pending_payment"}"#,
            )
            .create_async()
            .await;

        let request = client(&server.url())
            .create_subscription("u1", SubscriptionTier::Pro)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(request.payment_address, "ua1abc");
        assert_eq!(request.amount_zec, 0.1);
    }

    #[tokio::test]
    async fn test_check_and_simulate_payment() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/check")
            .match_body(Matcher::Json(serde_json::json!({"payment_address": "ua1abc"})))
            .with_status(200)
            .with_body(r#"{"received": false}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/simulate")
            .with_status(200)
            .with_body(r#"{"status": "simulated", "received": true}"#)
            .create_async()
            .await;

        let payments = client(&server.url());
        assert!(!payments.check_payment("ua1abc").await.unwrap().received);
        assert!(payments.simulate_payment("ua1abc").await.unwrap().received);
        assert!(payments.check_payment(" ").await.is_err());
    }
}
