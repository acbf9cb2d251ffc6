//! Citadel: secret custody service. Stores user secrets (exchange API keys)
//! and signs payload hashes with them without ever returning the secret.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ServiceEndpoint, ServiceHealth};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Serialize)]
struct StoreSecretRequest<'a> {
    secret: &'a str,
    name: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoredSecret {
    pub store_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    store_id: &'a str,
    payload_hash: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Signature {
    pub signature: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CitadelClient {
    endpoint: ServiceEndpoint,
}

impl CitadelClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            endpoint: ServiceEndpoint::new("citadel", base_url, client),
        }
    }

    pub async fn store_secret(&self, secret: &str, name: &str) -> GatewayResult<StoredSecret> {
        if secret.is_empty() {
            return Err(GatewayError::Validation("secret must not be empty".to_string()));
        }
        if name.trim().is_empty() {
            return Err(GatewayError::Validation("name must not be empty".to_string()));
        }

        let stored: StoredSecret = self
            .endpoint
            .post_json("/store", &StoreSecretRequest { secret, name })
            .await?;
        // Never log the secret itself
        info!("Stored secret '{}' as {}", name, stored.store_id);
        Ok(stored)
    }

    pub async fn sign_payload(
        &self,
        store_id: &str,
        payload_hash: &str,
    ) -> GatewayResult<Signature> {
        if store_id.trim().is_empty() {
            return Err(GatewayError::Validation("storeId must not be empty".to_string()));
        }
        validate_payload_hash(payload_hash)?;

        self.endpoint
            .post_json("/sign", &SignRequest { store_id, payload_hash })
            .await
    }

    pub async fn health(&self) -> ServiceHealth {
        self.endpoint.health().await
    }
}

/// Non-empty hex string, `0x` prefix optional
fn validate_payload_hash(hash: &str) -> GatewayResult<()> {
    let digits = hash.strip_prefix("0x").unwrap_or(hash);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GatewayError::Validation(
            "payloadHash must be a hex string".to_string(),
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

    fn client(url: &str) -> CitadelClient {
        CitadelClient::new(url, build_http_client(Duration::from_secs(2)).unwrap())
    }

    #[tokio::test]
    async fn test_store_secret_forwards_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/store")
            .match_body(Matcher::Json(serde_json::json!({
                "secret": "binance-key",
                "name": "binance"
            })))
            .with_status(200)
            .with_body(r#"{"store_id": "nil_123", "status": "stored_in_nillion"}"#)
            .create_async()
            .await;

        let stored = client(&server.url()).store_secret("binance-key", "binance").await.unwrap();
        mock.assert_async().await;
        assert_eq!(stored.store_id, "nil_123");
    }

    #[tokio::test]
    async fn test_sign_unknown_store_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sign")
            .with_status(404)
            .with_body(r#"{"detail": "Secret not found"}"#)
            .create_async()
            .await;

        let result = client(&server.url()).sign_payload("nil_missing", "0xdeadbeef").await;
        assert!(matches!(
            result,
            Err(GatewayError::UpstreamRejected { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_upstream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let citadel = client(&server.url());
        assert!(matches!(
            citadel.sign_payload("nil_1", "not-hex").await,
            Err(GatewayError::Validation(_))
        ));
        assert!(matches!(
            citadel.store_secret("", "name").await,
            Err(GatewayError::Validation(_))
        ));
        mock.assert_async().await;
    }

    #[test]
    fn test_payload_hash_validation() {
        assert!(validate_payload_hash("0xABCdef01").is_ok());
        assert!(validate_payload_hash("abcdef").is_ok());
        assert!(validate_payload_hash("0x").is_err());
        assert!(validate_payload_hash("0xzz").is_err());
    }
}
