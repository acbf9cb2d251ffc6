//! Clients for the upstream services the gateway fronts:
//! - `citadel`: secret custody and blind signing
//! - `conductor`: cross-chain trade execution
//! - `payments`: subscription payment addresses and confirmation
//!
//! Every call goes through [`ServiceEndpoint`], which turns transport failures
//! and non-2xx statuses into typed [`GatewayError`]s.

pub mod citadel;
pub mod conductor;
pub mod payments;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};

/// Shared HTTP client for all upstream calls
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client for upstream services")
}

/// Health of one upstream as seen from the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service: String,
    pub healthy: bool,
    /// Body of the service's own health endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Base URL plus name of one upstream service
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    name: &'static str,
    base_url: String,
    client: Client,
}

impl ServiceEndpoint {
    pub fn new(name: &'static str, base_url: &str, client: Client) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> GatewayResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {} ({})", url, self.name);
        self.send(self.client.post(&url).json(body)).await
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> GatewayResult<R> {
        let url = self.url(path);
        debug!("GET {} ({})", url, self.name);
        self.send(self.client.get(&url)).await
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<R> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned {} - {}", self.name, status, body);
            return Err(if status.is_client_error() {
                GatewayError::UpstreamRejected {
                    service: self.name,
                    status: status.as_u16(),
                    body,
                }
            } else {
                GatewayError::UpstreamFailure {
                    service: self.name,
                    status: status.as_u16(),
                    body,
                }
            });
        }

        response.json::<R>().await.map_err(|e| {
            warn!("Failed to parse {} response: {:?}", self.name, e);
            GatewayError::UpstreamDecode {
                service: self.name,
                reason: e.to_string(),
            }
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            warn!("{} request timed out", self.name);
            GatewayError::UpstreamTimeout { service: self.name }
        } else {
            warn!("{} request failed: {}", self.name, e);
            GatewayError::UpstreamUnavailable {
                service: self.name,
                reason: e.to_string(),
            }
        }
    }

    /// Probe `GET /health`. Never fails; an unreachable service is reported unhealthy.
    pub async fn health(&self) -> ServiceHealth {
        match self.get_json::<serde_json::Value>("/health").await {
            Ok(details) => ServiceHealth {
                service: self.name.to_string(),
                healthy: true,
                details: Some(details),
                error: None,
            },
            Err(e) => ServiceHealth {
                service: self.name.to_string(),
                healthy: false,
                details: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::net::TcpListener;

    /// Base URL of a server that accepts connections and never answers
    pub async fn silent_upstream() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str) -> ServiceEndpoint {
        let client = build_http_client(Duration::from_secs(2)).unwrap();
        ServiceEndpoint::new("test-service", url, client)
    }

    #[tokio::test]
    async fn test_client_error_maps_to_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/thing")
            .with_status(404)
            .with_body(r#"{"detail": "missing"}"#)
            .create_async()
            .await;

        let result: GatewayResult<serde_json::Value> =
            endpoint(&server.url()).get_json("/thing").await;
        mock.assert_async().await;

        match result {
            Err(GatewayError::UpstreamRejected { status, body, .. }) => {
                assert_eq!(status, 404);
                assert!(body.contains("missing"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/thing")
            .with_status(503)
            .create_async()
            .await;

        let result: GatewayResult<serde_json::Value> = endpoint(&server.url())
            .post_json("/thing", &serde_json::json!({}))
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::UpstreamFailure { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_body_maps_to_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/thing")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result: GatewayResult<serde_json::Value> =
            endpoint(&server.url()).get_json("/thing").await;
        assert!(matches!(result, Err(GatewayError::UpstreamDecode { .. })));
    }

    #[tokio::test]
    async fn test_slow_service_maps_to_timeout() {
        let url = test_support::silent_upstream().await;
        let client = build_http_client(Duration::from_millis(200)).unwrap();
        let endpoint = ServiceEndpoint::new("slow-service", &url, client);

        let result: GatewayResult<serde_json::Value> = endpoint
            .post_json("/thing", &serde_json::json!({"k": "v"}))
            .await;
        match result {
            Err(GatewayError::UpstreamTimeout { service }) => assert_eq!(service, "slow-service"),
            other => panic!("unexpected result: {:?}", other),
        }

        let health = endpoint.health().await;
        assert!(!health.healthy);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let result: GatewayResult<serde_json::Value> =
            endpoint("http://127.0.0.1:9").get_json("/thing").await;
        let err = result.unwrap_err();
        assert!(err.is_upstream());

        let health = endpoint("http://127.0.0.1:9").health().await;
        assert!(!health.healthy);
        assert!(health.error.is_some());
    }

    #[tokio::test]
    async fn test_health_reports_service_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "healthy"}"#)
            .create_async()
            .await;

        let health = endpoint(&format!("{}/", server.url())).health().await;
        assert!(health.healthy);
        assert_eq!(health.details.unwrap()["status"], "healthy");
    }
}
