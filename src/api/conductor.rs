//! Conductor: executes trade intents on a target chain and returns the
//! broadcast transaction.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ServiceEndpoint, ServiceHealth};
use crate::error::{GatewayError, GatewayResult};
use crate::models::Chain;

#[derive(Debug, Clone, Serialize)]
pub struct TradeIntent {
    pub user_id: String,
    pub chain: Chain,
    /// e.g. "swap", "transfer"
    pub action: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Execution {
    pub execution_id: String,
    pub status: String,
    pub tx_hash: String,
    pub derived_address: String,
}

#[derive(Debug, Clone)]
pub struct ConductorClient {
    endpoint: ServiceEndpoint,
}

impl ConductorClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            endpoint: ServiceEndpoint::new("conductor", base_url, client),
        }
    }

    pub async fn execute_trade(&self, intent: &TradeIntent) -> GatewayResult<Execution> {
        if intent.user_id.trim().is_empty() {
            return Err(GatewayError::Validation("userId must not be empty".to_string()));
        }
        if intent.action.trim().is_empty() {
            return Err(GatewayError::Validation("action must not be empty".to_string()));
        }

        let execution: Execution = self.endpoint.post_json("/execute", intent).await?;
        info!(
            "Executed {} on {} for {}: {} ({})",
            intent.action, intent.chain, intent.user_id, execution.execution_id, execution.status
        );
        Ok(execution)
    }

    pub async fn health(&self) -> ServiceHealth {
        self.endpoint.health().await
    }
}
