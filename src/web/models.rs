//! Request and Response DTOs for the Web API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::query::{Criterion, SortKey, TraderQuery};
use crate::models::{CopyTradeSettings, CopyTradeStatus, Trade, Trader};

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ServicesHealthResponse {
    pub healthy: bool,
    pub services: Vec<crate::api::ServiceHealth>,
}

// ============================================================================
// Traders
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradersQuery {
    pub search: Option<String>,
    pub verification_type: Option<String>,
    pub chain: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TradersQuery {
    pub fn to_query(&self) -> TraderQuery {
        TraderQuery::new()
            .search(self.search.as_deref())
            .verification(Criterion::parse(self.verification_type.as_deref()))
            .chain(Criterion::parse(self.chain.as_deref()))
            .sort_by(SortKey::parse_or_default(self.sort_by.as_deref()))
            .page(self.page, self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct TradersListResponse {
    pub traders: Vec<Trader>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TraderResponse {
    pub trader: Trader,
}

#[derive(Debug, Serialize)]
pub struct TraderTradesResponse {
    pub trades: Vec<Trade>,
    pub count: usize,
    /// Sum of input amounts
    pub volume: f64,
}

// ============================================================================
// Copy Trade
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateCopyTradeRequest {
    pub trader_id: String,
    pub amount: f64,
    #[serde(default)]
    pub settings: CopyTradeSettings,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateCopyTradeResponse {
    pub success: bool,
    pub copy_trade_id: String,
    pub trader_id: String,
    pub amount: f64,
    pub settings: CopyTradeSettings,
    pub activated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyTradesQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyTradeSummary {
    pub id: String,
    pub trader_id: String,
    pub trader_name: String,
    pub amount: f64,
    pub status: CopyTradeStatus,
    pub activated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyTradesListResponse {
    pub copy_trades: Vec<CopyTradeSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopCopyTradeResponse {
    pub success: bool,
    pub copy_trade_id: String,
    pub status: CopyTradeStatus,
}

// ============================================================================
// Secrets
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StoreSecretRequest {
    pub secret: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSecretResponse {
    pub store_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPayloadRequest {
    pub store_id: String,
    pub payload_hash: String,
}

#[derive(Debug, Serialize)]
pub struct SignPayloadResponse {
    pub signature: String,
    pub status: String,
}

// ============================================================================
// Execution
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeRequest {
    pub user_id: String,
    pub chain: String,
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeResponse {
    pub execution_id: String,
    pub status: String,
    pub tx_hash: String,
    pub derived_address: String,
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub user_id: String,
    pub tier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub payment_address: String,
    pub amount_zec: f64,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAddressRequest {
    pub payment_address: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub received: bool,
}

// ============================================================================
// Generic Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
