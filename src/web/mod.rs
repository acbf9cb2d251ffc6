//! Web API module
//!
//! REST endpoints for the trader directory, platform stats, copy trading and
//! the upstream service proxies, plus a WebSocket event feed.

pub mod copy_trade;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::api::build_http_client;
use crate::api::citadel::CitadelClient;
use crate::api::conductor::ConductorClient;
use crate::api::payments::PaymentsClient;
use crate::config::Config;
use crate::directory::TraderDirectory;

use self::copy_trade::CopyTradeManager;
use self::websocket::WsMessage;

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only trader directory
    pub directory: Arc<TraderDirectory>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Secret custody service
    pub citadel: Arc<CitadelClient>,
    /// Trade execution service
    pub conductor: Arc<ConductorClient>,
    /// Subscription payments service
    pub payments: Arc<PaymentsClient>,
    /// Broadcast channel for WebSocket messages
    pub ws_tx: broadcast::Sender<WsMessage>,
    /// Copy trade subscriptions
    pub copy_trade_manager: Arc<CopyTradeManager>,
}

impl AppState {
    pub fn new(config: Arc<Config>, directory: Arc<TraderDirectory>) -> anyhow::Result<Self> {
        // Capacity of 100 messages
        let (ws_tx, _) = broadcast::channel(100);

        let http = build_http_client(Duration::from_secs(config.upstream_timeout_secs))?;

        let copy_trade_manager = Arc::new(CopyTradeManager::new(
            directory.clone(),
            config.copy_trades_path.clone(),
        ));

        Ok(Self {
            citadel: Arc::new(CitadelClient::new(&config.citadel_url, http.clone())),
            conductor: Arc::new(ConductorClient::new(&config.conductor_url, http.clone())),
            payments: Arc::new(PaymentsClient::new(&config.payments_url, http)),
            directory,
            config,
            ws_tx,
            copy_trade_manager,
        })
    }

    /// Initialize async components (call after creation)
    pub async fn init(&self) -> anyhow::Result<()> {
        self.copy_trade_manager.init().await?;
        Ok(())
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<WsMessage> {
        self.ws_tx.subscribe()
    }

    /// Broadcast a message to all WebSocket clients
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore errors (no subscribers)
        let _ = self.ws_tx.send(msg);
    }

    /// Artificial delay on directory reads, 0 by default
    pub async fn simulate_latency(&self) {
        if self.config.simulated_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.simulated_latency_ms)).await;
        }
    }
}
