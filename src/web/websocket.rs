//! WebSocket feed of copy-trade and execution events

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::models::{Chain, CopyTrade};

/// WebSocket message types broadcast to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// A user started copying a trader
    CopyTradeActivated {
        copy_trade_id: String,
        user_id: String,
        trader_id: String,
        amount: f64,
        timestamp: DateTime<Utc>,
    },

    /// A copy trade was stopped
    CopyTradeStopped {
        copy_trade_id: String,
        user_id: String,
        trader_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The execution service accepted a trade intent
    TradeExecuted {
        execution_id: String,
        user_id: String,
        chain: Chain,
        action: String,
        status: String,
        timestamp: DateTime<Utc>,
    },

    /// Heartbeat/ping message
    Ping {
        timestamp: DateTime<Utc>,
    },
}

impl WsMessage {
    pub fn activated(copy_trade: &CopyTrade) -> Self {
        Self::CopyTradeActivated {
            copy_trade_id: copy_trade.id.clone(),
            user_id: copy_trade.user_id.clone(),
            trader_id: copy_trade.trader_id.clone(),
            amount: copy_trade.amount,
            timestamp: copy_trade.activated_at,
        }
    }

    pub fn stopped(copy_trade: &CopyTrade) -> Self {
        Self::CopyTradeStopped {
            copy_trade_id: copy_trade.id.clone(),
            user_id: copy_trade.user_id.clone(),
            trader_id: copy_trade.trader_id.clone(),
            timestamp: copy_trade.stopped_at.unwrap_or_else(Utc::now),
        }
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe_ws();

    info!("New WebSocket client connected");

    let ping = WsMessage::Ping {
        timestamp: Utc::now(),
    };
    if let Ok(json) = serde_json::to_string(&ping) {
        let _ = sender.send(Message::Text(json)).await;
    }

    // Forward broadcast events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(msg) => msg,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged, skipped {} messages", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    // The feed is one-way; client frames are only logged
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    debug!("Ignoring WebSocket client message: {}", text);
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket client disconnected");
                    break;
                }
                Ok(Message::Binary(_)) => {
                    warn!("Received unexpected binary message");
                }
                Ok(_) => {}
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("WebSocket connection closed");
}
