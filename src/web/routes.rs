//! API route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use super::websocket::ws_handler;
use super::AppState;

/// Create all API routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/api/health", get(handlers::health_check))
        .route("/api/services/health", get(handlers::services_health))

        // Trader directory
        .route("/api/traders", get(handlers::list_traders))
        .route("/api/traders/:id", get(handlers::get_trader))
        .route("/api/traders/:id/trades", get(handlers::get_trader_trades))

        // Statistics
        .route("/api/stats", get(handlers::get_stats))

        // Copy trading
        .route("/api/copy-trade", post(handlers::activate_copy_trade))
        .route("/api/copy-trade", get(handlers::list_copy_trades))
        .route("/api/copy-trade/:id", get(handlers::get_copy_trade))
        .route("/api/copy-trade/:id", delete(handlers::stop_copy_trade))

        // Secret custody
        .route("/api/secrets", post(handlers::store_secret))
        .route("/api/secrets/sign", post(handlers::sign_payload))

        // Trade execution
        .route("/api/execute", post(handlers::execute_trade))

        // Subscriptions
        .route("/api/subscriptions", post(handlers::create_subscription))
        .route("/api/subscriptions/check", post(handlers::check_payment))
        .route("/api/subscriptions/simulate", post(handlers::simulate_payment))

        // WebSocket
        .route("/ws", get(ws_handler))

        // Add state to all routes
        .with_state(state)
}
