//! Request handlers for all API endpoints

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use tracing::{error, info, warn};

use super::models::*;
use super::websocket::WsMessage;
use super::AppState;
use crate::api::conductor::TradeIntent;
use crate::api::payments::SubscriptionTier;
use crate::directory::stats::{trade_volume, PlatformStats};
use crate::error::GatewayError;
use crate::models::{Chain, CopyTrade};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Map a domain error onto its HTTP status and error body
pub fn api_error(err: GatewayError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, label) = match &err {
        GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
        GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        GatewayError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
        GatewayError::UpstreamRejected { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Upstream service rejected the request",
        ),
        GatewayError::UpstreamTimeout { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "Upstream service timed out")
        }
        GatewayError::UpstreamUnavailable { .. }
        | GatewayError::UpstreamFailure { .. }
        | GatewayError::UpstreamDecode { .. } => {
            (StatusCode::BAD_GATEWAY, "Upstream service failed")
        }
        GatewayError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    };

    if status.is_server_error() || err.is_upstream() {
        error!("{}: {}", label, err);
    } else {
        warn!("{}: {}", label, err);
    }

    (
        status,
        Json(ErrorResponse {
            error: label.to_string(),
            details: Some(err.to_string()),
        }),
    )
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        api_error(self).into_response()
    }
}

// Malformed bodies and query strings are reported like any other validation error
impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Probe every upstream concurrently; unreachable services are reported, not failed
pub async fn services_health(State(state): State<AppState>) -> Json<ServicesHealthResponse> {
    let (citadel, conductor, payments) = futures::future::join3(
        state.citadel.health(),
        state.conductor.health(),
        state.payments.health(),
    )
    .await;

    let services = vec![citadel, conductor, payments];
    Json(ServicesHealthResponse {
        healthy: services.iter().all(|s| s.healthy),
        services,
    })
}

// ============================================================================
// Traders
// ============================================================================

pub async fn list_traders(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<TradersQuery>, GatewayError>,
) -> Json<TradersListResponse> {
    state.simulate_latency().await;

    let result = query.to_query().run(state.directory.traders());
    Json(TradersListResponse {
        traders: result.traders,
        total: result.total,
    })
}

pub async fn get_trader(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TraderResponse> {
    state.simulate_latency().await;

    match state.directory.get(&id) {
        Some(trader) => Ok(Json(TraderResponse {
            trader: trader.clone(),
        })),
        None => Err(api_error(GatewayError::NotFound(format!(
            "Trader {} not found",
            id
        )))),
    }
}

pub async fn get_trader_trades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TraderTradesResponse> {
    if !state.directory.contains(&id) {
        return Err(api_error(GatewayError::NotFound(format!(
            "Trader {} not found",
            id
        ))));
    }
    state.simulate_latency().await;

    let trades = state.directory.trades_for(&id);
    let volume = trade_volume(trades.iter().copied());
    Ok(Json(TraderTradesResponse {
        count: trades.len(),
        volume,
        trades: trades.into_iter().cloned().collect(),
    }))
}

// ============================================================================
// Statistics
// ============================================================================

pub async fn get_stats(State(state): State<AppState>) -> Json<PlatformStats> {
    state.simulate_latency().await;
    Json(PlatformStats::compute(
        state.directory.traders(),
        state.directory.trades(),
    ))
}

// ============================================================================
// Copy Trade
// ============================================================================

const ANONYMOUS_USER: &str = "anonymous";

pub async fn activate_copy_trade(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ActivateCopyTradeRequest>, GatewayError>,
) -> ApiResult<ActivateCopyTradeResponse> {
    let user_id = req.user_id.as_deref().unwrap_or(ANONYMOUS_USER);

    let copy_trade = state
        .copy_trade_manager
        .activate(user_id, &req.trader_id, req.amount, req.settings)
        .await
        .map_err(api_error)?;

    state.broadcast(WsMessage::activated(&copy_trade));

    Ok(Json(ActivateCopyTradeResponse {
        success: true,
        copy_trade_id: copy_trade.id,
        trader_id: copy_trade.trader_id,
        amount: copy_trade.amount,
        settings: copy_trade.settings,
        activated_at: copy_trade.activated_at,
    }))
}

pub async fn list_copy_trades(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CopyTradesQuery>, GatewayError>,
) -> ApiResult<CopyTradesListResponse> {
    let user_id = match query.user_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(api_error(GatewayError::Validation(
                "userId query parameter is required".to_string(),
            )))
        }
    };

    let copy_trades = state
        .copy_trade_manager
        .list_for_user(&user_id)
        .await
        .into_iter()
        .map(|ct| summarize(&state, ct))
        .collect();

    Ok(Json(CopyTradesListResponse { copy_trades }))
}

fn summarize(state: &AppState, ct: CopyTrade) -> CopyTradeSummary {
    CopyTradeSummary {
        trader_name: state
            .directory
            .get(&ct.trader_id)
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        id: ct.id,
        trader_id: ct.trader_id,
        amount: ct.amount,
        status: ct.status,
        activated_at: ct.activated_at,
        stopped_at: ct.stopped_at,
    }
}

pub async fn get_copy_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CopyTradeSummary> {
    let ct = state
        .copy_trade_manager
        .get(&id)
        .await
        .ok_or_else(|| api_error(GatewayError::NotFound(format!("Copy trade {} not found", id))))?;

    Ok(Json(summarize(&state, ct)))
}

pub async fn stop_copy_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StopCopyTradeResponse> {
    let copy_trade = state
        .copy_trade_manager
        .stop(&id)
        .await
        .map_err(api_error)?;

    state.broadcast(WsMessage::stopped(&copy_trade));

    Ok(Json(StopCopyTradeResponse {
        success: true,
        copy_trade_id: copy_trade.id,
        status: copy_trade.status,
    }))
}

// ============================================================================
// Secrets
// ============================================================================

pub async fn store_secret(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<StoreSecretRequest>, GatewayError>,
) -> ApiResult<StoreSecretResponse> {
    let stored = state
        .citadel
        .store_secret(&req.secret, &req.name)
        .await
        .map_err(api_error)?;

    Ok(Json(StoreSecretResponse {
        store_id: stored.store_id,
        status: stored.status,
    }))
}

pub async fn sign_payload(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SignPayloadRequest>, GatewayError>,
) -> ApiResult<SignPayloadResponse> {
    let signature = state
        .citadel
        .sign_payload(&req.store_id, &req.payload_hash)
        .await
        .map_err(api_error)?;

    Ok(Json(SignPayloadResponse {
        signature: signature.signature,
        status: signature.status,
    }))
}

// ============================================================================
// Execution
// ============================================================================

pub async fn execute_trade(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ExecuteTradeRequest>, GatewayError>,
) -> ApiResult<ExecuteTradeResponse> {
    let chain: Chain = req
        .chain
        .parse()
        .map_err(|e: String| api_error(GatewayError::Validation(e)))?;

    let intent = TradeIntent {
        user_id: req.user_id,
        chain,
        action: req.action,
        params: req.params,
    };

    let execution = state
        .conductor
        .execute_trade(&intent)
        .await
        .map_err(api_error)?;

    state.broadcast(WsMessage::TradeExecuted {
        execution_id: execution.execution_id.clone(),
        user_id: intent.user_id.clone(),
        chain,
        action: intent.action.clone(),
        status: execution.status.clone(),
        timestamp: Utc::now(),
    });

    Ok(Json(ExecuteTradeResponse {
        execution_id: execution.execution_id,
        status: execution.status,
        tx_hash: execution.tx_hash,
        derived_address: execution.derived_address,
    }))
}

// ============================================================================
// Subscriptions
// ============================================================================

pub async fn create_subscription(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateSubscriptionRequest>, GatewayError>,
) -> ApiResult<CreateSubscriptionResponse> {
    let tier: SubscriptionTier = req.tier.parse().map_err(api_error)?;

    let payment = state
        .payments
        .create_subscription(&req.user_id, tier)
        .await
        .map_err(api_error)?;

    Ok(Json(CreateSubscriptionResponse {
        payment_address: payment.payment_address,
        amount_zec: payment.amount_zec,
        status: payment.status,
    }))
}

pub async fn check_payment(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<PaymentAddressRequest>, GatewayError>,
) -> ApiResult<PaymentStatusResponse> {
    let check = state
        .payments
        .check_payment(&req.payment_address)
        .await
        .map_err(api_error)?;

    Ok(Json(PaymentStatusResponse {
        received: check.received,
    }))
}

pub async fn simulate_payment(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<PaymentAddressRequest>, GatewayError>,
) -> ApiResult<PaymentStatusResponse> {
    let check = state
        .payments
        .simulate_payment(&req.payment_address)
        .await
        .map_err(api_error)?;

    info!("Simulated payment for {}", req.payment_address);
    Ok(Json(PaymentStatusResponse {
        received: check.received,
    }))
}
