//! HTTP Endpoints
//!
//! REST API for the order engine.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use order_engine_config::constants::orders::ORDER_HISTORY_LIMIT;
use order_engine_config::RuntimeEnvironment;
use order_engine_core::{
    Branch, ConversationEntry, ConversationState, DraftOrder, NearbyOption, OutboundMessage,
    TurnOutcome,
};

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(
        &config.server.cors_origins,
        config.server.cors_enabled,
        config.environment,
    );
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config);

    Router::new()
        // Conversation
        .route("/api/messages", post(post_message))
        .route("/api/customers/:id/state", get(customer_state))
        .route("/api/customers/:id/order", get(pending_order))
        .route("/api/customers/:id/orders", get(order_history))
        .route("/api/customers/:id/history", get(conversation_history))
        // Directory
        .route("/api/nearby", get(nearby))
        .route("/api/menu", get(menu))
        .route("/api/branches", get(branches))
        // Admin
        .route("/admin/reload-catalog", post(reload_catalog))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - disabled: permissive
/// - no origins: any origin outside production, none in production
/// - otherwise the configured origins
fn build_cors_layer(origins: &[String], enabled: bool, env: RuntimeEnvironment) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        if env.is_production() {
            tracing::warn!("No CORS origins configured in production, cross-origin requests refused");
            return base;
        }
        return base.allow_origin(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    base.allow_origin(parsed_origins)
}

/// Inbound customer message
#[derive(Debug, Deserialize)]
struct MessageRequest {
    customer_id: String,
    message: String,
}

/// Turn outcome plus the rendered replies
#[derive(Debug, Serialize)]
struct MessageResponse {
    #[serde(flatten)]
    outcome: TurnOutcome,
    replies: Vec<String>,
}

/// POST /api/messages
async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    let customer_id = request.customer_id.trim();
    if customer_id.is_empty() {
        record_request("messages", StatusCode::BAD_REQUEST);
        return Err(ServerError::InvalidRequest("customer_id is required".to_string()));
    }

    let outcome = state.engine.handle_message(customer_id, &request.message).await;
    let replies = outcome.messages.iter().map(OutboundMessage::render).collect();
    record_request("messages", StatusCode::OK);

    Ok(Json(MessageResponse { outcome, replies }))
}

#[derive(Debug, Serialize)]
struct StateResponse {
    customer_id: String,
    state: ConversationState,
}

/// GET /api/customers/:id/state
async fn customer_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, ServerError> {
    let current = state.engine.get_user_state(&id).await?;
    Ok(Json(StateResponse {
        customer_id: id,
        state: current,
    }))
}

/// GET /api/customers/:id/order
async fn pending_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DraftOrder>, ServerError> {
    state
        .engine
        .get_pending_order(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("no pending order for {}", id)))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

/// GET /api/customers/:id/orders
async fn order_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DraftOrder>>, ServerError> {
    let limit = query.limit.unwrap_or(ORDER_HISTORY_LIMIT);
    Ok(Json(state.engine.order_history(&id, limit).await?))
}

/// GET /api/customers/:id/history
async fn conversation_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ConversationEntry>>, ServerError> {
    Ok(Json(state.engine.conversation_history(&id, query.limit).await?))
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    lat: f64,
    lon: f64,
}

/// GET /api/nearby?lat=&lon=
async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyOption>>, ServerError> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return Err(ServerError::InvalidRequest(format!(
            "coordinates out of range: {}, {}",
            query.lat, query.lon
        )));
    }
    Ok(Json(state.engine.get_nearby(query.lat, query.lon)))
}

/// GET /api/menu
async fn menu(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = state.engine.catalog();
    let items: Vec<_> = catalog.available().collect();

    Json(serde_json::json!({
        "text": state.engine.menu(),
        "items": items,
    }))
}

/// GET /api/branches
async fn branches(State(state): State<AppState>) -> Json<Vec<Branch>> {
    Json(state.engine.branches())
}

/// POST /admin/reload-catalog
async fn reload_catalog(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let items = state.reload_catalog()?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "items": items,
    })))
}

/// Health check over the engine's own dependencies
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let items = state.engine.catalog().len();
    let branches = state.engine.branches().len();
    let healthy = items > 0 && branches > 0;

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "catalog": { "status": if items > 0 { "ok" } else { "empty" }, "items": items },
                "branches": { "status": if branches > 0 { "ok" } else { "empty" }, "count": branches },
                "metrics": { "enabled": state.metrics.is_some() },
            }
        })),
    )
}
