//! Prometheus Metrics
//!
//! The engine records through the `metrics` facade; this module installs the
//! recorder and renders it for `/metrics`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;
use crate::ServerError;

const TURN_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the global Prometheus recorder. Call once per process.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("order_engine_turn_duration_seconds".to_string()),
            TURN_BUCKETS,
        )
        .map_err(|e| ServerError::Metrics(e.to_string()))?
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(
        "order_engine_messages_total",
        Unit::Count,
        "Inbound customer messages by resulting state"
    );
    describe_counter!(
        "order_engine_state_transitions_total",
        Unit::Count,
        "Conversation state changes"
    );
    describe_counter!(
        "order_engine_orders_total",
        Unit::Count,
        "Orders by status change"
    );
    describe_counter!(
        "order_engine_storage_failures_total",
        Unit::Count,
        "Turns that could not load or save state"
    );
    describe_counter!(
        "order_engine_geocode_fallbacks_total",
        Unit::Count,
        "Addresses placed by city centroid or default city"
    );
    describe_histogram!(
        "order_engine_turn_duration_seconds",
        Unit::Seconds,
        "Time to process one message"
    );
    describe_counter!("http_requests_total", Unit::Count, "HTTP requests by route");
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Count a request against its route
pub fn record_request(route: &'static str, status: StatusCode) {
    metrics::counter!(
        "http_requests_total",
        "route" => route,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}
