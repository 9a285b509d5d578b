use axum::Router;

use crate::handlers::{anomaly_handlers, check_handlers, ops_handlers, stream_handlers};
use crate::state::HttpState;

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route(
            "/v1/transactions/check",
            axum::routing::post(check_handlers::check_transaction),
        )
        .route(
            "/v1/anomalies",
            axum::routing::get(anomaly_handlers::list_anomalies)
                .post(anomaly_handlers::create_anomaly),
        )
        .route(
            "/v1/anomalies/:id",
            axum::routing::get(anomaly_handlers::get_anomaly)
                .put(anomaly_handlers::update_anomaly)
                .delete(anomaly_handlers::delete_anomaly),
        )
        .route(
            "/v1/anomalies/:id/comments",
            axum::routing::post(anomaly_handlers::add_comment),
        )
        .route("/v1/stream", axum::routing::get(stream_handlers::stream))
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/scorer/check",
            axum::routing::get(ops_handlers::scorer_check),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
