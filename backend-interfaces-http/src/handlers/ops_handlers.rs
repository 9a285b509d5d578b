use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use crate::middleware::authorize_read;
use crate::state::HttpState;

#[derive(serde::Serialize)]
struct ScorerStatus {
    status: String,
    scorer_url: String,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<HttpState>) -> StatusCode {
    let timeout_secs = state.app.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.app.anomaly_store.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Reports whether the remote scorer is reachable. The engine keeps
/// assessing through the fallback either way; this is for operators.
pub async fn scorer_check(
    State(state): State<HttpState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let scorer_url = state.app.config.scorer_base_url.clone();
    if !authorize_read(&state.app.config, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ScorerStatus {
                status: "unauthorized".to_string(),
                scorer_url,
            }),
        )
            .into_response();
    }

    let timeout_secs = state.app.config.scorer_timeout_seconds.max(1);
    match timeout(
        Duration::from_secs(timeout_secs),
        state.app.scorer.check_scorer(),
    )
    .await
    {
        Ok(Ok(_)) => (
            StatusCode::OK,
            Json(ScorerStatus {
                status: "ok".to_string(),
                scorer_url,
            }),
        )
            .into_response(),
        Ok(Err(err)) => {
            error!("scorer check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ScorerStatus {
                    status: "error".to_string(),
                    scorer_url,
                }),
            )
                .into_response()
        }
        Err(_) => {
            error!("scorer check timeout after {}s", timeout_secs);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ScorerStatus {
                    status: "timeout".to_string(),
                    scorer_url,
                }),
            )
                .into_response()
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<HttpState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize_read(&state.app.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.app.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
