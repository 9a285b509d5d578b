use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::assess_commands::{self, CheckOutcome};
use backend_domain::TransactionFeatures;

use crate::error::HttpError;
use crate::middleware::authorize_privileged;
use crate::state::HttpState;

#[derive(serde::Deserialize)]
pub struct CheckPayload {
    #[serde(default)]
    pub create_anomaly: bool,
    #[serde(flatten)]
    pub transaction: TransactionFeatures,
}

/// Runs a risk check for one transaction. Optionally opens an anomaly case
/// when the assessment flags it; a failed case creation never fails the
/// check itself.
pub async fn check_transaction(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(payload): Json<CheckPayload>,
) -> Result<Json<CheckOutcome>, HttpError> {
    let _ctx = authorize_privileged(&state.app.config, &headers)
        .map_err(|_| HttpError::Unauthorized)?;

    let outcome = assess_commands::check_transaction(
        &state.app,
        payload.transaction,
        payload.create_anomaly,
    )
    .await?;
    Ok(Json(outcome))
}
