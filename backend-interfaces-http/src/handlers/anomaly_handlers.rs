use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::commands::anomaly_commands;
use backend_application::queries::anomaly_queries;
use backend_domain::{
    Anomaly,
    AnomalyFilter,
    AnomalyPatch,
    Assessment,
    NewComment,
    PagedResult,
    TransactionFeatures,
};

use crate::error::HttpError;
use crate::middleware::{authorize_privileged, authorize_read, AuthContext};
use crate::state::HttpState;

#[derive(serde::Deserialize)]
pub struct CreateAnomalyPayload {
    pub transaction: TransactionFeatures,
    #[serde(default)]
    pub assessment: Option<Assessment>,
}

pub async fn list_anomalies(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(filter): Query<AnomalyFilter>,
) -> Result<Json<PagedResult<Anomaly>>, HttpError> {
    if !authorize_read(&state.app.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let page = anomaly_queries::list_anomalies(&state.app, filter).await?;
    Ok(Json(page))
}

pub async fn get_anomaly(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(anomaly_id): Path<String>,
) -> Result<Json<Anomaly>, HttpError> {
    if !authorize_read(&state.app.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let anomaly = anomaly_queries::get_anomaly(&state.app, &anomaly_id).await?;
    Ok(Json(anomaly))
}

/// With an assessment attached, the case opens only if the assessment
/// flagged the transaction; without one this is a manual flag.
pub async fn create_anomaly(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAnomalyPayload>,
) -> Result<Response, HttpError> {
    let _ctx = authorize_privileged(&state.app.config, &headers)
        .map_err(|_| HttpError::Unauthorized)?;

    match payload.assessment {
        Some(assessment) => {
            match anomaly_commands::create_from_assessment(
                &state.app,
                &payload.transaction,
                &assessment,
            )
            .await?
            {
                Some(anomaly) => Ok((StatusCode::CREATED, Json(anomaly)).into_response()),
                None => Ok((
                    StatusCode::OK,
                    Json(serde_json::json!({ "message": "No anomaly detected" })),
                )
                    .into_response()),
            }
        }
        None => {
            let anomaly =
                anomaly_commands::create_manual(&state.app, &payload.transaction).await?;
            Ok((StatusCode::CREATED, Json(anomaly)).into_response())
        }
    }
}

pub async fn update_anomaly(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(anomaly_id): Path<String>,
    Json(patch): Json<AnomalyPatch>,
) -> Result<Json<Anomaly>, HttpError> {
    let ctx = authorize_privileged(&state.app.config, &headers)
        .map_err(|_| HttpError::Unauthorized)?;
    let actor_id = ctx.as_ref().map(|c| c.user_id.as_str());
    let anomaly =
        anomaly_commands::update_anomaly(&state.app, &anomaly_id, patch, actor_id).await?;
    Ok(Json(anomaly))
}

pub async fn delete_anomaly(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(anomaly_id): Path<String>,
) -> Result<Json<Anomaly>, HttpError> {
    let _ctx = authorize_privileged(&state.app.config, &headers)
        .map_err(|_| HttpError::Unauthorized)?;
    let deleted = anomaly_commands::delete_anomaly(&state.app, &anomaly_id).await?;
    Ok(Json(deleted))
}

pub async fn add_comment(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(anomaly_id): Path<String>,
    Json(comment): Json<NewComment>,
) -> Result<Json<Anomaly>, HttpError> {
    let ctx = authorize_privileged(&state.app.config, &headers)
        .map_err(|_| HttpError::Unauthorized)?;
    let (author, author_id) = match &ctx {
        Some(AuthContext {
            username, user_id, ..
        }) => (username.as_str(), Some(user_id.as_str())),
        None => ("anonymous", None),
    };
    let anomaly =
        anomaly_commands::add_comment(&state.app, &anomaly_id, comment, author, author_id)
            .await?;
    Ok(Json(anomaly))
}
