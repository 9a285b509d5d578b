use tracing::error;

use backend_domain::{Anomaly, AnomalyFilter, PagedResult};

use crate::{AppError, AppState};

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 200;

pub async fn list_anomalies(
    state: &AppState,
    mut filter: AnomalyFilter,
) -> Result<PagedResult<Anomaly>, AppError> {
    let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    filter.limit = Some(limit);
    filter.offset = Some(filter.offset.unwrap_or(0));

    state.anomaly_store.list(&filter).await.map_err(|err| {
        error!("failed to list anomalies: {}", err);
        AppError::Internal(err)
    })
}

pub async fn get_anomaly(state: &AppState, anomaly_id: &str) -> Result<Anomaly, AppError> {
    state
        .anomaly_store
        .find_by_id(anomaly_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound)
}

/// Bounded page of currently open anomalies, newest first. Served to a
/// privileged subscriber on connect so it never has to reconcile a missed
/// backlog of individual events.
pub async fn open_snapshot(state: &AppState) -> Result<Vec<Anomaly>, AppError> {
    let filter = AnomalyFilter::open_page(state.config.snapshot_limit);
    let page = state
        .anomaly_store
        .list(&filter)
        .await
        .map_err(AppError::Internal)?;
    Ok(page.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::anomaly_commands::{create_manual, update_anomaly};
    use crate::testkit::{features, state_with, TestHarness};
    use backend_domain::{AnomalyPatch, AnomalyStatus};

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let harness = TestHarness::new();
        let state = state_with(&harness);
        let filter = AnomalyFilter {
            limit: Some(0),
            ..AnomalyFilter::default()
        };
        let err = list_anomalies(&state, filter).await.expect_err("bad request");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn snapshot_is_bounded_and_open_only() {
        let harness = TestHarness::new();
        let mut state = state_with(&harness);
        state.config.snapshot_limit = 3;

        let mut ids = Vec::new();
        for i in 0..5 {
            let created = create_manual(&state, &features(&format!("T{}", i)))
                .await
                .expect("create");
            ids.push(created.id);
        }
        // resolve one: it must drop out of the snapshot
        let patch = AnomalyPatch {
            status: Some(AnomalyStatus::Resolved),
            ..AnomalyPatch::default()
        };
        update_anomaly(&state, &ids[4], patch, None).await.expect("resolve");

        let snapshot = open_snapshot(&state).await.expect("snapshot");
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|a| a.status == AnomalyStatus::Open));
    }

    #[tokio::test]
    async fn status_filter_narrows_listing() {
        let harness = TestHarness::new();
        let state = state_with(&harness);

        let kept = create_manual(&state, &features("T1")).await.expect("create");
        let resolved = create_manual(&state, &features("T2")).await.expect("create");
        let patch = AnomalyPatch {
            status: Some(AnomalyStatus::Resolved),
            ..AnomalyPatch::default()
        };
        update_anomaly(&state, &resolved.id, patch, None).await.expect("resolve");

        let filter = AnomalyFilter {
            status: Some(AnomalyStatus::Open),
            ..AnomalyFilter::default()
        };
        let page = list_anomalies(&state, filter).await.expect("list");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].id, kept.id);
    }
}
