use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    assessments: AtomicU64,
    fallback_assessments: AtomicU64,
    anomalies_created: AtomicU64,
    anomaly_updates: AtomicU64,
    anomaly_deletes: AtomicU64,
    sync_failures: AtomicU64,
}

impl Metrics {
    pub fn record_assessment(&self, used_fallback: bool) {
        self.assessments.fetch_add(1, Ordering::Relaxed);
        if used_fallback {
            self.fallback_assessments.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_anomaly_created(&self) {
        self.anomalies_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly_updated(&self) {
        self.anomaly_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly_deleted(&self) {
        self.anomaly_deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_failure(&self) {
        self.sync_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let assessments = self.assessments.load(Ordering::Relaxed);
        let fallbacks = self.fallback_assessments.load(Ordering::Relaxed);
        let created = self.anomalies_created.load(Ordering::Relaxed);
        let updates = self.anomaly_updates.load(Ordering::Relaxed);
        let deletes = self.anomaly_deletes.load(Ordering::Relaxed);
        let sync_failures = self.sync_failures.load(Ordering::Relaxed);

        format!(
            "# TYPE vigil_assessments_total counter\n\
vigil_assessments_total {}\n\
# TYPE vigil_fallback_assessments_total counter\n\
vigil_fallback_assessments_total {}\n\
# TYPE vigil_anomalies_created_total counter\n\
vigil_anomalies_created_total {}\n\
# TYPE vigil_anomaly_updates_total counter\n\
vigil_anomaly_updates_total {}\n\
# TYPE vigil_anomaly_deletes_total counter\n\
vigil_anomaly_deletes_total {}\n\
# TYPE vigil_sync_failures_total counter\n\
vigil_sync_failures_total {}\n",
            assessments, fallbacks, created, updates, deletes, sync_failures
        )
    }
}
