use std::sync::Arc;

use anyhow::Result;

use backend_application::ops::{HubPublisher, StreamHub};
use backend_application::{AppState, Metrics};
use backend_infrastructure::{AppConfig, MlScorerService, PostgresStore};
use backend_interfaces_http::HttpState;

pub struct AppContext {
    pub state: HttpState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let store = Arc::new(PostgresStore::connect(&db_config).await?);
        store.ensure_schema().await?;

        let scorer = Arc::new(MlScorerService::new(&runtime_config)?);
        let hub = Arc::new(StreamHub::new());
        let publisher = Arc::new(HubPublisher::new(hub.clone()));

        let app = AppState {
            config: runtime_config,
            anomaly_store: store.clone(),
            transaction_store: store,
            scorer,
            publisher,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self {
            state: HttpState { app, hub },
        })
    }
}
