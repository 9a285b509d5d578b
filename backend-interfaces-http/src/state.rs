use std::sync::Arc;

use backend_application::ops::StreamHub;
use backend_application::AppState;

/// Router state: the application state plus the hub the stream endpoint
/// subscribes against. Publishing goes through the injected EventPublisher
/// inside AppState; only subscription needs the hub directly.
#[derive(Clone)]
pub struct HttpState {
    pub app: AppState,
    pub hub: Arc<StreamHub>,
}
