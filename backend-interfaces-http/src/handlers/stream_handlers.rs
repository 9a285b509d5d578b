// Real-time stream endpoint
// Every connection gets the general transaction feed; privileged roles
// additionally join the anomaly scope and receive an open-case snapshot on
// connect. Delivery is at-most-once: a lagged or reconnecting subscriber
// gets no replay beyond the snapshot.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use backend_application::ops::StreamEvent;
use backend_application::queries::anomaly_queries;

use crate::middleware::{authenticate, is_privileged, lookup_token, AuthContext};
use crate::state::HttpState;

#[derive(serde::Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

pub async fn stream(
    ws: WebSocketUpgrade,
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> Response {
    let ctx = query
        .token
        .as_deref()
        .and_then(|token| lookup_token(&state.app.config, token))
        .or_else(|| authenticate(&state.app.config, &headers));
    let privileged = is_privileged(&state.app.config, ctx.as_ref());

    ws.on_upgrade(move |socket| handle_socket(socket, state, ctx, privileged))
}

async fn handle_socket(
    socket: WebSocket,
    state: HttpState,
    ctx: Option<AuthContext>,
    privileged: bool,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut transactions_rx = state.hub.subscribe_transactions();
    let mut anomalies_rx = if privileged {
        Some(state.hub.subscribe_anomalies())
    } else {
        None
    };
    let mut user_rx = match &ctx {
        Some(ctx) => Some(state.hub.subscribe_user(&ctx.user_id).await),
        None => None,
    };

    if privileged {
        match anomaly_queries::open_snapshot(&state.app).await {
            Ok(snapshot) => {
                if !send_event(&mut sender, StreamEvent::InitialAnomalies(snapshot)).await {
                    return;
                }
            }
            Err(err) => warn!("failed to load anomaly snapshot for subscriber: {}", err),
        }
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!("stream subscriber read error: {}", err);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            event = transactions_rx.recv() => {
                if !forward(&mut sender, event).await {
                    break;
                }
            }
            event = recv_scoped(&mut anomalies_rx) => {
                if !forward(&mut sender, event).await {
                    break;
                }
            }
            event = recv_scoped(&mut user_rx) => {
                if !forward(&mut sender, event).await {
                    break;
                }
            }
        }
    }
}

/// Pending forever when the connection does not hold the scope, so the
/// select loop never polls it.
async fn recv_scoped(
    rx: &mut Option<broadcast::Receiver<StreamEvent>>,
) -> Result<StreamEvent, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn forward(
    sender: &mut SplitSink<WebSocket, Message>,
    event: Result<StreamEvent, RecvError>,
) -> bool {
    match event {
        Ok(event) => send_event(sender, event).await,
        Err(RecvError::Lagged(skipped)) => {
            // missed deltas are not replayed; the subscriber catches up
            // from live traffic
            warn!("stream subscriber lagged, {} events dropped", skipped);
            true
        }
        Err(RecvError::Closed) => false,
    }
}

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: StreamEvent) -> bool {
    match serde_json::to_string(&event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(err) => {
            warn!("failed to serialize stream event: {}", err);
            true
        }
    }
}
