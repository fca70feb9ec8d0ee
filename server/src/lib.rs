use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State as AxumState,
    },
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tombola_engine::{project, Economy};
use tombola_types::api::{
    AddPrizeRequest, AssignPrizeRequest, AuthMessage, CreditRequest, JoinReply, JoinRequest,
    Snapshot, WagerRequest,
};
use tombola_types::EngineError;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// Header carrying the caller's bearer id. The engine re-validates role
/// membership on every transaction.
const USER_HEADER: &str = "x-user";

/// Buffer size for the change-notification channel. Snapshots are full
/// replacements, so a lagged receiver just resends the current one.
const UPDATE_BUFFER_SIZE: usize = 1_024;

/// The shared economy plus the fan-out signal. One mutual-exclusion
/// domain: every transaction runs whole under the write lock, and the
/// change signal fires only after commit.
pub struct Hub {
    economy: RwLock<Economy>,
    update_tx: broadcast::Sender<()>,
}

impl Hub {
    pub fn new(pin: impl Into<String>) -> Self {
        let (update_tx, _) = broadcast::channel(UPDATE_BUFFER_SIZE);
        Self {
            economy: RwLock::new(Economy::new(pin)),
            update_tx,
        }
    }

    /// Runs one engine transaction and, on commit, notifies every
    /// connected viewer. A failed transaction notifies nobody.
    pub fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Economy) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let result = {
            let mut economy = match self.economy.write() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("economy lock poisoned; recovering");
                    poisoned.into_inner()
                }
            };
            f(&mut economy)
        };
        if result.is_ok() && self.update_tx.send(()).is_err() {
            debug!("no connected viewers to notify");
        }
        result
    }

    /// Projects the current state for one viewer under the read lock.
    pub fn snapshot(&self, viewer: Option<&str>) -> Snapshot {
        let economy = match self.economy.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("economy lock poisoned; recovering");
                poisoned.into_inner()
            }
        };
        project(&economy, viewer)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }
}

/// An engine rejection surfaced verbatim as an HTTP response.
struct Rejection(EngineError);

impl From<EngineError> for Rejection {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, self.0.to_string()).into_response()
    }
}

pub struct Api {
    hub: Arc<Hub>,
}

impl Api {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_HEADER)]);

        Router::new()
            .route("/join", post(join))
            .route("/player/play", post(play))
            .route("/cashier/credit", post(credit))
            .route("/cashier/add_prize", post(add_prize))
            .route("/cashier/assign_prize", post(assign_prize))
            .route("/cashier/reset_players", post(reset_players))
            .route("/cashier/logout", post(logout))
            .route("/ws", get(ws_upgrade))
            .layer(cors)
            .with_state(self.hub.clone())
    }
}

/// The bearer id presented by the caller; empty (and thus unknown to
/// the engine) when the header is missing or malformed.
fn caller(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn join(
    AxumState(hub): AxumState<Arc<Hub>>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinReply>, Rejection> {
    let reply = hub.mutate(|economy| economy.join(&req.name, req.role, req.pin.as_deref()))?;
    info!(name = %reply.name, role = %reply.role, "participant joined");
    Ok(Json(reply))
}

async fn play(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<WagerRequest>,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.wager(&caller(&headers), req.amount))?;
    Ok(StatusCode::OK)
}

async fn credit(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<CreditRequest>,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.credit(&caller(&headers), &req.player_id, req.amount))?;
    Ok(StatusCode::OK)
}

async fn add_prize(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<AddPrizeRequest>,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.define_prize(&caller(&headers), &req.name, req.amount))?;
    Ok(StatusCode::OK)
}

async fn assign_prize(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<AssignPrizeRequest>,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.assign_prize(&caller(&headers), req.index, &req.winner_id))?;
    Ok(StatusCode::OK)
}

async fn reset_players(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.reset_players(&caller(&headers)))?;
    Ok(StatusCode::OK)
}

async fn logout(
    AxumState(hub): AxumState<Arc<Hub>>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    hub.mutate(|economy| economy.cashier_logout(&caller(&headers)))?;
    Ok(StatusCode::OK)
}

async fn ws_upgrade(AxumState(hub): AxumState<Arc<Hub>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// One push channel. Each connection runs its own task and computes its
/// own filtered projection, so a broken or wedged channel never blocks
/// delivery to the others.
async fn handle_ws(socket: WebSocket, hub: Arc<Hub>) {
    info!("viewer connected");
    let (mut sender, mut receiver) = socket.split();
    let mut updates = hub.subscribe();
    let mut viewer: Option<String> = None;

    // Anonymous snapshot until the channel authenticates.
    if send_snapshot(&mut sender, &hub, viewer.as_deref())
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // The one recognized control message binds the
                        // channel to a viewer identity; everything else
                        // inbound (keepalives included) is ignored.
                        if let Ok(auth) = serde_json::from_str::<AuthMessage>(&text) {
                            viewer = Some(auth.auth.trim().to_string());
                            if send_snapshot(&mut sender, &hub, viewer.as_deref()).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            warn!("failed to send pong, viewer disconnected");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("viewer closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(?e, "websocket error");
                        break;
                    }
                    _ => {}
                }
            }
            update = updates.recv() => {
                match update {
                    // On any committed transaction, push this channel's
                    // projection. A lagged receiver is fine: snapshots
                    // are full replacements, so the current one covers
                    // every skipped signal.
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        if send_snapshot(&mut sender, &hub, viewer.as_deref()).await.is_err() {
                            warn!("failed to push snapshot, dropping viewer");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("update channel closed");
                        break;
                    }
                }
            }
        }
    }
    let _ = sender.close().await;
    info!("viewer disconnected");
}

async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    hub: &Hub,
    viewer: Option<&str>,
) -> Result<(), axum::Error> {
    let snapshot = hub.snapshot(viewer);
    let text = match serde_json::to_string(&snapshot) {
        Ok(text) => text,
        Err(e) => {
            error!(?e, "failed to serialize snapshot");
            return Ok(());
        }
    };
    sender.send(Message::Text(text)).await
}
