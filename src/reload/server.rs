// src/reload/server.rs

//! HTTP surface for live mode: the artifact at `/` and the reload socket.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, SpliceError};
use crate::reload::notifier::{RELOAD_PAYLOAD, ReloadNotifier, ViewerMessage, ViewerSession};

#[derive(Debug, Clone)]
pub struct ServerState {
    pub artifact: PathBuf,
    pub notifier: Arc<ReloadNotifier>,
}

pub fn router(state: ServerState, reload_path: &str) -> Router {
    Router::new()
        .route("/", get(serve_artifact))
        .route(reload_path, get(reload_socket))
        .with_state(state)
}

async fn serve_artifact(State(state): State<ServerState>) -> Response {
    match tokio::fs::read_to_string(&state.artifact).await {
        Ok(body) => Html(body).into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "artifact has not been built yet").into_response()
        }
        Err(err) => {
            error!(path = %state.artifact.display(), error = %err, "failed to read artifact");
            (StatusCode::INTERNAL_SERVER_ERROR, "could not read artifact").into_response()
        }
    }
}

async fn reload_socket(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| handle_viewer(socket, state.notifier))
}

async fn handle_viewer(socket: WebSocket, notifier: Arc<ReloadNotifier>) {
    let Some(ViewerSession { id, mut messages }) = notifier.connect() else {
        let mut socket = socket;
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    let (mut sender, mut receiver) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            match msg {
                ViewerMessage::Reload => {
                    if sender.send(Message::Text(RELOAD_PAYLOAD.into())).await.is_err() {
                        break;
                    }
                }
                ViewerMessage::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => debug!(id, text = text.as_str(), "message from viewer"),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(id, error = %err, "viewer socket error");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    writer.abort();
    notifier.disconnect(id);
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = self.join.await {
            warn!(error = %err, "viewer server task ended abnormally");
        }
    }
}

/// Bind `127.0.0.1:port` and serve in the background.
///
/// A bind failure is returned to the caller; port `0` picks a free port.
pub async fn spawn_server(
    port: u16,
    reload_path: &str,
    artifact: PathBuf,
    notifier: Arc<ReloadNotifier>,
) -> Result<ServerHandle> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind viewer server on port {port}"))
        .map_err(SpliceError::Other)?;
    let addr = listener.local_addr()?;

    let app = router(ServerState { artifact, notifier }, reload_path);
    let (tx, rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await;
        if let Err(err) = served {
            error!(error = %err, "viewer server failed");
        }
    });

    info!(%addr, "serving artifact");
    Ok(ServerHandle {
        addr,
        shutdown: Some(tx),
        join,
    })
}
