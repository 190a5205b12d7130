//! Fan-out supervisor (spec §4.6): binds the configured port and spawns
//! one independent session task per accepted WebSocket connection.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use rd_capture::DisplayCapture;
use rd_encode::JpegEncoder;
use rd_input::InputSynth;

use crate::config::Config;
use crate::session::run_session;
use crate::transport::WebSocketChannel;

/// Shared, read-only handles every session is spawned with (spec §5:
/// "no shared mutable state between [sessions] other than the
/// read-only Config and the OS input synthesizer").
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    capture: Arc<dyn DisplayCapture>,
    encoder: Arc<dyn JpegEncoder>,
    synth: Arc<dyn InputSynth>,
}

/// Bind `addr` and serve sessions until the process is shut down.
///
/// # Errors
///
/// Returns an error if the port can't be bound.
pub async fn run(
    addr: SocketAddr,
    config: Arc<Config>,
    capture: Arc<dyn DisplayCapture>,
    encoder: Arc<dyn JpegEncoder>,
    synth: Arc<dyn InputSynth>,
) -> anyhow::Result<()> {
    let state = AppState { config, capture, encoder, synth };
    let app = Router::new().route("/", get(upgrade)).with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    tracing::info!(%addr, "webrd-server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("server loop exited: {e}"))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let channel = Box::new(WebSocketChannel::new(socket));
        if let Err(err) = run_session(state.config, channel, state.capture, state.encoder, state.synth).await {
            tracing::warn!(%err, "session ended with a transport error");
        }
    })
}
