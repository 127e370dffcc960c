//! WebSocket session lifecycle: a single control panel from upgrade through
//! disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use vrcbridge_runtime::BridgeHandle;

use super::connection::ClientConnection;
use super::handler::{FrameOutcome, handle_frame};
use crate::config::ServerConfig;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

/// Run a WebSocket session for a connected panel.
///
/// 1. Registers the connection with the dispatch loop, which queues the
///    `init` snapshot (and the active avatar's set) before any update
/// 2. Forwards queued frames to the socket, pinging on an interval and
///    dropping clients that stop answering
/// 3. Decodes inbound text frames as commands
/// 4. Unregisters on close, error, or shutdown
#[instrument(skip_all, fields(conn_id = %conn_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    conn_id: String,
    handle: BridgeHandle,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.outbound_buffer.max(1));
    let connection = Arc::new(ClientConnection::new(conn_id.clone(), send_tx));
    let started = Instant::now();

    if !handle.connect(connection.clone()) {
        warn!("dispatch loop stopped, refusing connection");
        let _ = ws_tx.send(Message::Close(None)).await;
        return;
    }
    info!("panel connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let ping_every = Duration::from_secs(config.heartbeat_interval_secs.max(1));
    let pong_timeout = Duration::from_secs(config.heartbeat_timeout_secs.max(1));
    let writer_conn = connection.clone();
    let writer_stop = shutdown.clone();
    let mut writer = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_every);
        // first tick is immediate
        let _ = ping.tick().await;
        loop {
            tokio::select! {
                frame = send_rx.recv() => {
                    let Some(text) = frame else { break };
                    if ws_tx.send(Message::Text(String::clone(&text).into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if !writer_conn.check_alive() && writer_conn.last_pong_elapsed() > pong_timeout {
                        warn!(timeout = ?pong_timeout, "panel unresponsive, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
                () = writer_stop.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
        // closing the receiver fails any delivery still pending on the loop
        send_rx.close();
    });

    let reason = loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let Some(Ok(frame)) = frame else { break "closed" };
                connection.mark_alive();
                let text = match frame {
                    Message::Text(text) => text,
                    Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => text.into(),
                        Err(_) => {
                            debug!(len = data.len(), "non-UTF8 binary frame ignored");
                            continue;
                        }
                    },
                    Message::Close(_) => break "close_frame",
                    Message::Ping(_) | Message::Pong(_) => continue,
                };
                if handle_frame(text.as_str(), &conn_id, &handle) == FrameOutcome::LoopStopped {
                    break "loop_stopped";
                }
            }
            _ = &mut writer => break "writer",
            () = shutdown.cancelled() => break "shutdown",
        }
    };

    let _ = handle.disconnect(&conn_id);
    if reason == "shutdown" {
        // the writer sends the close frame
        let _ = tokio::time::timeout(Duration::from_millis(250), &mut writer).await;
    }
    writer.abort();
    info!(reason, "panel disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL, "reason" => reason).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}
