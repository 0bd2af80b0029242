//! Single WebSocket connection with auto-reconnect and keep-alive.
//!
//! Each `WsConnection` runs as a tokio task that:
//! 1. Connects to the server's push endpoint (plain or TLS).
//! 2. Sends the handshake message, if any (Socket.IO namespace connect).
//! 3. Reads text frames and forwards them to a callback, answering
//!    protocol-level heartbeats inline.
//! 4. Optionally sends periodic ping messages.
//! 5. Automatically reconnects on disconnection with exponential backoff.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Callback invoked for each received text message that is not a heartbeat.
pub type OnMessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback invoked on connection state changes.
pub type OnStatusCallback = Arc<dyn Fn(WsStatus) + Send + Sync>;

/// Connection state reported to [`OnStatusCallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsStatus {
    Connected,
    Disconnected { reason: String },
}

/// Ping payload format.
#[derive(Debug, Clone)]
pub enum PingPayload {
    /// Send a text frame.
    Text(String),
    /// Use the standard WebSocket ping frame.
    WebSocketPing,
}

/// Configuration for a single WebSocket connection.
#[derive(Debug, Clone)]
pub struct WsConnConfig {
    /// Full WebSocket URL (e.g. `ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket`).
    pub url: String,
    /// Message to send immediately after every (re)connect.
    pub handshake_msg: Option<String>,
    /// Text frames answered inline instead of being forwarded:
    /// `(received, reply)`. Engine.IO uses `("2", "3")`.
    pub auto_replies: Vec<(String, String)>,
    /// Extra HTTP headers for the handshake.
    pub extra_headers: HashMap<String, String>,
    /// Interval between ping messages.
    pub ping_interval: Option<Duration>,
    /// Ping message format.
    pub ping_payload: Option<PingPayload>,
    /// Log prefix.
    pub label: String,
}

impl WsConnConfig {
    fn auto_reply(&self, text: &str) -> Option<&str> {
        self.auto_replies.iter().find(|(recv, _)| recv == text).map(|(_, reply)| reply.as_str())
    }
}

/// A single WebSocket connection managed by a background tokio task.
pub struct WsConnection {
    /// Connection configuration.
    pub config: WsConnConfig,
    /// Channel to send outbound messages.
    outbound_tx: Option<mpsc::Sender<String>>,
    /// Shutdown signal sender.
    shutdown_tx: Option<watch::Sender<bool>>,
    /// Task join handle.
    task: Option<tokio::task::JoinHandle<()>>,
}

impl WsConnection {
    /// Create a new (not yet started) connection.
    pub fn new(config: WsConnConfig) -> Self {
        Self {
            config,
            outbound_tx: None,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Start the connection task.
    pub fn start(&mut self, on_text: OnMessageCallback, on_status: Option<OnStatusCallback>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::channel::<String>(64);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            connection_loop(config, on_text, on_status, outbound_rx, shutdown_rx).await;
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.outbound_tx = Some(outbound_tx);
        self.task = Some(task);
    }

    /// Send a text message on this connection.
    pub async fn send(&self, msg: String) -> anyhow::Result<()> {
        if let Some(tx) = &self.outbound_tx {
            tx.send(msg).await?;
        }
        Ok(())
    }

    /// Stop the connection and wait for the task to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.outbound_tx = None;
    }
}

/// Main connection loop: connects, handshakes, reads, pings, reconnects.
async fn connection_loop(
    config: WsConnConfig,
    on_text: OnMessageCallback,
    on_status: Option<OnStatusCallback>,
    mut outbound_rx: mpsc::Receiver<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut backoff = Duration::from_millis(100);
    let max_backoff = Duration::from_secs(30);
    let label = config.label.as_str();
    let notify = |status: WsStatus| {
        if let Some(ref cb) = on_status {
            cb(status);
        }
    };

    loop {
        if *shutdown_rx.borrow() {
            info!("[{label}] shutdown requested");
            return;
        }

        info!("[{label}] connecting to {}", config.url);

        let ws_stream = match connect_ws(&config).await {
            Ok(s) => {
                backoff = Duration::from_millis(100);
                info!("[{label}] connected");
                s
            }
            Err(e) => {
                error!("[{label}] connection failed: {e}, retrying in {backoff:?}");
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {},
                    _ = shutdown_rx.changed() => return,
                }
                backoff = (backoff * 2).min(max_backoff);
                continue;
            }
        };

        let (mut ws_write, mut ws_read) = ws_stream.split();

        if let Some(ref hello) = config.handshake_msg {
            debug!("[{label}] handshake: {hello}");
            if let Err(e) = ws_write.send(Message::Text(hello.clone().into())).await {
                error!("[{label}] handshake send failed: {e}");
                continue;
            }
        }
        notify(WsStatus::Connected);

        let ping_interval = config.ping_interval.map(tokio::time::interval);

        tokio::pin! {
            let ping_tick = async {
                if let Some(mut interval) = ping_interval {
                    loop {
                        interval.tick().await;
                    }
                } else {
                    std::future::pending::<()>().await
                }
            };
        }

        let reason = loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("[{label}] shutdown signal received");
                    let _ = ws_write.close().await;
                    notify(WsStatus::Disconnected { reason: "shutdown".into() });
                    return;
                }

                msg = ws_read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(reply) = config.auto_reply(&text) {
                                if let Err(e) = ws_write.send(Message::Text(reply.to_string().into())).await {
                                    break format!("heartbeat reply failed: {e}");
                                }
                            } else {
                                on_text(&text);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            warn!("[{label}] received close frame");
                            break "closed by server".to_string();
                        }
                        Some(Err(e)) => {
                            error!("[{label}] read error: {e}");
                            break format!("read error: {e}");
                        }
                        None => {
                            warn!("[{label}] stream ended");
                            break "stream ended".to_string();
                        }
                        _ => {} // Binary, Pong, Frame: ignore
                    }
                }

                Some(msg) = outbound_rx.recv() => {
                    if let Err(e) = ws_write.send(Message::Text(msg.into())).await {
                        error!("[{label}] send error: {e}");
                        break format!("send error: {e}");
                    }
                }

                _ = &mut ping_tick => {
                    let ping_msg = match &config.ping_payload {
                        Some(PingPayload::Text(t)) => Message::Text(t.clone().into()),
                        Some(PingPayload::WebSocketPing) | None => Message::Ping(vec![].into()),
                    };
                    if let Err(e) = ws_write.send(ping_msg).await {
                        error!("[{label}] ping send error: {e}");
                        break format!("ping error: {e}");
                    }
                }
            }
        };

        notify(WsStatus::Disconnected { reason });
        warn!("[{label}] disconnected, reconnecting in {backoff:?}");
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {},
            _ = shutdown_rx.changed() => return,
        }
        backoff = (backoff * 2).min(max_backoff);
    }
}

/// Establish a WebSocket connection (TLS when the URL asks for it).
async fn connect_ws(
    config: &WsConnConfig,
) -> anyhow::Result<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
> {
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;

    let mut request = config.url.as_str().into_client_request()?;
    for (key, value) in &config.extra_headers {
        request.headers_mut().insert(
            tokio_tungstenite::tungstenite::http::HeaderName::from_bytes(key.as_bytes())?,
            tokio_tungstenite::tungstenite::http::HeaderValue::from_str(value)?,
        );
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
    Ok(stream)
}
