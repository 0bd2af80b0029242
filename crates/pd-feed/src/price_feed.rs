//! Push-channel module: one WebSocket connection feeding price events.
//!
//! ```text
//! PushConfig ──► PriceFeed.start() ──► WsConnection ──► parser ──► FeedEvent channel
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use pd_core::config::{PushConfig, PushProtocol};
use pd_core::ws::{OnMessageCallback, OnStatusCallback, PingPayload, WsConnConfig, WsConnection, WsStatus};
use tracing::{debug, info, warn};

use crate::event::{FeedEvent, FeedEventReceiver, FeedEventSender};
use crate::parser;

/// Engine.IO v4 namespace-connect packet for the default namespace.
const SOCKETIO_CONNECT: &str = "40";
/// Engine.IO ping from the server and the pong we owe it.
const ENGINEIO_PING: &str = "2";
const ENGINEIO_PONG: &str = "3";

/// Build the connection settings for a push config.
pub fn connection_config(config: &PushConfig) -> WsConnConfig {
    let (handshake_msg, auto_replies) = match config.protocol {
        PushProtocol::SocketIo => (
            Some(SOCKETIO_CONNECT.to_string()),
            vec![(ENGINEIO_PING.to_string(), ENGINEIO_PONG.to_string())],
        ),
        PushProtocol::Json => (None, Vec::new()),
    };

    WsConnConfig {
        url: config.url.clone(),
        handshake_msg,
        auto_replies,
        extra_headers: config.extra_headers.clone(),
        ping_interval: config.ping_interval_sec.map(Duration::from_secs),
        ping_payload: config.ping_interval_sec.map(|_| PingPayload::WebSocketPing),
        label: "push".into(),
    }
}

/// Price feed over the server-push WebSocket.
pub struct PriceFeed {
    config: PushConfig,
    event_tx: FeedEventSender,
    conn: Option<WsConnection>,
}

impl PriceFeed {
    /// Create a new feed.
    ///
    /// Returns the module and a receiver for [`FeedEvent`]s that the
    /// dashboard event loop should poll.
    pub fn new(config: PushConfig) -> (Self, FeedEventReceiver) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { config, event_tx: tx, conn: None }, rx)
    }
}

#[async_trait]
impl crate::FeedModule for PriceFeed {
    fn name(&self) -> &str {
        "price_feed"
    }

    async fn start(&mut self) -> Result<()> {
        if self.conn.is_some() {
            bail!("price feed already started");
        }

        let protocol = self.config.protocol;
        let tx = self.event_tx.clone();
        let on_text: OnMessageCallback = Arc::new(move |text| {
            let updates = parser::parse_message(text, protocol);
            if updates.is_empty() {
                debug!("[push] ignored frame: {text}");
            }
            for update in updates {
                if tx.send(FeedEvent::Price(update)).is_err() {
                    warn!("[push] event receiver dropped");
                    return;
                }
            }
        });

        let tx = self.event_tx.clone();
        let on_status: OnStatusCallback = Arc::new(move |status| {
            let event = match status {
                WsStatus::Connected => FeedEvent::Connected,
                WsStatus::Disconnected { reason } => FeedEvent::Disconnected { reason },
            };
            let _ = tx.send(event);
        });

        let mut conn = WsConnection::new(connection_config(&self.config));
        conn.start(on_text, Some(on_status));
        info!("[push] feed started ({:?}) on {}", protocol, self.config.url);
        self.conn = Some(conn);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mut conn) = self.conn.take() {
            conn.stop().await;
            info!("[push] feed stopped");
        }
        Ok(())
    }
}
