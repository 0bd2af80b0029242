//! WebSocket client with auto-reconnect, used for the server-push channel.

pub mod client;

pub use client::{OnMessageCallback, OnStatusCallback, PingPayload, WsConnConfig, WsConnection, WsStatus};
