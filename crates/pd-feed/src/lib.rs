//! # pd-feed
//!
//! Server-push price feed for the dashboard.
//!
//! The backend emits `price_update` events over a long-lived WebSocket
//! (Socket.IO framing by default). [`price_feed::PriceFeed`] owns the
//! connection, [`parser`] decodes frames, and decoded prices are delivered as
//! [`event::FeedEvent`]s on an unbounded channel consumed by the event loop.
//!
//! - [`price_feed`]: connection wiring and lifecycle
//! - [`parser`]: Socket.IO / JSON frame decoding
//! - [`json_util`]: decimal field helpers

pub mod event;
pub mod json_util;
pub mod parser;
pub mod price_feed;

use anyhow::Result;
use async_trait::async_trait;

pub use event::{FeedEvent, FeedEventReceiver, FeedEventSender};
pub use price_feed::PriceFeed;

/// Trait implemented by push-feed modules.
///
/// Only `Send` is required (not `Sync`) because the runner drives modules
/// sequentially, never concurrently.
#[async_trait]
pub trait FeedModule: Send {
    /// Human-readable module name.
    fn name(&self) -> &str;
    /// Connect and begin forwarding events.
    async fn start(&mut self) -> Result<()>;
    /// Gracefully stop the connection.
    async fn stop(&mut self) -> Result<()>;
}
