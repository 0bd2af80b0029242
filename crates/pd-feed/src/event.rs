//! Events emitted by the push feed to the dashboard event loop.

use pd_core::types::PriceUpdate;

/// A typed event emitted by a [`FeedModule`](crate::FeedModule).
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A decoded `price_update`.
    Price(PriceUpdate),

    /// The push connection (re)connected and handshook.
    Connected,

    /// The push connection dropped; it will reconnect on its own.
    Disconnected {
        /// Human-readable reason.
        reason: String,
    },
}

/// Sender half of the feed event channel.
pub type FeedEventSender = tokio::sync::mpsc::UnboundedSender<FeedEvent>;

/// Receiver half of the feed event channel.
pub type FeedEventReceiver = tokio::sync::mpsc::UnboundedReceiver<FeedEvent>;
