//! # pd-core
//!
//! Core crate for the paper-trading dashboard client, providing:
//!
//! - **Types** (`types`): positions, orders, price events, view rows
//! - **Store** (`store`): keyed portfolio store and price-event reconciler
//! - **Sequencing** (`sequence`): stale-response guard for snapshot loads
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): domain-specific `DashError` via thiserror
//! - **WebSocket** (`ws`): push-channel client with auto-reconnect
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod sequence;
pub mod store;
pub mod types;
pub mod ws;

// Re-export types at crate root for convenience.
pub use types::*;
