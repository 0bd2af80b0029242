//! Dashboard core: snapshot loading, price reconciliation, user actions and
//! view rendering, driven by a single event loop.
//!
//! The moving parts:
//! - [`loader`]: one-shot fetch of a server collection into a [`Snapshot`].
//! - [`state`]: everything shown on screen, guarded against stale loads.
//! - [`dispatcher`]: order submission and note edits.
//! - [`input`]: asynchronous prompts for free-text input.
//! - [`command`]: console command parsing.
//! - [`render`]: pure text projection of the state.
//! - [`engine`]: the `select!` loop that owns the state.

pub mod command;
pub mod dispatcher;
pub mod engine;
pub mod input;
pub mod loader;
pub mod render;
pub mod state;

#[cfg(test)]
mod testing;

pub use command::{Command, View, parse_command};
pub use dispatcher::{ActionDispatcher, OrderForm};
pub use engine::{DashboardEngine, Notice, NoticeReceiver};
pub use input::{InputReceiver, InputRequest, Prompter, prompt_channel};
pub use loader::{Snapshot, fetch_snapshot};
pub use state::DashboardState;
