//! # pd-rest
//!
//! Client for the paper-trading backend's REST API.
//!
//! [`DashboardApi`] is the seam between the dashboard and the network: the
//! event loop, snapshot loader, and action dispatcher only ever see this
//! trait. [`client::HttpApi`] implements it over `reqwest`.
//!
//! ## Endpoints
//!
//! | Operation           | Method | Path                      |
//! |---------------------|--------|---------------------------|
//! | Portfolio snapshot  | GET    | `/api/portfolio`          |
//! | Batch quotes        | GET    | `/api/quotes?symbols=…`   |
//! | Account balance     | GET    | `/api/account`            |
//! | Profile             | GET    | `/api/profile`            |
//! | Pending orders      | GET    | `/api/pending_orders`     |
//! | Trade history       | GET    | `/api/trade_history`      |
//! | Place order         | POST   | `/api/orders`             |
//! | Edit notes          | POST   | `/api/portfolio/notes`    |

pub mod client;

use anyhow::Result;
use async_trait::async_trait;
use pd_core::types::*;

pub use client::HttpApi;

/// Backend operations used by the dashboard.
///
/// All methods take `&self` so one instance can be shared through an `Arc`
/// by concurrently running fetch tasks.
///
/// Errors carry a [`pd_core::error::DashError`]: `Rejected` for non-2xx
/// responses (with the server's `error` text), `Transport` / `Decode`
/// otherwise.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Full list of holdings, in server order.
    async fn fetch_portfolio(&self) -> Result<Vec<PortfolioPosition>>;

    /// Latest prices for `symbols` in one request.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch>;

    async fn fetch_account(&self) -> Result<Account>;

    async fn fetch_profile(&self) -> Result<Profile>;

    async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>>;

    async fn fetch_trade_history(&self) -> Result<Vec<TradeRecord>>;

    /// Submit an order. Returns the server's confirmation.
    async fn place_order(&self, order: &Order) -> Result<Ack>;

    /// Replace the notes of one holding.
    async fn update_notes(&self, update: &NotesUpdate) -> Result<Ack>;
}
