//! `reqwest` implementation of [`DashboardApi`](crate::DashboardApi).
//!
//! Every response goes through [`decode`]: 2xx bodies are deserialized into
//! the expected type, anything else becomes
//! [`DashError::Rejected`] carrying the server's `error` (or `message`) text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use pd_core::config::BackendConfig;
use pd_core::error::DashError;
use pd_core::types::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// REST client for the paper-trading backend.
pub struct HttpApi {
    /// Shared HTTP client (connection pool, timeout).
    http: reqwest::Client,
    /// Base URL without a trailing slash (e.g. `http://127.0.0.1:5000`).
    base_url: String,
}

impl HttpApi {
    /// Create a new client. No connection is opened until the first request.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("[rest] backend at {base_url}");
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("[rest] GET {path}");
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| DashError::Transport(format!("GET {path}: {e}")))?;
        decode(path, resp).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!("[rest] POST {path}");
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| DashError::Transport(format!("POST {path}: {e}")))?;
        decode(path, resp).await
    }
}

/// Build the `/api/quotes` query path. Symbols are percent-encoded
/// individually and joined with literal commas.
pub fn quotes_path(symbols: &[String]) -> String {
    let joined = symbols.iter().map(|s| urlencoding::encode(s)).collect::<Vec<_>>().join(",");
    format!("/api/quotes?symbols={joined}")
}

/// Turn a response into `T` or a typed [`DashError`].
async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| DashError::Transport(format!("{path}: reading body: {e}")))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(DashError::Rejected { status: status.as_u16(), message }.into());
    }

    serde_json::from_slice(&body).map_err(|e| DashError::Decode(format!("{path}: {e}")).into())
}

#[async_trait]
impl crate::DashboardApi for HttpApi {
    async fn fetch_portfolio(&self) -> Result<Vec<PortfolioPosition>> {
        self.get_json("/api/portfolio").await
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch> {
        self.get_json(&quotes_path(symbols)).await
    }

    async fn fetch_account(&self) -> Result<Account> {
        self.get_json("/api/account").await
    }

    async fn fetch_profile(&self) -> Result<Profile> {
        self.get_json("/api/profile").await
    }

    async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>> {
        self.get_json("/api/pending_orders").await
    }

    async fn fetch_trade_history(&self) -> Result<Vec<TradeRecord>> {
        self.get_json("/api/trade_history").await
    }

    async fn place_order(&self, order: &Order) -> Result<Ack> {
        info!(
            "[rest] placing {:?} {} x{} {} @ {}",
            order.side(),
            order.symbol,
            order.quantity.unsigned_abs(),
            order.order_type,
            order.price
        );
        self.post_json("/api/orders", order).await
    }

    async fn update_notes(&self, update: &NotesUpdate) -> Result<Ack> {
        self.post_json("/api/portfolio/notes", update).await
    }
}
