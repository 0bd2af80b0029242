//! Action dispatcher: order submission and note edits.
//!
//! Each action is exactly one POST. The dispatcher reports the outcome and
//! never writes to the portfolio store; the event loop decides what to reload.
//! A non-2xx answer surfaces as [`DashError::Rejected`] with the backend's
//! message untouched.

use std::sync::Arc;

use anyhow::Result;
use pd_core::error::DashError;
use pd_core::types::*;
use pd_rest::DashboardApi;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::input::Prompter;

// ---------------------------------------------------------------------------
// Order form
// ---------------------------------------------------------------------------

/// Raw order input as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub side: Side,
    pub symbol: String,
    pub quantity: String,
    /// `MARKET` when absent.
    pub order_type: Option<String>,
    /// Sent as `0` when absent or blank.
    pub price: Option<String>,
}

impl OrderForm {
    /// Coerce the form into a wire order.
    ///
    /// Only parsing happens here. Whether the quantity or price makes sense is
    /// for the backend to judge.
    pub fn into_order(self) -> Result<Order, DashError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(DashError::InvalidInput("symbol is empty".into()));
        }
        let quantity: u64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| DashError::InvalidInput(format!("quantity '{}' is not a whole number", self.quantity)))?;
        let order_type = match self.order_type.as_deref().map(str::trim) {
            None | Some("") => OrderType::Market,
            Some(raw) => raw.parse().map_err(DashError::InvalidInput)?,
        };
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => Decimal::ZERO,
            Some(raw) => raw
                .parse::<Decimal>()
                .map_err(|_| DashError::InvalidInput(format!("price '{raw}' is not a number")))?,
        };
        Order::new(symbol, self.side, quantity, order_type, price)
            .ok_or_else(|| DashError::InvalidInput(format!("quantity '{}' is too large", self.quantity.trim())))
    }
}

// ---------------------------------------------------------------------------
// ActionDispatcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ActionDispatcher {
    api: Arc<dyn DashboardApi>,
    prompter: Prompter,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn DashboardApi>, prompter: Prompter) -> Self {
        Self { api, prompter }
    }

    /// Submit one order.
    pub async fn submit_order(&self, order: &Order) -> Result<Ack> {
        let ack = self.api.place_order(order).await?;
        info!("[dispatch] order {} accepted: {}", order.symbol, ack.message);
        Ok(ack)
    }

    /// Ask the user for new notes for `symbol`, pre-filled with `current`,
    /// and save them.
    ///
    /// Returns `Ok(None)` when the prompt was cancelled; no request is sent
    /// in that case. An empty answer clears the notes.
    pub async fn edit_notes(&self, symbol: &str, current: &str) -> Result<Option<Ack>> {
        let Some(notes) = self.prompter.ask(format!("Enter new notes for {symbol}:"), current).await else {
            debug!("[dispatch] notes edit for {symbol} cancelled");
            return Ok(None);
        };
        let update = NotesUpdate { symbol: symbol.to_string(), notes };
        let ack = self.api.update_notes(&update).await?;
        info!("[dispatch] notes for {symbol} saved");
        Ok(Some(ack))
    }
}
