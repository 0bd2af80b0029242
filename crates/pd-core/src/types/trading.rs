//! Trading-related data structures: order requests, pending orders, and
//! closed trades.
//!
//! The client never models order state beyond submission: [`Order`] is
//! write-only, while [`PendingOrder`] and [`TradeRecord`] are read-only
//! projections of server tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{OrderStatus, OrderType, Side};

// ---------------------------------------------------------------------------
// Order request (client → backend)
// ---------------------------------------------------------------------------

/// Body of `POST /api/orders`.
///
/// `quantity` is signed: positive buys, negative sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub quantity: i64,
    pub order_type: OrderType,
    /// Limit price. Market orders send `0` and the backend fills in the
    /// last traded price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Order {
    /// Build an order. `None` when `quantity` exceeds `i64::MAX`.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
        order_type: OrderType,
        price: Decimal,
    ) -> Option<Self> {
        let quantity = side.signed(quantity)?;
        Some(Self { symbol: symbol.into(), quantity, order_type, price })
    }

    pub fn side(&self) -> Side {
        if self.quantity < 0 { Side::Sell } else { Side::Buy }
    }
}

/// Body of `POST /api/portfolio/notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesUpdate {
    pub symbol: String,
    pub notes: String,
}

/// Success payload shared by the write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
    /// Present on order placement.
    #[serde(default)]
    pub order_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Read-only projections (backend → client)
// ---------------------------------------------------------------------------

/// A row of `GET /api/pending_orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order_id: String,
    pub symbol: String,
    pub quantity: i64,
    #[serde(default)]
    pub price: Decimal,
    pub order_type: OrderType,
    pub status: OrderStatus,
}

/// A row of `GET /api/trade_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: i64,
    pub symbol: String,
    pub quantity: i64,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub pnl: Decimal,
}
