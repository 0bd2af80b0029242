//! Price data flowing into the reconciler: push events and batch quotes.

use ahash::AHashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceUpdate (push channel)
// ---------------------------------------------------------------------------

/// A `price_update` event: the latest traded price for one symbol.
///
/// Events arrive unordered with respect to snapshot loads. Each one fully
/// supersedes the previous price for its symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub symbol: String,
    /// Last traded price.
    pub ltp: Decimal,
}

impl PriceUpdate {
    pub fn new(symbol: impl Into<String>, ltp: Decimal) -> Self {
        Self { symbol: symbol.into(), ltp }
    }
}

// ---------------------------------------------------------------------------
// QuoteBatch (GET /api/quotes)
// ---------------------------------------------------------------------------

/// Response of `GET /api/quotes?symbols=A,B,C`: `{ d: [{ n, v: { lp } }] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteBatch {
    #[serde(default)]
    pub d: Vec<QuoteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteEntry {
    /// Symbol.
    pub n: String,
    pub v: QuoteValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteValues {
    /// Last price. Missing for symbols the upstream feed could not resolve.
    #[serde(default)]
    pub lp: Option<Decimal>,
}

impl QuoteBatch {
    /// Collapse the batch into `symbol → last price`, skipping entries
    /// without a price. Later duplicates win.
    pub fn into_prices(self) -> AHashMap<String, Decimal> {
        self.d
            .into_iter()
            .filter_map(|q| q.v.lp.map(|lp| (q.n, lp)))
            .collect()
    }
}
