//! Keyed portfolio store and price-event reconciler.
//!
//! [`PortfolioStore`] owns the current set of [`DisplayRow`]s in server order
//! together with a `symbol → row index` map. It changes in exactly two ways:
//!
//! 1. [`replace_snapshot`](PortfolioStore::replace_snapshot) discards every row
//!    and rebuilds from a fresh snapshot (metrics reset to pending unless
//!    prices are supplied).
//! 2. [`apply_price`](PortfolioStore::apply_price) rewrites the metrics of at
//!    most one existing row. It never inserts or removes rows.
//!
//! Events for symbols not in the current snapshot are dropped.

use ahash::AHashMap;
use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::types::{DisplayRow, PortfolioPosition, PriceUpdate};

/// Result of feeding one price event to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The matching row was repriced.
    Updated,
    /// No row holds this symbol; nothing changed.
    Ignored,
    /// The price is too large to compute metrics for; the row kept its
    /// previous values.
    Overflow,
}

/// In-memory view state for the portfolio table.
#[derive(Debug, Default)]
pub struct PortfolioStore {
    rows: Vec<DisplayRow>,
    index: AHashMap<String, usize>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows with `positions`, preserving server order.
    ///
    /// With `prices = None` every row starts pending. With a price map, rows
    /// whose symbol has a price are computed immediately and the rest stay
    /// pending. A duplicate symbol in the snapshot keeps the first row.
    pub fn replace_snapshot(&mut self, positions: Vec<PortfolioPosition>, prices: Option<&AHashMap<String, Decimal>>) {
        self.rows.clear();
        self.index.clear();

        for position in positions {
            if self.index.contains_key(&position.symbol) {
                warn!("[store] duplicate symbol '{}' in snapshot, keeping first", position.symbol);
                continue;
            }
            let mut row = DisplayRow::pending(position);
            if let Some(&price) = prices.and_then(|p| p.get(row.symbol())) {
                if !row.reprice(price) {
                    warn!("[store] quote {price} for '{}' overflows, leaving pending", row.symbol());
                }
            }
            self.index.insert(row.symbol().to_string(), self.rows.len());
            self.rows.push(row);
        }
    }

    /// Reconcile one price event against the current rows.
    pub fn apply_price(&mut self, update: &PriceUpdate) -> ReconcileOutcome {
        let Some(&idx) = self.index.get(&update.symbol) else {
            trace!("[store] no row for '{}', dropping price event", update.symbol);
            return ReconcileOutcome::Ignored;
        };
        if self.rows[idx].reprice(update.ltp) {
            ReconcileOutcome::Updated
        } else {
            warn!("[store] price {} for '{}' overflows, dropping event", update.ltp, update.symbol);
            ReconcileOutcome::Overflow
        }
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn get(&self, symbol: &str) -> Option<&DisplayRow> {
        self.index.get(symbol).map(|&idx| &self.rows[idx])
    }

    /// Symbols in display order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(DisplayRow::symbol)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PnlPercent, RowMetrics};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn abc_snapshot() -> Vec<PortfolioPosition> {
        vec![PortfolioPosition::new("ABC", 10, dec("100"))]
    }

    #[test]
    fn price_event_reprices_matching_row() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);

        let outcome = store.apply_price(&PriceUpdate::new("ABC", dec("110")));
        assert_eq!(outcome, ReconcileOutcome::Updated);

        let row = store.get("ABC").unwrap();
        assert_eq!(row.pnl_text(), "100.00");
        assert_eq!(row.pnl_percent_text(), "10.00%");
    }

    #[test]
    fn unknown_symbol_is_dropped_without_creating_row() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);
        let before = store.rows().to_vec();

        let outcome = store.apply_price(&PriceUpdate::new("XYZ", dec("50")));
        assert_eq!(outcome, ReconcileOutcome::Ignored);
        assert_eq!(store.len(), 1);
        assert!(store.get("XYZ").is_none());
        assert_eq!(store.rows(), &before[..]);
    }

    #[test]
    fn latest_event_wins() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);
        for ltp in ["101", "99.5", "104.25"] {
            store.apply_price(&PriceUpdate::new("ABC", dec(ltp)));
        }
        assert_eq!(store.get("ABC").unwrap().metrics.current_price(), Some(dec("104.25")));
    }

    #[test]
    fn snapshot_resets_metrics_and_row_count() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);
        store.apply_price(&PriceUpdate::new("ABC", dec("110")));

        let next = vec![
            PortfolioPosition::new("DEF", 2, dec("50")),
            PortfolioPosition::new("ABC", 10, dec("100")),
            PortfolioPosition::new("GHI", 7, dec("12")),
        ];
        store.replace_snapshot(next, None);

        assert_eq!(store.len(), 3);
        assert!(store.rows().iter().all(|r| r.metrics.is_pending()));
        assert_eq!(store.symbols().collect::<Vec<_>>(), ["DEF", "ABC", "GHI"]);
    }

    #[test]
    fn event_for_sold_position_is_noop_after_reload() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);
        store.replace_snapshot(Vec::new(), None);
        assert_eq!(store.apply_price(&PriceUpdate::new("ABC", dec("110"))), ReconcileOutcome::Ignored);
        assert!(store.is_empty());
    }

    #[test]
    fn quote_prices_compute_immediately() {
        let mut prices = AHashMap::new();
        prices.insert("ABC".to_string(), dec("90"));
        let snapshot = vec![PortfolioPosition::new("ABC", 10, dec("100")), PortfolioPosition::new("NOQ", 1, dec("5"))];

        let mut store = PortfolioStore::new();
        store.replace_snapshot(snapshot, Some(&prices));

        assert_eq!(store.get("ABC").unwrap().pnl_text(), "-100.00");
        assert!(store.get("NOQ").unwrap().metrics.is_pending());
    }

    #[test]
    fn zero_quantity_row_reconciles_to_sentinel() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(vec![PortfolioPosition::new("ZERO", 0, dec("100"))], None);
        store.apply_price(&PriceUpdate::new("ZERO", dec("120")));
        let metrics = store.get("ZERO").unwrap().metrics;
        assert!(matches!(metrics, RowMetrics::Priced { pnl_percent: PnlPercent::NotApplicable, .. }));
        assert_eq!(store.get("ZERO").unwrap().pnl_percent_text(), "N/A");
    }

    #[test]
    fn duplicate_symbol_keeps_first() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(
            vec![PortfolioPosition::new("ABC", 1, dec("1")), PortfolioPosition::new("ABC", 2, dec("2"))],
            None,
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("ABC").unwrap().position.quantity, 1);
    }

    #[test]
    fn overflowing_price_event_is_dropped_without_panic() {
        let mut store = PortfolioStore::new();
        store.replace_snapshot(abc_snapshot(), None);
        store.apply_price(&PriceUpdate::new("ABC", dec("110")));

        let outcome = store.apply_price(&PriceUpdate::new("ABC", dec("70000000000000000000000000000")));
        assert_eq!(outcome, ReconcileOutcome::Overflow);
        assert_eq!(store.get("ABC").unwrap().pnl_text(), "100.00");
    }
}
