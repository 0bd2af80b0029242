//! View row model: a portfolio position plus its price-derived metrics.
//!
//! Derived metrics are either [`RowMetrics::Pending`] (no price seen since the
//! last snapshot) or fully computed. There is no zero-valued stand-in for an
//! unknown price, and a zero cost basis yields [`PnlPercent::NotApplicable`]
//! instead of a division error.

use rust_decimal::{Decimal, RoundingStrategy};

use super::portfolio::PortfolioPosition;

/// Placeholder text for metrics that have not been priced yet.
pub const PENDING_TEXT: &str = "pending";

/// Sentinel text for a P&L percentage over a zero cost basis.
pub const NOT_APPLICABLE_TEXT: &str = "N/A";

/// P&L as a percentage of cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlPercent {
    Value(Decimal),
    /// `avg_price × quantity == 0`.
    NotApplicable,
}

impl std::fmt::Display for PnlPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(p) => write!(f, "{}%", format_money(*p)),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE_TEXT),
        }
    }
}

/// Price-derived fields of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMetrics {
    #[default]
    Pending,
    Priced {
        current_price: Decimal,
        pnl: Decimal,
        pnl_percent: PnlPercent,
    },
}

impl RowMetrics {
    /// Compute metrics for a holding at `current_price`.
    ///
    /// `pnl = (current_price − avg_price) × quantity`,
    /// `pnl_percent = pnl / (avg_price × quantity) × 100`.
    ///
    /// Returns `None` when the arithmetic overflows `Decimal`.
    pub fn compute(avg_price: Decimal, quantity: i64, current_price: Decimal) -> Option<Self> {
        let qty = Decimal::from(quantity);
        let pnl = current_price.checked_sub(avg_price)?.checked_mul(qty)?;
        let basis = avg_price.checked_mul(qty)?;
        let pnl_percent = match pnl.checked_div(basis).and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED)) {
            Some(pct) if !basis.is_zero() => PnlPercent::Value(pct),
            _ => PnlPercent::NotApplicable,
        };
        Some(Self::Priced { current_price, pnl, pnl_percent })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn current_price(&self) -> Option<Decimal> {
        match self {
            Self::Pending => None,
            Self::Priced { current_price, .. } => Some(*current_price),
        }
    }

    pub fn pnl(&self) -> Option<Decimal> {
        match self {
            Self::Pending => None,
            Self::Priced { pnl, .. } => Some(*pnl),
        }
    }

    pub fn pnl_percent(&self) -> Option<PnlPercent> {
        match self {
            Self::Pending => None,
            Self::Priced { pnl_percent, .. } => Some(*pnl_percent),
        }
    }
}

/// One portfolio row as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub position: PortfolioPosition,
    pub metrics: RowMetrics,
}

impl DisplayRow {
    /// A freshly loaded row with metrics pending.
    pub fn pending(position: PortfolioPosition) -> Self {
        Self { position, metrics: RowMetrics::Pending }
    }

    pub fn symbol(&self) -> &str {
        &self.position.symbol
    }

    /// Recompute metrics at a new price, replacing whatever was there before.
    /// On overflow the row is left untouched and `false` is returned.
    pub fn reprice(&mut self, current_price: Decimal) -> bool {
        match RowMetrics::compute(self.position.avg_price, self.position.quantity, current_price) {
            Some(metrics) => {
                self.metrics = metrics;
                true
            }
            None => false,
        }
    }

    /// Current price formatted for display, or the pending placeholder.
    pub fn current_price_text(&self) -> String {
        self.metrics.current_price().map(format_money).unwrap_or_else(|| PENDING_TEXT.into())
    }

    pub fn pnl_text(&self) -> String {
        self.metrics.pnl().map(format_money).unwrap_or_else(|| PENDING_TEXT.into())
    }

    pub fn pnl_percent_text(&self) -> String {
        self.metrics.pnl_percent().map(|p| p.to_string()).unwrap_or_else(|| PENDING_TEXT.into())
    }
}

/// Round half away from zero to 2 dp and always print two decimals.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn ten_percent_gain() {
        let m = RowMetrics::compute(dec("100"), 10, dec("110")).unwrap();
        assert_eq!(m.pnl(), Some(dec("100")));
        assert_eq!(m.pnl_percent(), Some(PnlPercent::Value(dec("10"))));
        assert_eq!(m.pnl_percent().unwrap().to_string(), "10.00%");
    }

    #[test]
    fn zero_quantity_is_not_applicable() {
        let m = RowMetrics::compute(dec("100"), 0, dec("110")).unwrap();
        assert_eq!(m.pnl(), Some(Decimal::ZERO));
        assert_eq!(m.pnl_percent(), Some(PnlPercent::NotApplicable));
        assert_eq!(m.pnl_percent().unwrap().to_string(), "N/A");
    }

    #[test]
    fn zero_avg_price_is_not_applicable() {
        let m = RowMetrics::compute(Decimal::ZERO, 5, dec("3")).unwrap();
        assert_eq!(m.pnl(), Some(dec("15")));
        assert_eq!(m.pnl_percent(), Some(PnlPercent::NotApplicable));
    }

    #[test]
    fn pending_row_text() {
        let row = DisplayRow::pending(PortfolioPosition::new("ABC", 1, dec("1")));
        assert_eq!(row.current_price_text(), PENDING_TEXT);
        assert_eq!(row.pnl_text(), PENDING_TEXT);
        assert_eq!(row.pnl_percent_text(), PENDING_TEXT);
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(format_money(dec("1.005")), "1.01");
        assert_eq!(format_money(dec("-1.005")), "-1.01");
        assert_eq!(format_money(dec("7")), "7.00");
    }

    #[test]
    fn loss_rounds_to_two_places() {
        let mut row = DisplayRow::pending(PortfolioPosition::new("XYZ", 3, dec("33.333")));
        row.reprice(dec("30"));
        assert_eq!(row.pnl_text(), "-10.00");
        assert_eq!(row.pnl_percent_text(), "-10.00%");
    }

    #[test]
    fn overflowing_price_leaves_row_untouched() {
        let huge = dec("70000000000000000000000000000");
        assert_eq!(RowMetrics::compute(dec("100"), 10, huge), None);

        let mut row = DisplayRow::pending(PortfolioPosition::new("ABC", 10, dec("100")));
        assert!(row.reprice(dec("110")));
        assert!(!row.reprice(huge));
        assert_eq!(row.metrics.current_price(), Some(dec("110")));
    }
}
