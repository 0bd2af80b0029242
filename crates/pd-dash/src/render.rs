//! Pure text projection of dashboard state.
//!
//! Every function here is a function of its arguments only; the event loop
//! decides when to call them.

use std::fmt::Write;

use pd_core::store::PortfolioStore;
use pd_core::types::*;

use crate::command::View;
use crate::state::DashboardState;

/// Render one view from the current state.
pub fn render_view(view: View, state: &DashboardState) -> String {
    match view {
        View::Portfolio => portfolio_table(&state.portfolio),
        View::Orders => pending_orders_table(&state.pending_orders),
        View::Trades => trade_history_table(&state.trades),
        View::Account => account_header(state.profile.as_ref(), state.account.as_ref()),
    }
}

pub fn portfolio_table(store: &PortfolioStore) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>8} {:>12} {:>14} {:>12} {:>12} {:>9}  {}",
        "SYMBOL", "QTY", "AVG PRICE", "POSITION SIZE", "LTP", "P&L", "P&L %", "NOTES"
    );
    if store.is_empty() {
        out.push_str("(no holdings)\n");
        return out;
    }
    for row in store.rows() {
        let p = &row.position;
        let _ = writeln!(
            out,
            "{:<16} {:>8} {:>12} {:>14} {:>12} {:>12} {:>9}  {}",
            p.symbol,
            p.quantity,
            format_money(p.avg_price),
            format_money(p.position_size()),
            row.current_price_text(),
            row.pnl_text(),
            row.pnl_percent_text(),
            p.notes
        );
    }
    out
}

pub fn pending_orders_table(orders: &[PendingOrder]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<32} {:<16} {:>8} {:>12} {:<7} {}",
        "ORDER ID", "SYMBOL", "QTY", "PRICE", "TYPE", "STATUS"
    );
    if orders.is_empty() {
        out.push_str("(no pending orders)\n");
        return out;
    }
    for o in orders {
        let _ = writeln!(
            out,
            "{:<32} {:<16} {:>8} {:>12} {:<7} {}",
            o.order_id,
            o.symbol,
            o.quantity,
            format_money(o.price),
            o.order_type.to_string(),
            o.status
        );
    }
    out
}

pub fn trade_history_table(trades: &[TradeRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:<16} {:>8} {:>12} {:>12} {:>12}",
        "ID", "SYMBOL", "QTY", "BUY", "SELL", "P&L"
    );
    if trades.is_empty() {
        out.push_str("(no trades)\n");
        return out;
    }
    for t in trades {
        let _ = writeln!(
            out,
            "{:>6} {:<16} {:>8} {:>12} {:>12} {:>12}",
            t.trade_id,
            t.symbol,
            t.quantity,
            format_money(t.buy_price),
            format_money(t.sell_price),
            format_money(t.pnl)
        );
    }
    out
}

pub fn account_header(profile: Option<&Profile>, account: Option<&Account>) -> String {
    let who = profile.map_or_else(|| "-".to_string(), |p| format!("{} ({})", p.username, p.account_id));
    let balance = account.map_or_else(|| "-".to_string(), |a| format_money(a.balance));
    format!("account: {who}  balance: {balance}\n")
}
