//! Everything the dashboard shows, owned by the event loop.

use pd_core::sequence::{Collection, SnapshotSequencer, Ticket};
use pd_core::store::{PortfolioStore, ReconcileOutcome};
use pd_core::types::*;
use tracing::debug;

use crate::loader::Snapshot;

#[derive(Debug, Default)]
pub struct DashboardState {
    pub portfolio: PortfolioStore,
    pub account: Option<Account>,
    pub profile: Option<Profile>,
    pub pending_orders: Vec<PendingOrder>,
    pub trades: Vec<TradeRecord>,
    sequencer: SnapshotSequencer,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket for a load about to start.
    pub fn issue(&mut self, collection: Collection) -> Ticket {
        self.sequencer.issue(collection)
    }

    /// Apply a completed load. Returns `false` (and changes nothing) when a
    /// newer load for the same collection has been issued since.
    pub fn apply(&mut self, ticket: Ticket, snapshot: Snapshot) -> bool {
        if ticket.collection != snapshot.collection() || !self.sequencer.check_and_update(ticket) {
            debug!("[state] discarding stale {} snapshot #{}", ticket.collection, ticket.seq);
            return false;
        }
        match snapshot {
            Snapshot::Portfolio { positions, prices } => self.portfolio.replace_snapshot(positions, prices.as_ref()),
            Snapshot::PendingOrders(orders) => self.pending_orders = orders,
            Snapshot::TradeHistory(trades) => self.trades = trades,
            Snapshot::Account(account) => self.account = Some(account),
            Snapshot::Profile(profile) => self.profile = Some(profile),
        }
        true
    }

    /// Feed one push-channel price event to the portfolio.
    pub fn on_price(&mut self, update: &PriceUpdate) -> ReconcileOutcome {
        self.portfolio.apply_price(update)
    }
}
