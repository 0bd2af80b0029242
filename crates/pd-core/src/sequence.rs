//! Stale-response guard for snapshot loads.
//!
//! Snapshot requests run concurrently with the event loop, so an older,
//! slower response can land after a newer one. Each load takes a
//! [`Ticket`] from a per-collection monotonic counter; a completed load is
//! applied only if its ticket is still the latest issued for that
//! collection. Anything older is discarded.

use ahash::AHashMap;

/// Which server collection a snapshot load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Portfolio,
    PendingOrders,
    TradeHistory,
    Account,
    Profile,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Portfolio => "portfolio",
            Self::PendingOrders => "pending_orders",
            Self::TradeHistory => "trade_history",
            Self::Account => "account",
            Self::Profile => "profile",
        })
    }
}

/// Proof that a load was issued; returned alongside its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub collection: Collection,
    pub seq: u64,
}

/// Monotonic per-collection request sequencer.
///
/// Not thread-safe. The event loop owns the only instance.
#[derive(Debug, Default)]
pub struct SnapshotSequencer {
    issued: AHashMap<Collection, u64>,
    applied: AHashMap<Collection, u64>,
}

impl SnapshotSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `collection`.
    pub fn issue(&mut self, collection: Collection) -> Ticket {
        let seq = self.issued.entry(collection).or_insert(0);
        *seq += 1;
        Ticket { collection, seq: *seq }
    }

    /// Check whether a completed load may be applied.
    ///
    /// Returns `true` only for the latest issued ticket, and only once.
    /// If `true`, the ticket is recorded as applied.
    pub fn check_and_update(&mut self, ticket: Ticket) -> bool {
        let latest = self.issued.get(&ticket.collection).copied().unwrap_or(0);
        if ticket.seq != latest {
            return false;
        }
        let applied = self.applied.entry(ticket.collection).or_insert(0);
        if ticket.seq > *applied {
            *applied = ticket.seq;
            true
        } else {
            false
        }
    }
}
