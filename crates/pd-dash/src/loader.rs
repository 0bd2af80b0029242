//! Snapshot loader: fetches one server collection in full.
//!
//! A load never touches dashboard state directly. It returns a [`Snapshot`]
//! that the event loop applies through
//! [`DashboardState::apply`](crate::state::DashboardState::apply) once the
//! stale-response guard has accepted its ticket.

use ahash::AHashMap;
use anyhow::{Context, Result};
use pd_core::config::PricingMode;
use pd_core::sequence::Collection;
use pd_core::types::*;
use pd_rest::DashboardApi;
use rust_decimal::Decimal;
use tracing::debug;

/// Result of one completed load.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Positions in server order, plus prices when loaded in
    /// [`PricingMode::QuoteSnapshot`].
    Portfolio {
        positions: Vec<PortfolioPosition>,
        prices: Option<AHashMap<String, Decimal>>,
    },
    PendingOrders(Vec<PendingOrder>),
    TradeHistory(Vec<TradeRecord>),
    Account(Account),
    Profile(Profile),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Portfolio { .. } => Collection::Portfolio,
            Self::PendingOrders(_) => Collection::PendingOrders,
            Self::TradeHistory(_) => Collection::TradeHistory,
            Self::Account(_) => Collection::Account,
            Self::Profile(_) => Collection::Profile,
        }
    }
}

/// Fetch `collection` from the backend.
///
/// In quote-snapshot mode a portfolio load also requests quotes for every
/// held symbol; a failed quote request fails the whole load. An empty
/// portfolio skips the quote request.
pub async fn fetch_snapshot(api: &dyn DashboardApi, collection: Collection, pricing: PricingMode) -> Result<Snapshot> {
    let snapshot = match collection {
        Collection::Portfolio => {
            let positions = api.fetch_portfolio().await.context("loading portfolio")?;
            let prices = match pricing {
                PricingMode::Streaming => None,
                PricingMode::QuoteSnapshot if positions.is_empty() => Some(AHashMap::new()),
                PricingMode::QuoteSnapshot => {
                    let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
                    let batch = api.fetch_quotes(&symbols).await.context("loading quotes")?;
                    Some(batch.into_prices())
                }
            };
            debug!("[loader] portfolio: {} positions", positions.len());
            Snapshot::Portfolio { positions, prices }
        }
        Collection::PendingOrders => {
            Snapshot::PendingOrders(api.fetch_pending_orders().await.context("loading pending orders")?)
        }
        Collection::TradeHistory => {
            Snapshot::TradeHistory(api.fetch_trade_history().await.context("loading trade history")?)
        }
        Collection::Account => Snapshot::Account(api.fetch_account().await.context("loading account")?),
        Collection::Profile => Snapshot::Profile(api.fetch_profile().await.context("loading profile")?),
    };
    Ok(snapshot)
}
