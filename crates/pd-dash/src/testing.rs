//! In-memory `DashboardApi` used by the unit tests of this crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashMap;
use anyhow::Result;
use async_trait::async_trait;
use pd_core::error::DashError;
use pd_core::types::*;
use pd_rest::DashboardApi;
use rust_decimal::Decimal;

#[derive(Default)]
pub struct FakeApi {
    portfolio: Mutex<Vec<PortfolioPosition>>,
    quotes: Mutex<AHashMap<String, Decimal>>,
    read_failure: Mutex<Option<String>>,
    order_rejection: Mutex<Option<String>>,
    pub orders: Mutex<Vec<Order>>,
    pub notes: Mutex<Vec<NotesUpdate>>,
    portfolio_fetches: AtomicUsize,
    account_fetches: AtomicUsize,
    quote_fetches: AtomicUsize,
    pending_fetches: AtomicUsize,
    trade_fetches: AtomicUsize,
}

impl FakeApi {
    pub fn with_portfolio(positions: Vec<PortfolioPosition>) -> Self {
        let api = Self::default();
        *api.portfolio.lock().unwrap() = positions;
        api
    }

    pub fn set_portfolio(&self, positions: Vec<PortfolioPosition>) {
        *self.portfolio.lock().unwrap() = positions;
    }

    pub fn set_quote(&self, symbol: &str, price: Decimal) {
        self.quotes.lock().unwrap().insert(symbol.to_string(), price);
    }

    /// Make every GET fail with a transport error.
    pub fn fail_reads(&self, message: &str) {
        *self.read_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Make every order fail with a 400 rejection.
    pub fn reject_orders(&self, message: &str) {
        *self.order_rejection.lock().unwrap() = Some(message.to_string());
    }

    pub fn quote_requests(&self) -> usize {
        self.quote_fetches.load(Ordering::SeqCst)
    }

    pub fn portfolio_requests(&self) -> usize {
        self.portfolio_fetches.load(Ordering::SeqCst)
    }

    pub fn account_requests(&self) -> usize {
        self.account_fetches.load(Ordering::SeqCst)
    }

    pub fn pending_order_requests(&self) -> usize {
        self.pending_fetches.load(Ordering::SeqCst)
    }

    pub fn trade_requests(&self) -> usize {
        self.trade_fetches.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<()> {
        match self.read_failure.lock().unwrap().as_ref() {
            Some(msg) => Err(DashError::Transport(msg.clone()).into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn fetch_portfolio(&self) -> Result<Vec<PortfolioPosition>> {
        self.portfolio_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(self.portfolio.lock().unwrap().clone())
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch> {
        self.quote_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        let quotes = self.quotes.lock().unwrap();
        let d = symbols
            .iter()
            .filter_map(|s| {
                quotes.get(s).map(|lp| QuoteEntry { n: s.clone(), v: QuoteValues { lp: Some(*lp) } })
            })
            .collect();
        Ok(QuoteBatch { d })
    }

    async fn fetch_account(&self) -> Result<Account> {
        self.account_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(Account { balance: Decimal::from(300_000) })
    }

    async fn fetch_profile(&self) -> Result<Profile> {
        self.check_read()?;
        Ok(Profile { username: "trader".into(), account_id: "VR00001".into() })
    }

    async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>> {
        self.pending_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(Vec::new())
    }

    async fn fetch_trade_history(&self) -> Result<Vec<TradeRecord>> {
        self.trade_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(Vec::new())
    }

    async fn place_order(&self, order: &Order) -> Result<Ack> {
        if let Some(message) = self.order_rejection.lock().unwrap().clone() {
            return Err(DashError::Rejected { status: 400, message }.into());
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(Ack { message: "Order placed successfully".into(), order_id: None })
    }

    async fn update_notes(&self, update: &NotesUpdate) -> Result<Ack> {
        self.notes.lock().unwrap().push(update.clone());
        Ok(Ack { message: "Notes updated successfully".into(), order_id: None })
    }
}
