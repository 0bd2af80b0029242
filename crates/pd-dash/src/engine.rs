//! Dashboard event loop.
//!
//! [`DashboardEngine::run`] is the single owner of [`DashboardState`]. It
//! multiplexes push-channel events, user commands, completed HTTP work, the
//! periodic refresh timer and the render timer in one `select!` loop, so no two
//! handlers ever interleave and no lock guards the store.
//!
//! HTTP work (snapshot loads and actions) runs in spawned tasks that report
//! back over an internal channel. A snapshot only lands if the stale-response
//! guard still accepts its ticket.
//!
//! Output goes out as [`Notice`]s; views are re-rendered at most once per
//! render tick, and only when something they show has changed.

use std::sync::Arc;

use ahash::AHashSet;
use anyhow::Result;
use pd_core::config::DashboardConfig;
use pd_core::error::DashError;
use pd_core::sequence::{Collection, Ticket};
use pd_core::store::ReconcileOutcome;
use pd_core::types::*;
use pd_feed::{FeedEvent, FeedEventReceiver};
use pd_rest::DashboardApi;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::command::{Command, HELP_TEXT, View};
use crate::dispatcher::ActionDispatcher;
use crate::input::Prompter;
use crate::loader::{Snapshot, fetch_snapshot};
use crate::render::render_view;
use crate::state::DashboardState;

/// Loaded once at startup.
const STARTUP_LOADS: [Collection; 5] = [
    Collection::Profile,
    Collection::Account,
    Collection::Portfolio,
    Collection::PendingOrders,
    Collection::TradeHistory,
];

/// Reloaded by the periodic timer.
const TIMED_LOADS: [Collection; 3] = [Collection::Portfolio, Collection::PendingOrders, Collection::TradeHistory];

/// Reloaded by the `refresh` command.
const MANUAL_LOADS: [Collection; 4] = [
    Collection::Portfolio,
    Collection::PendingOrders,
    Collection::TradeHistory,
    Collection::Account,
];

/// Reloaded after a successful order or notes edit.
const POST_ACTION_LOADS: [Collection; 3] = [Collection::Portfolio, Collection::Account, Collection::PendingOrders];

/// Something for the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Success message or status line.
    Info(String),
    /// Business rejection from the backend, message verbatim.
    Rejected(String),
    /// Transport, decode or input failure.
    Error(String),
    /// A freshly rendered view.
    View(View, String),
}

pub type NoticeSender = mpsc::UnboundedSender<Notice>;
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Result of work spawned off the loop.
enum Completion {
    Snapshot { ticket: Ticket, result: Result<Snapshot> },
    Action { what: String, result: Result<Option<Ack>> },
}

pub struct DashboardEngine {
    api: Arc<dyn DashboardApi>,
    dispatcher: ActionDispatcher,
    config: DashboardConfig,
    state: DashboardState,
    /// View re-rendered on each tick when dirty.
    active: View,
    dirty: AHashSet<View>,
    notice_tx: NoticeSender,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl DashboardEngine {
    pub fn new(api: Arc<dyn DashboardApi>, prompter: Prompter, config: DashboardConfig) -> (Self, NoticeReceiver) {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let engine = Self {
            dispatcher: ActionDispatcher::new(api.clone(), prompter),
            api,
            config,
            state: DashboardState::new(),
            active: View::Portfolio,
            dirty: AHashSet::new(),
            notice_tx,
            completion_tx,
            completion_rx,
        };
        (engine, notice_rx)
    }

    /// Run until `Command::Quit` or until the command channel closes.
    pub async fn run(mut self, mut feed: FeedEventReceiver, mut commands: mpsc::Receiver<Command>) -> Result<()> {
        info!(
            "[engine] starting (pricing={:?}, refresh every {:?})",
            self.config.pricing,
            self.config.refresh_interval()
        );
        for collection in STARTUP_LOADS {
            self.spawn_load(collection);
        }

        let period = self.config.refresh_interval();
        let mut refresh = tokio::time::interval_at(Instant::now() + period, period);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut render = tokio::time::interval(self.config.render_interval());
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = feed.recv() => self.on_feed_event(event),

                cmd = commands.recv() => match cmd {
                    Some(Command::Quit) | None => break,
                    Some(cmd) => self.on_command(cmd),
                },

                Some(done) = self.completion_rx.recv() => self.on_completion(done),

                _ = refresh.tick() => {
                    debug!("[engine] periodic refresh");
                    for collection in TIMED_LOADS {
                        self.spawn_load(collection);
                    }
                }

                _ = render.tick() => self.flush_views(),
            }
        }

        info!("[engine] stopped");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn on_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Price(update) => {
                if self.state.on_price(&update) == ReconcileOutcome::Updated {
                    self.dirty.insert(View::Portfolio);
                }
            }
            FeedEvent::Connected => self.notify(Notice::Info("price feed connected".into())),
            FeedEvent::Disconnected { reason } => {
                warn!("[engine] price feed down: {reason}");
                self.notify(Notice::Info(format!("price feed disconnected ({reason}), reconnecting")));
            }
        }
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Order(form) => match form.into_order() {
                Ok(order) => {
                    let dispatcher = self.dispatcher.clone();
                    let what = format!("{:?} {}", order.side(), order.symbol).to_lowercase();
                    self.spawn_action(what, async move { dispatcher.submit_order(&order).await.map(Some) });
                }
                Err(e) => self.notify(Notice::Error(e.to_string())),
            },
            Command::EditNotes { symbol } => {
                let Some(row) = self.state.portfolio.get(&symbol) else {
                    self.notify(Notice::Error(format!("no holding for {symbol}")));
                    return;
                };
                let current = row.position.notes.clone();
                let dispatcher = self.dispatcher.clone();
                let what = format!("notes {symbol}");
                self.spawn_action(what, async move { dispatcher.edit_notes(&symbol, &current).await });
            }
            Command::Refresh => {
                for collection in MANUAL_LOADS {
                    self.spawn_load(collection);
                }
            }
            Command::Show(view) => {
                self.active = view;
                self.dirty.remove(&view);
                self.notify(Notice::View(view, render_view(view, &self.state)));
            }
            Command::Help => self.notify(Notice::Info(HELP_TEXT.into())),
            Command::Quit => {}
        }
    }

    fn on_completion(&mut self, done: Completion) {
        match done {
            Completion::Snapshot { ticket, result: Ok(snapshot) } => {
                if self.state.apply(ticket, snapshot) {
                    self.dirty.insert(view_of(ticket.collection));
                }
            }
            Completion::Snapshot { ticket, result: Err(e) } => {
                warn!("[engine] {} load #{} failed: {e:#}", ticket.collection, ticket.seq);
                self.notify(Notice::Error(format!("{e:#}")));
            }
            Completion::Action { what, result: Ok(Some(ack)) } => {
                self.notify(Notice::Info(ack.message));
                debug!("[engine] {what} done, reloading");
                for collection in POST_ACTION_LOADS {
                    self.spawn_load(collection);
                }
            }
            Completion::Action { what, result: Ok(None) } => debug!("[engine] {what} cancelled"),
            Completion::Action { what, result: Err(e) } => {
                let notice = match e.downcast_ref::<DashError>().and_then(DashError::rejection_message) {
                    Some(message) => Notice::Rejected(message.to_string()),
                    None => Notice::Error(format!("{what}: {e:#}")),
                };
                warn!("[engine] {what} failed: {e:#}");
                self.notify(notice);
            }
        }
    }

    fn flush_views(&mut self) {
        if self.dirty.remove(&self.active) {
            let text = render_view(self.active, &self.state);
            self.notify(Notice::View(self.active, text));
        }
    }

    // -----------------------------------------------------------------------
    // Spawned work
    // -----------------------------------------------------------------------

    fn spawn_load(&mut self, collection: Collection) {
        let ticket = self.state.issue(collection);
        let api = self.api.clone();
        let pricing = self.config.pricing;
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = fetch_snapshot(api.as_ref(), collection, pricing).await;
            let _ = tx.send(Completion::Snapshot { ticket, result });
        });
    }

    fn spawn_action<F>(&self, what: String, work: F)
    where
        F: Future<Output = Result<Option<Ack>>> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = work.await;
            let _ = tx.send(Completion::Action { what, result });
        });
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notice_tx.send(notice);
    }
}

fn view_of(collection: Collection) -> View {
    match collection {
        Collection::Portfolio => View::Portfolio,
        Collection::PendingOrders => View::Orders,
        Collection::TradeHistory => View::Trades,
        Collection::Account | Collection::Profile => View::Account,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::command::parse_command;
    use crate::input::{InputReceiver, prompt_channel};
    use crate::testing::FakeApi;
    use pd_core::config::PricingMode;
    use pd_feed::FeedEventSender;
    use rust_decimal::Decimal;
    use tokio::task::JoinHandle;

    const WAIT: Duration = Duration::from_secs(5);

    struct Harness {
        api: Arc<FakeApi>,
        feed: FeedEventSender,
        commands: mpsc::Sender<Command>,
        notices: NoticeReceiver,
        prompts: InputReceiver,
        task: JoinHandle<Result<()>>,
    }

    impl Harness {
        fn start(api: FakeApi) -> Self {
            Self::with_config(api, test_config(PricingMode::Streaming, 3600))
        }

        fn with_config(api: FakeApi, config: DashboardConfig) -> Self {
            let api = Arc::new(api);
            let (prompter, prompts) = prompt_channel(4);
            let (engine, notices) = DashboardEngine::new(api.clone(), prompter, config);
            let (feed, feed_rx) = mpsc::unbounded_channel();
            let (commands, cmd_rx) = mpsc::channel(16);
            let task = tokio::spawn(engine.run(feed_rx, cmd_rx));
            Self { api, feed, commands, notices, prompts, task }
        }

        async fn send(&self, line: &str) {
            let cmd = parse_command(line).unwrap().unwrap();
            self.commands.send(cmd).await.unwrap();
        }

        async fn next_where(&mut self, pred: impl Fn(&Notice) -> bool) -> Notice {
            tokio::time::timeout(WAIT, async {
                loop {
                    let notice = self.notices.recv().await.expect("engine stopped");
                    if pred(&notice) {
                        return notice;
                    }
                }
            })
            .await
            .expect("timed out waiting for notice")
        }

        async fn portfolio_view_containing(&mut self, text: &str) -> String {
            match self.next_where(|n| matches!(n, Notice::View(View::Portfolio, t) if t.contains(text))).await {
                Notice::View(_, t) => t,
                _ => unreachable!(),
            }
        }
    }

    fn test_config(pricing: PricingMode, refresh_interval_sec: u64) -> DashboardConfig {
        DashboardConfig { pricing, refresh_interval_sec, render_interval_ms: 10 }
    }

    fn abc_api() -> FakeApi {
        let mut pos = PortfolioPosition::new("ABC", 10, Decimal::from(100));
        pos.notes = "old notes".into();
        FakeApi::with_portfolio(vec![pos])
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn price_event_updates_rendered_row() {
        let mut h = Harness::start(abc_api());
        let initial = h.portfolio_view_containing("ABC").await;
        assert!(initial.contains("pending"));

        h.feed.send(FeedEvent::Price(PriceUpdate::new("XYZ", Decimal::from(50)))).unwrap();
        h.feed.send(FeedEvent::Price(PriceUpdate::new("ABC", Decimal::from(110)))).unwrap();
        let view = h.portfolio_view_containing("10.00%").await;
        let row = view.lines().find(|l| l.starts_with("ABC")).unwrap();
        assert!(row.contains("110.00") && row.contains("100.00"));
        assert!(!view.contains("XYZ"));
    }

    #[tokio::test]
    async fn rejected_sell_reports_message_and_skips_refresh() {
        let api = abc_api();
        api.reject_orders("insufficient quantity");
        let mut h = Harness::start(api);
        h.portfolio_view_containing("ABC").await;
        let loads_before = h.api.portfolio_requests();

        h.send("sell ABC 500").await;
        let notice = h.next_where(|n| matches!(n, Notice::Rejected(_) | Notice::Error(_))).await;
        assert_eq!(notice, Notice::Rejected("insufficient quantity".into()));

        settle().await;
        assert_eq!(h.api.portfolio_requests(), loads_before);
    }

    #[tokio::test]
    async fn accepted_order_reloads_portfolio_and_account() {
        let mut h = Harness::start(abc_api());
        h.portfolio_view_containing("ABC").await;
        settle().await;
        let (portfolio_before, account_before) = (h.api.portfolio_requests(), h.api.account_requests());

        h.api.set_portfolio(vec![
            PortfolioPosition::new("ABC", 10, Decimal::from(100)),
            PortfolioPosition::new("DEF", 3, Decimal::from(20)),
        ]);
        h.send("buy DEF 3 limit 20").await;
        let notice = h.next_where(|n| matches!(n, Notice::Info(_) | Notice::Rejected(_) | Notice::Error(_))).await;
        assert_eq!(notice, Notice::Info("Order placed successfully".into()));

        h.portfolio_view_containing("DEF").await;
        assert!(h.api.portfolio_requests() > portfolio_before);
        settle().await;
        assert!(h.api.account_requests() > account_before);
        assert_eq!(h.api.orders.lock().unwrap()[0].quantity, 3);
    }

    #[tokio::test]
    async fn cancelled_notes_prompt_sends_no_request() {
        let mut h = Harness::start(abc_api());
        h.portfolio_view_containing("ABC").await;
        let loads_before = h.api.portfolio_requests();

        h.send("notes ABC").await;
        let request = tokio::time::timeout(WAIT, h.prompts.recv()).await.unwrap().unwrap();
        assert_eq!(request.initial, "old notes");
        request.cancel();

        settle().await;
        assert!(h.api.notes.lock().unwrap().is_empty());
        assert_eq!(h.api.portfolio_requests(), loads_before);
    }

    #[tokio::test]
    async fn invalid_order_input_never_reaches_backend() {
        let mut h = Harness::start(abc_api());
        h.send("buy ABC ten").await;
        let notice = h.next_where(|n| matches!(n, Notice::Error(_))).await;
        assert!(matches!(notice, Notice::Error(m) if m.contains("ten")));
        assert!(h.api.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_load_surfaces_error_notice() {
        let api = abc_api();
        api.fail_reads("connection refused");
        let mut h = Harness::start(api);
        let notice = h.next_where(|n| matches!(n, Notice::Error(m) if m.contains("loading portfolio"))).await;
        assert!(matches!(notice, Notice::Error(m) if m.contains("connection refused")));
    }

    #[tokio::test]
    async fn show_renders_immediately_and_quit_stops() {
        let mut h = Harness::start(abc_api());
        h.portfolio_view_containing("ABC").await;
        h.send("show account").await;
        let notice = h.next_where(|n| matches!(n, Notice::View(View::Account, _))).await;
        assert!(matches!(notice, Notice::View(_, t) if t.starts_with("account:")));

        h.send("quit").await;
        tokio::time::timeout(WAIT, h.task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn periodic_refresh_reloads_tables_but_not_account() {
        let mut h = Harness::with_config(abc_api(), test_config(PricingMode::Streaming, 1));
        h.portfolio_view_containing("ABC").await;
        settle().await;
        let api = h.api.clone();
        let (portfolio, orders, trades, account) = (
            api.portfolio_requests(),
            api.pending_order_requests(),
            api.trade_requests(),
            api.account_requests(),
        );

        tokio::time::timeout(WAIT, async {
            while api.portfolio_requests() == portfolio {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timer never fired");
        settle().await;

        assert!(api.pending_order_requests() > orders);
        assert!(api.trade_requests() > trades);
        assert_eq!(api.account_requests(), account);
    }

    #[tokio::test]
    async fn quote_snapshot_mode_prices_rows_on_load() {
        let api = abc_api();
        api.set_quote("ABC", Decimal::from(110));
        let mut h = Harness::with_config(api, test_config(PricingMode::QuoteSnapshot, 3600));

        let view = h.portfolio_view_containing("ABC").await;
        let row = view.lines().find(|l| l.starts_with("ABC")).unwrap();
        assert!(row.contains("10.00%"));
        assert!(!row.contains("pending"));
        assert_eq!(h.api.quote_requests(), 1);
    }

    #[tokio::test]
    async fn overflowing_price_does_not_stop_engine() {
        let mut h = Harness::start(abc_api());
        h.portfolio_view_containing("ABC").await;

        let huge: Decimal = "70000000000000000000000000000".parse().unwrap();
        h.feed.send(FeedEvent::Price(PriceUpdate::new("ABC", huge))).unwrap();
        h.feed.send(FeedEvent::Price(PriceUpdate::new("ABC", Decimal::from(110)))).unwrap();
        h.portfolio_view_containing("10.00%").await;
        assert!(!h.task.is_finished());
    }
}
