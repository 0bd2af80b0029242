//! # pd-runner
//!
//! Console front end for the paper-trading dashboard.
//!
//! Loads a JSON configuration file (or runs with defaults), connects the
//! price push channel, and drives the dashboard engine from stdin until
//! `quit`, end of input, or Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! pd-runner config.json --log-level info
//! ```

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pd_core::config::AppConfig;
use pd_dash::{Command, DashboardEngine, prompt_channel};
use pd_feed::{FeedModule, PriceFeed};
use pd_rest::{DashboardApi, HttpApi};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Paper-trading dashboard client.
#[derive(Parser)]
#[command(name = "pd-runner", about = "Paper-trading dashboard client")]
struct Cli {
    /// Configuration file path (JSON). Defaults apply when omitted.
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output. Overrides `meta.log_path`.
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = match &cli.config {
        Some(path) => pd_core::config::load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            let config = AppConfig::default();
            config.validate()?;
            config
        }
    };

    // 2. Initialize logging
    let log_dir = cli.log_dir.as_deref().or(config.meta.log_path.as_deref());
    pd_core::logging::init_logging(&cli.log_level, log_dir, &config.meta.module_name);
    info!(
        "pd-runner starting, backend={} push={} pricing={:?}",
        config.backend.base_url, config.push.url, config.dashboard.pricing
    );

    // 3. Wire API, feed and engine
    let api: Arc<dyn DashboardApi> = Arc::new(HttpApi::new(&config.backend)?);
    let (mut feed, feed_rx) = PriceFeed::new(config.push.clone());
    let (prompter, prompts) = prompt_channel(4);
    let (engine, notices) = DashboardEngine::new(api, prompter, config.dashboard.clone());
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(64);

    if config.dashboard.pricing.uses_push() {
        feed.start().await?;
        info!("module '{}' started", feed.name());
    } else {
        info!("quote-snapshot pricing, push channel not started");
    }

    let mut engine_task = tokio::spawn(engine.run(feed_rx, cmd_rx));
    let console_task = tokio::spawn(console::run(cmd_tx.clone(), notices, prompts, console::spawn_stdin_reader()));
    println!("{}", pd_dash::command::HELP_TEXT);

    // 4. Run until the engine stops or Ctrl+C
    tokio::select! {
        res = &mut engine_task => report(res),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            let _ = cmd_tx.send(Command::Quit).await;
            report(engine_task.await);
        }
    }
    console_task.abort();

    // 5. Stop the feed
    if let Err(e) = feed.stop().await {
        error!("error stopping '{}': {e}", feed.name());
    }
    info!("pd-runner stopped");
    Ok(())
}

fn report(res: Result<Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("engine failed: {e:#}"),
        Err(e) => error!("engine task panicked: {e}"),
    }
}
