//! Configuration parsing for the dashboard client.
//!
//! All components read their settings from a single JSON config file. Every
//! field has a default, so an empty object `{}` is a valid config that points
//! at a backend on `127.0.0.1:5000`.
//!
//! # Example config
//!
//! ```json
//! {
//!   "meta": { "module_name": "paperdash", "log_path": "/tmp/log" },
//!   "backend": { "base_url": "http://127.0.0.1:5000", "timeout_ms": 10000 },
//!   "push": {
//!     "url": "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket",
//!     "protocol": "socketio"
//!   },
//!   "dashboard": { "pricing": "streaming", "refresh_interval_sec": 30 }
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DashError;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(default)]
    pub meta: ModuleMeta,

    /// REST backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Server-push channel settings.
    #[serde(default)]
    pub push: PushConfig,

    /// Snapshot / refresh behaviour.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Reject values that would make the client misbehave at runtime.
    pub fn validate(&self) -> Result<(), DashError> {
        check_url(&self.backend.base_url, &["http", "https"], "backend.base_url")?;
        check_url(&self.push.url, &["ws", "wss"], "push.url")?;

        if self.backend.timeout_ms == 0 {
            return Err(DashError::Config("backend.timeout_ms must be > 0".into()));
        }
        if self.dashboard.refresh_interval_sec == 0 {
            return Err(DashError::Config("dashboard.refresh_interval_sec must be > 0".into()));
        }
        if self.dashboard.render_interval_ms == 0 {
            return Err(DashError::Config("dashboard.render_interval_ms must be > 0".into()));
        }
        if self.push.ping_interval_sec == Some(0) {
            return Err(DashError::Config("push.ping_interval_sec must be > 0 when set".into()));
        }
        Ok(())
    }
}

fn check_url(raw: &str, schemes: &[&str], field: &str) -> Result<(), DashError> {
    let parsed = url::Url::parse(raw).map_err(|e| DashError::Config(format!("{field}: {e}")))?;
    if !schemes.contains(&parsed.scheme()) {
        return Err(DashError::Config(format!(
            "{field}: scheme '{}' not one of {schemes:?}",
            parsed.scheme()
        )));
    }
    Ok(())
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    #[serde(default = "default_module_name")]
    pub module_name: String,
    pub log_path: Option<String>,
}

impl Default for ModuleMeta {
    fn default() -> Self {
        Self { module_name: default_module_name(), log_path: None }
    }
}

/// REST backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL every `/api/...` path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_ms: default_timeout_ms() }
    }
}

/// Framing used on the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushProtocol {
    /// Socket.IO over Engine.IO v4 (`42["price_update", {...}]`).
    #[default]
    SocketIo,
    /// Plain JSON text frames.
    Json,
}

/// Server-push channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Full WebSocket URL.
    #[serde(default = "default_push_url")]
    pub url: String,

    #[serde(default)]
    pub protocol: PushProtocol,

    /// Client-initiated keep-alive ping interval in seconds. Socket.IO servers
    /// ping the client themselves, so this is normally left unset.
    pub ping_interval_sec: Option<u64>,

    /// Extra HTTP headers for the WebSocket handshake.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: default_push_url(),
            protocol: PushProtocol::default(),
            ping_interval_sec: None,
            extra_headers: HashMap::new(),
        }
    }
}

/// How the snapshot loader obtains current prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Rows start pending; prices arrive only through the push channel.
    #[default]
    Streaming,
    /// A batch quote request is issued during each load and metrics are
    /// computed immediately.
    QuoteSnapshot,
}

impl PricingMode {
    /// Whether prices should be taken from the push channel. Quote-snapshot
    /// mode prices rows only at load time.
    pub fn uses_push(self) -> bool {
        matches!(self, Self::Streaming)
    }
}

/// Dashboard behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub pricing: PricingMode,

    /// Blanket resync interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_sec: u64,

    /// Minimum spacing between re-renders of a changed view.
    #[serde(default = "default_render_interval")]
    pub render_interval_ms: u64,
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_sec)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            pricing: PricingMode::default(),
            refresh_interval_sec: default_refresh_interval(),
            render_interval_ms: default_render_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults (used by serde)
// ---------------------------------------------------------------------------

fn default_module_name() -> String {
    "paperdash".into()
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_push_url() -> String {
    "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket".into()
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_render_interval() -> u64 {
    1000
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
