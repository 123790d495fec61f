//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format of the settings file. Each type implements [`Default`] with
//! production default values. Types marked with `#[serde(default)]` allow
//! partial JSON — missing fields get their default value during
//! deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the inkwire client.
///
/// Loaded from `~/.inkwire/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "version": "0.1.0",
///   "server": { "websocket": { "pingIntervalMillis": 10000 } }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InkwireSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Recognition server connection settings.
    pub server: ServerSettings,
}

impl Default for InkwireSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "inkwire".to_string(),
            server: ServerSettings::default(),
        }
    }
}

/// Recognition server connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Reconnection budget consumed by the owning context after a close.
    /// Zeroed for an in-flight session once any frame is received.
    pub max_retry_count: u32,
    /// Persistent-connection transport settings.
    pub websocket: WebsocketSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_retry_count: 2,
            websocket: WebsocketSettings::default(),
        }
    }
}

/// WebSocket transport settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsocketSettings {
    /// Whether the application-level heartbeat runs at all.
    pub ping_enabled: bool,
    /// Interval between keep-alive frames in milliseconds.
    pub ping_interval_millis: u64,
    /// Unanswered pings tolerated before the session is force-closed.
    pub max_ping_lost: u32,
    /// Whether the owning context should reopen a session after a close.
    pub auto_reconnect: bool,
}

impl Default for WebsocketSettings {
    fn default() -> Self {
        Self {
            ping_enabled: true,
            ping_interval_millis: 5000,
            max_ping_lost: 10,
            auto_reconnect: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
