//! # inkwire-settings
//!
//! Configuration management with layered sources for the inkwire client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`InkwireSettings::default()`]
//! 2. **User file** — `~/.inkwire/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `INKWIRE_*` overrides (highest priority)
//!
//! The session manager copies the values it needs out of [`ServerSettings`]
//! when a connection opens; mutating settings afterwards never affects an
//! in-flight session.
//!
//! # Usage
//!
//! ```no_run
//! use inkwire_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("ping interval: {} ms", settings.server.websocket.ping_interval_millis);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
///
/// Initialized on first access via [`get_settings`]. The settings are loaded
/// from `~/.inkwire/settings.json` with env var overrides, or fall back to
/// compiled defaults if loading fails.
static SETTINGS: OnceLock<InkwireSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.inkwire/settings.json` with env
/// var overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static InkwireSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: InkwireSettings) -> std::result::Result<(), InkwireSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = InkwireSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = InkwireSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.name, "inkwire");
        assert_eq!(settings.server.max_retry_count, 2);
        assert!(settings.server.websocket.ping_enabled);
        assert_eq!(settings.server.websocket.ping_interval_millis, 5000);
        assert_eq!(settings.server.websocket.max_ping_lost, 10);
        assert!(settings.server.websocket.auto_reconnect);
    }
}
