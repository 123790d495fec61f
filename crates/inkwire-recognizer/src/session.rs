//! Per-connection session state.
//!
//! One [`SessionState`] exists per open transport. It is created by the
//! connection factory with values copied out of the settings — a copy, not a
//! live reference, so mutating settings later never affects an in-flight
//! session — and discarded when the transport closes.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use inkwire_settings::ServerSettings;

/// Transport connection state, on the transport's own ordinal scale.
///
/// The ordering is meaningful: sends are allowed while
/// `state <= ReadyState::Open`, and close is a no-op once
/// `state >= ReadyState::Closing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ReadyState {
    /// The transport handshake is in progress.
    Connecting = 0,
    /// The transport is established and usable.
    Open = 1,
    /// A close handshake has been initiated.
    Closing = 2,
    /// The transport is fully closed.
    Closed = 3,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Close code and reason recorded when a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseInfo {
    /// Numeric close code.
    pub code: u16,
    /// Machine-readable reason string.
    pub reason: String,
}

/// Health counters and configuration copies for one transport instance.
///
/// Shared between the driver task and the [`Session`] handle. All mutation
/// happens on the driver task; the handle only reads, so plain atomics are
/// enough.
///
/// [`Session`]: crate::socket::Session
pub struct SessionState {
    /// When the connection was opened, for duration reporting on close.
    started_at: Instant,
    /// Current transport state.
    ready_state: AtomicU8,
    /// Heartbeats sent without an intervening inbound frame.
    ping_count: AtomicU32,
    /// Remaining reconnection budget; zeroed on the first inbound frame.
    retry_budget: AtomicU32,
    /// Close code/reason, recorded once by whichever side ends the session.
    last_close: Mutex<Option<CloseInfo>>,
    ping_enabled: bool,
    ping_interval: Duration,
    max_ping_lost: u32,
    auto_reconnect: bool,
}

impl SessionState {
    /// Create session state from the context's settings.
    ///
    /// All configuration values are copied here.
    #[must_use]
    pub fn new(settings: &ServerSettings) -> Self {
        Self {
            started_at: Instant::now(),
            ready_state: AtomicU8::new(ReadyState::Connecting as u8),
            ping_count: AtomicU32::new(0),
            retry_budget: AtomicU32::new(settings.max_retry_count),
            last_close: Mutex::new(None),
            ping_enabled: settings.websocket.ping_enabled,
            ping_interval: Duration::from_millis(settings.websocket.ping_interval_millis),
            max_ping_lost: settings.websocket.max_ping_lost,
            auto_reconnect: settings.websocket.auto_reconnect,
        }
    }

    /// Current transport state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.ready_state.load(Ordering::Relaxed))
    }

    /// Record a transport state transition.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.store(state as u8, Ordering::Relaxed);
    }

    /// Heartbeats sent since the last inbound frame.
    pub fn ping_count(&self) -> u32 {
        self.ping_count.load(Ordering::Relaxed)
    }

    /// Count one heartbeat tick and return the new total.
    pub fn record_ping(&self) -> u32 {
        self.ping_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register inbound traffic: zeroes the missed-ping counter and the
    /// reconnection budget. A received frame proves liveness, which cancels
    /// the retry budget for this attempt.
    pub fn mark_activity(&self) {
        self.ping_count.store(0, Ordering::Relaxed);
        self.retry_budget.store(0, Ordering::Relaxed);
    }

    /// Remaining reconnection budget for the owning context.
    pub fn retries_remaining(&self) -> u32 {
        self.retry_budget.load(Ordering::Relaxed)
    }

    /// Whether the application-level heartbeat runs for this session.
    pub fn ping_enabled(&self) -> bool {
        self.ping_enabled
    }

    /// Interval between keep-alive frames.
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    /// Unanswered pings tolerated before the session is force-closed.
    pub fn max_ping_lost(&self) -> u32 {
        self.max_ping_lost
    }

    /// Whether the owning context should reopen a session after close.
    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect
    }

    /// Time since the connection was opened.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Record the close code/reason, if none has been recorded yet.
    ///
    /// The first writer wins: a locally-initiated close records its code
    /// before the remote echo arrives, and a remote close records the
    /// received frame.
    pub fn record_close(&self, code: u16, reason: &str) {
        let mut close = self.last_close.lock();
        if close.is_none() {
            *close = Some(CloseInfo {
                code,
                reason: reason.to_string(),
            });
        }
    }

    /// The recorded close code/reason, once the session has ended.
    pub fn last_close(&self) -> Option<CloseInfo> {
        self.last_close.lock().clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
