//! Application-level heartbeat.
//!
//! The underlying transport does not reliably detect a half-open connection,
//! so the session sends a minimal keep-alive frame at a fixed interval and
//! bounds the number of unanswered pings. The inbound dispatcher zeroes the
//! counter on every received frame, so a busy healthy connection never
//! approaches the threshold.
//!
//! The tick decision is a pure function over [`SessionState`]; the driver
//! task owns the timer and stops ticking after a terminal action.

use crate::session::{ReadyState, SessionState};

/// The literal keep-alive frame.
pub const PING_FRAME: &str = r#"{"type":"ping"}"#;

/// Close code used when the heartbeat expires.
pub const PING_LOST_CODE: u16 = 1000;

/// Close reason identifying a ping-loss closure, distinct from a
/// caller-initiated close.
pub const PING_LOST_REASON: &str = "PING_LOST";

/// What the driver must do after a heartbeat tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Transmit a keep-alive frame and keep ticking.
    SendPing,
    /// Too many unanswered pings: close the transport with
    /// [`PING_LOST_CODE`]/[`PING_LOST_REASON`]. Terminal.
    CloseExpired,
    /// The transport already left the connecting/open states through
    /// another path: stop ticking without closing. Terminal.
    Stop,
}

/// Advance the heartbeat by one tick.
///
/// Increments the missed-ping counter, then decides: past the threshold the
/// session is closed before another ping is ever sent, so the counter never
/// exceeds `max_ping_lost + 1`.
pub fn on_tick(state: &SessionState) -> HeartbeatAction {
    let missed = state.record_ping();
    if missed > state.max_ping_lost() {
        HeartbeatAction::CloseExpired
    } else if state.ready_state() <= ReadyState::Open {
        HeartbeatAction::SendPing
    } else {
        HeartbeatAction::Stop
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use inkwire_settings::ServerSettings;

    fn make_state(max_ping_lost: u32) -> SessionState {
        let mut settings = ServerSettings::default();
        settings.websocket.max_ping_lost = max_ping_lost;
        let state = SessionState::new(&settings);
        state.set_ready_state(ReadyState::Open);
        state
    }

    #[test]
    fn ping_frame_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(PING_FRAME).unwrap();
        assert_eq!(value, serde_json::json!({"type": "ping"}));
    }

    #[test]
    fn pings_until_threshold_then_closes() {
        // max_ping_lost = 2: pings on ticks 1 and 2, close on tick 3.
        let state = make_state(2);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
        assert_eq!(on_tick(&state), HeartbeatAction::CloseExpired);
        // The driver stops ticking after CloseExpired, so the counter
        // never exceeds max_ping_lost + 1.
        assert_eq!(state.ping_count(), 3);
    }

    #[test]
    fn inbound_activity_resets_the_clock() {
        let state = make_state(2);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);

        state.mark_activity();
        assert_eq!(state.ping_count(), 0);

        // Full threshold available again after the reset.
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
        assert_eq!(on_tick(&state), HeartbeatAction::CloseExpired);
    }

    #[test]
    fn ping_count_monotonic_between_messages() {
        let state = make_state(10);
        let mut last = 0;
        for _ in 0..5 {
            let _ = on_tick(&state);
            let count = state.ping_count();
            assert!(count > last);
            last = count;
        }
    }

    #[test]
    fn sends_while_connecting() {
        let state = make_state(5);
        state.set_ready_state(ReadyState::Connecting);
        assert_eq!(on_tick(&state), HeartbeatAction::SendPing);
    }

    #[test]
    fn stops_when_closing() {
        let state = make_state(5);
        state.set_ready_state(ReadyState::Closing);
        assert_eq!(on_tick(&state), HeartbeatAction::Stop);
    }

    #[test]
    fn stops_when_closed() {
        let state = make_state(5);
        state.set_ready_state(ReadyState::Closed);
        assert_eq!(on_tick(&state), HeartbeatAction::Stop);
    }

    #[test]
    fn threshold_check_precedes_state_check() {
        // Even a closing transport gets CloseExpired once over threshold;
        // the driver's close guard makes the second close a no-op.
        let state = make_state(1);
        let _ = on_tick(&state);
        let _ = on_tick(&state);
        state.set_ready_state(ReadyState::Closing);
        assert_eq!(on_tick(&state), HeartbeatAction::CloseExpired);
    }

    #[test]
    fn zero_threshold_closes_on_first_tick() {
        let state = make_state(0);
        assert_eq!(on_tick(&state), HeartbeatAction::CloseExpired);
        assert_eq!(state.ping_count(), 1);
    }
}
