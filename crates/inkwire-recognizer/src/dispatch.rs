//! Inbound frame dispatch and outbound encoding.
//!
//! Counter resets happen before decoding: any inbound frame is proof of
//! liveness, even one that turns out to be malformed. A decode failure is a
//! protocol violation by the remote end and is fatal for that frame only —
//! it is not retried, and nothing is delivered for it.

use serde::Serialize;
use serde_json::Value;

use crate::session::SessionState;

/// Decode one inbound frame.
///
/// Zeroes the missed-ping counter and the reconnection budget, then parses
/// the payload. The successful value becomes the `data` of a message event.
pub fn decode_frame(state: &SessionState, payload: &str) -> Result<Value, serde_json::Error> {
    state.mark_activity();
    serde_json::from_str(payload)
}

/// Encode an application message to its wire format.
pub fn encode_message<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
