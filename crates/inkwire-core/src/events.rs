//! Session lifecycle events delivered to the owning recognition context.
//!
//! The transport fans out exactly four notification kinds. Open, error, and
//! close carry the raw transport information; inbound application frames are
//! normalized to [`SessionEvent::Message`] with the decoded JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lifecycle or traffic notification for one recognition session.
///
/// Delivered in order over the context's event channel. Serializes with a
/// `type` tag, so a message event has the wire shape
/// `{"type":"message","data":…}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionEvent {
    /// The transport finished its handshake and is ready for traffic.
    Open,

    /// An inbound application frame, decoded from its wire encoding.
    Message {
        /// Decoded JSON payload of the frame.
        data: Value,
    },

    /// A transport-level fault, forwarded verbatim.
    Error {
        /// Description of the underlying connection fault.
        message: String,
    },

    /// The transport closed. Always the final event for a session.
    Close {
        /// Numeric close code (1006 when the transport died without a
        /// close handshake).
        code: u16,
        /// Machine-readable reason string, empty when none was given.
        reason: String,
    },
}

impl SessionEvent {
    /// Whether this event terminates the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Close { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_event_wire_shape() {
        let event = SessionEvent::Message {
            data: json!({"type": "textResult", "result": {"label": "hello"}}),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["data"]["type"], "textResult");
        assert_eq!(value["data"]["result"]["label"], "hello");
    }

    #[test]
    fn open_event_wire_shape() {
        let value = serde_json::to_value(SessionEvent::Open).unwrap();
        assert_eq!(value, json!({"type": "open"}));
    }

    #[test]
    fn close_event_carries_code_and_reason() {
        let event = SessionEvent::Close {
            code: 1000,
            reason: "PING_LOST".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "close");
        assert_eq!(value["code"], 1000);
        assert_eq!(value["reason"], "PING_LOST");
    }

    #[test]
    fn error_event_wire_shape() {
        let event = SessionEvent::Error {
            message: "connection refused".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "connection refused");
    }

    #[test]
    fn events_round_trip() {
        let events = [
            SessionEvent::Open,
            SessionEvent::Message { data: json!([1, 2]) },
            SessionEvent::Error {
                message: "boom".to_string(),
            },
            SessionEvent::Close {
                code: 1006,
                reason: String::new(),
            },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: SessionEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn only_close_is_terminal() {
        assert!(!SessionEvent::Open.is_terminal());
        assert!(
            !SessionEvent::Message { data: json!(null) }.is_terminal()
        );
        assert!(
            !SessionEvent::Error {
                message: String::new()
            }
            .is_terminal()
        );
        assert!(
            SessionEvent::Close {
                code: 1000,
                reason: String::new()
            }
            .is_terminal()
        );
    }
}
