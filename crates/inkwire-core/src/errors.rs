//! Error types for outbound traffic.
//!
//! Heartbeat expiry is deliberately not an error: it surfaces as an ordinary
//! close event (code 1000, reason `PING_LOST`) through the session's event
//! channel. Transport faults likewise arrive as error events. The only
//! locally-raised failure is at send time, before any transmission is
//! attempted.

use thiserror::Error;

/// Errors raised when sending an application message.
#[derive(Debug, Error)]
pub enum SendError {
    /// The transport is closing or closed. The session is no longer usable;
    /// the caller must obtain a new one.
    #[error("lost connection")]
    LostConnection,

    /// The outbound message could not be encoded to its wire format.
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_connection_display() {
        assert_eq!(SendError::LostConnection.to_string(), "lost connection");
    }

    #[test]
    fn encode_error_from_conversion() {
        // A map with a non-string key cannot be encoded to JSON
        let bad = std::collections::HashMap::from([(vec![1u8], "x")]);
        let err = serde_json::to_string(&bad).unwrap_err();
        let err: SendError = err.into();
        assert!(matches!(err, SendError::Encode(_)));
        assert!(err.to_string().contains("encode"));
    }
}
