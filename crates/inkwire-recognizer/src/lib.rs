//! # inkwire-recognizer
//!
//! Persistent WebSocket session management for the remote ink-recognition
//! service.
//!
//! - Connection factory: [`open`] spawns one driver task per session
//! - Application-level heartbeat with a bounded missed-ping threshold
//! - Inbound frame dispatch to a typed [`SessionEvent`] channel
//! - Readiness-guarded sends that fail fast with `LostConnection`
//! - Guarded, idempotent close
//!
//! The driver task owns both transport halves; heartbeat ticks, outbound
//! commands, and inbound frames are arms of a single `select!` loop, so no
//! two handlers for one session ever run concurrently.
//!
//! [`SessionEvent`]: inkwire_core::SessionEvent

#![deny(unsafe_code)]

pub mod dispatch;
pub mod heartbeat;
pub mod session;
pub mod socket;

pub use session::{CloseInfo, ReadyState, SessionState};
pub use socket::{RecognizerContext, Session, open};
