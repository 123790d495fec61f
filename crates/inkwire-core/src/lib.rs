//! # inkwire-core
//!
//! Shared vocabulary for the inkwire recognizer client.
//!
//! - **Session events**: [`SessionEvent`] — the four lifecycle notifications
//!   (open, message, error, close) delivered to the owning context
//! - **Errors**: [`SendError`] with the distinguished `LostConnection`
//!   variant checked by callers before reconnecting

#![deny(unsafe_code)]

pub mod errors;
pub mod events;

pub use errors::SendError;
pub use events::SessionEvent;
