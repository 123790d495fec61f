//! Connection factory and session driver.
//!
//! [`open`] establishes the transport and spawns one driver task per
//! session. The driver owns both halves of the WebSocket and multiplexes
//! three sources in a single `select!` loop: outbound commands from the
//! [`Session`] handle, heartbeat ticks, and inbound frames. Every lifecycle
//! notification funnels into the context's event channel; transport faults
//! are forwarded there verbatim, never swallowed.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, instrument, warn};

use inkwire_core::{SendError, SessionEvent};
use inkwire_settings::ServerSettings;

use crate::dispatch;
use crate::heartbeat::{self, HeartbeatAction, PING_FRAME, PING_LOST_CODE, PING_LOST_REASON};
use crate::session::{CloseInfo, ReadyState, SessionState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsError = tokio_tungstenite::tungstenite::Error;

/// Close code reported when the transport dies without a close handshake.
const ABNORMAL_CLOSE_CODE: u16 = 1006;

/// Close code used when the session handle is dropped.
const GOING_AWAY_CLOSE_CODE: u16 = 1001;

/// Connection parameters and the notification channel, supplied by the
/// owning recognition context.
///
/// The context keeps the [`Session`] handle returned by [`open`]; the
/// session only observes the context's settings through the copies taken at
/// creation time.
#[derive(Clone)]
pub struct RecognizerContext {
    /// Connection endpoint.
    pub url: String,
    /// Channel receiving every lifecycle/event notification.
    pub events: mpsc::UnboundedSender<SessionEvent>,
    /// Read-only connection configuration.
    pub server: ServerSettings,
}

/// Commands from the session handle to the driver task.
enum Outbound {
    /// An encoded application frame to transmit.
    Frame(String),
    /// Initiate the close handshake.
    Close { code: u16, reason: String },
}

/// Live handle to one recognition session.
///
/// Dropping the handle closes the command channel; the driver performs a
/// polite close and exits.
pub struct Session {
    state: Arc<SessionState>,
    out_tx: mpsc::UnboundedSender<Outbound>,
    _driver: JoinHandle<()>,
}

/// Open a new session for the given context.
///
/// Returns immediately with the handle in the connecting state. Runtime
/// connection failures are not returned here: they surface as an error
/// event followed by a close event on the context's channel.
#[must_use]
pub fn open(context: &RecognizerContext) -> Session {
    let state = Arc::new(SessionState::new(&context.server));
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(run_session(
        context.url.clone(),
        Arc::clone(&state),
        context.events.clone(),
        out_rx,
    ));
    Session {
        state,
        out_tx,
        _driver: driver,
    }
}

impl Session {
    /// Encode and transmit an application message.
    ///
    /// # Errors
    ///
    /// Fails with [`SendError::LostConnection`] — without attempting any
    /// transmission — when the transport is closing or closed. The session
    /// is no longer usable; obtain a new one.
    pub fn send<T: Serialize>(&self, message: &T) -> Result<(), SendError> {
        if self.state.ready_state() > ReadyState::Open {
            return Err(SendError::LostConnection);
        }
        let text = dispatch::encode_message(message)?;
        self.out_tx
            .send(Outbound::Frame(text))
            .map_err(|_| SendError::LostConnection)
    }

    /// Close the session with the given code and human-readable reason.
    ///
    /// No-op unless the transport is connecting or open; closing an
    /// already-closing/closed session is always safe.
    pub fn close(&self, code: u16, reason: &str) {
        if self.state.ready_state() >= ReadyState::Closing {
            return;
        }
        let _ = self.out_tx.send(Outbound::Close {
            code,
            reason: reason.to_string(),
        });
    }

    /// Current transport state.
    pub fn ready_state(&self) -> ReadyState {
        self.state.ready_state()
    }

    /// Heartbeats sent since the last inbound frame.
    pub fn ping_count(&self) -> u32 {
        self.state.ping_count()
    }

    /// Remaining reconnection budget for the owning context. Zeroed once
    /// any frame has been received on this session.
    pub fn retries_remaining(&self) -> u32 {
        self.state.retries_remaining()
    }

    /// Whether the owning context should reopen a session after close.
    pub fn auto_reconnect(&self) -> bool {
        self.state.auto_reconnect()
    }

    /// Time since the session was opened.
    pub fn uptime(&self) -> Duration {
        self.state.uptime()
    }

    /// Close code/reason, once the session has ended.
    pub fn last_close(&self) -> Option<CloseInfo> {
        self.state.last_close()
    }
}

/// Drive one session from connect to close.
#[instrument(skip_all, fields(url = %url))]
async fn run_session(
    url: String,
    state: Arc<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    mut out_rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let ws = match connect_async(&url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            warn!(error = %e, "connection failed");
            state.set_ready_state(ReadyState::Closed);
            let _ = events.send(SessionEvent::Error {
                message: e.to_string(),
            });
            state.record_close(ABNORMAL_CLOSE_CODE, "");
            emit_close(&state, &events);
            return;
        }
    };

    state.set_ready_state(ReadyState::Open);
    debug!("connection opened");
    let _ = events.send(SessionEvent::Open);

    let (mut ws_tx, mut ws_rx) = ws.split();

    let mut ping = time::interval(state.ping_interval());
    // interval's first tick fires immediately; the first heartbeat
    // decision belongs one full interval after open.
    let _ = ping.tick().await;
    let mut heartbeat_armed = state.ping_enabled();

    loop {
        tokio::select! {
            cmd = out_rx.recv() => match cmd {
                Some(Outbound::Frame(text)) => {
                    if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                        warn!(error = %e, "transport send failed");
                        let _ = events.send(SessionEvent::Error {
                            message: e.to_string(),
                        });
                        break;
                    }
                }
                Some(Outbound::Close { code, reason }) => {
                    if initiate_close(&state, &mut ws_tx, code, &reason).await.is_err() {
                        break;
                    }
                }
                // All handles dropped: end the session politely.
                None => {
                    let _ = initiate_close(&state, &mut ws_tx, GOING_AWAY_CLOSE_CODE, "").await;
                    break;
                }
            },
            _ = ping.tick(), if heartbeat_armed => match heartbeat::on_tick(&state) {
                HeartbeatAction::SendPing => {
                    if let Err(e) = ws_tx.send(Message::Text(PING_FRAME.into())).await {
                        warn!(error = %e, "ping send failed");
                        let _ = events.send(SessionEvent::Error {
                            message: e.to_string(),
                        });
                        break;
                    }
                }
                HeartbeatAction::CloseExpired => {
                    warn!(missed = state.ping_count(), "heartbeat expired, closing");
                    heartbeat_armed = false;
                    if initiate_close(&state, &mut ws_tx, PING_LOST_CODE, PING_LOST_REASON)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                HeartbeatAction::Stop => {
                    heartbeat_armed = false;
                }
            },
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch_frame(&state, &events, text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => dispatch_frame(&state, &events, text),
                    Err(_) => debug!(len = data.len(), "ignoring non-UTF8 binary frame"),
                },
                Some(Ok(Message::Close(close))) => {
                    debug!("close frame received");
                    match close {
                        Some(frame) => state.record_close(frame.code.into(), frame.reason.as_str()),
                        None => state.record_close(ABNORMAL_CLOSE_CODE, ""),
                    }
                    // The transport completes the handshake; the stream
                    // ends on the next poll.
                }
                Some(Ok(_)) => {} // control frames handled by the transport
                Some(Err(e)) => {
                    warn!(error = %e, "transport error");
                    let _ = events.send(SessionEvent::Error {
                        message: e.to_string(),
                    });
                    break;
                }
                None => break,
            },
        }
    }

    state.set_ready_state(ReadyState::Closed);
    state.record_close(ABNORMAL_CLOSE_CODE, "");
    emit_close(&state, &events);
}

/// Issue the close handshake unless one is already under way.
///
/// At most one close handshake is ever sent per session, whichever path
/// asks first (caller, heartbeat expiry, or handle drop).
async fn initiate_close(
    state: &SessionState,
    ws_tx: &mut WsSink,
    code: u16,
    reason: &str,
) -> Result<(), WsError> {
    if state.ready_state() >= ReadyState::Closing {
        return Ok(());
    }
    state.set_ready_state(ReadyState::Closing);
    state.record_close(code, reason);
    debug!(code, reason, "closing connection");
    ws_tx
        .send(Message::Close(Some(CloseFrame {
            code: code.into(),
            reason: reason.to_string().into(),
        })))
        .await
}

/// Decode one inbound frame and deliver it as a message event.
fn dispatch_frame(
    state: &SessionState,
    events: &mpsc::UnboundedSender<SessionEvent>,
    payload: &str,
) {
    match dispatch::decode_frame(state, payload) {
        Ok(data) => {
            debug!("message received");
            let _ = events.send(SessionEvent::Message { data });
        }
        // Protocol violation by the remote end; the frame is dropped.
        Err(e) => error!(error = %e, "malformed frame from server"),
    }
}

/// Deliver the final close event with the recorded code/reason.
fn emit_close(state: &SessionState, events: &mpsc::UnboundedSender<SessionEvent>) {
    let close = state.last_close().unwrap_or_else(|| CloseInfo {
        code: ABNORMAL_CLOSE_CODE,
        reason: String::new(),
    });
    debug!(duration = ?state.uptime(), code = close.code, "connection closed");
    let _ = events.send(SessionEvent::Close {
        code: close.code,
        reason: close.reason,
    });
}
