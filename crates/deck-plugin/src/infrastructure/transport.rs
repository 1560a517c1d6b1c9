//! The WebSocket session with the host.
//!
//! This module is responsible for:
//!
//! 1. Connecting to `ws://{host}:{port}` (the port comes from the launch
//!    arguments).
//! 2. Sending the registration envelope as the very first frame.
//! 3. Spawning the outbound writer task that owns the socket's write half.
//! 4. Running the receive loop, which hands every text frame to
//!    [`PluginRuntime::accept_frame`] and never waits for handlers.
//! 5. Ending the session on a close frame, end of stream, or a run of
//!    consecutive transport errors.
//!
//! There is no reconnect: when the host goes away the plugin process is
//! expected to exit, and the host relaunches it.
//!
//! ```text
//! Connecting ──connect_async──► Open ──close / EOF / error run──► Closing ──► Closed
//! ```

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use deck_core::{encode_registration, CodecError};
use futures_util::{SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::application::catalog::ActionCatalog;
use crate::application::delegate::PluginDelegate;
use crate::application::runtime::PluginRuntime;
use crate::domain::config::PluginConfig;
use crate::domain::settings::SettingsSchema;
use crate::infrastructure::bootstrap::Bootstrap;
use crate::infrastructure::outbound::{run_writer, Outbound};

/// Errors raised by the transport itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to host at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },

    #[error("failed to encode registration: {0}")]
    Encode(#[from] CodecError),

    #[error("failed to send registration: {0}")]
    Register(#[source] WsError),

    #[error("receive failed: {0}")]
    Receive(#[source] WsError),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The host closed the connection or the stream ended.
    Closed,
    /// Too many consecutive transport errors; the host is presumed gone.
    HostGone { consecutive_errors: u32 },
}

/// Lifecycle of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SessionState {
    /// Moves to `next`, logging the transition.
    pub fn advance(&mut self, next: SessionState) {
        info!("session {} -> {}", self, next);
        *self = next;
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Counts consecutive transport errors.
#[derive(Debug, Clone)]
pub struct TransportErrorCounter {
    consecutive: u32,
    threshold: u32,
}

impl TransportErrorCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive: 0,
            threshold: threshold.max(1),
        }
    }

    /// Records one failure.  Returns `true` once the threshold is reached.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive >= self.threshold
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

// ── Receive loop ──────────────────────────────────────────────────────────────

/// Reads frames from `stream` until the session ends.
///
/// Text frames (and binary frames holding UTF-8) go to
/// [`PluginRuntime::accept_frame`]; the spawned handler is not awaited.
/// Control frames count as successful receives.
pub async fn receive_loop<S>(mut stream: S, runtime: &PluginRuntime, max_errors: u32) -> SessionEnd
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let mut errors = TransportErrorCounter::new(max_errors);

    loop {
        match stream.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                errors.record_success();
                runtime.accept_frame(&text).await;
            }
            Some(Ok(WsMessage::Binary(bytes))) => {
                errors.record_success();
                match String::from_utf8(bytes) {
                    Ok(text) => {
                        runtime.accept_frame(&text).await;
                    }
                    Err(_) => warn!("ignoring binary frame that is not UTF-8"),
                }
            }
            Some(Ok(WsMessage::Close(frame))) => {
                info!("host closed the connection: {frame:?}");
                return SessionEnd::Closed;
            }
            Some(Ok(_)) => {
                // Ping / pong / raw frame.
                errors.record_success();
            }
            Some(Err(e)) => {
                let err = TransportError::Receive(e);
                if errors.record_failure() {
                    error!(
                        "{err}; {} consecutive transport errors, giving up",
                        errors.consecutive()
                    );
                    return SessionEnd::HostGone {
                        consecutive_errors: errors.consecutive(),
                    };
                }
                warn!("{err} ({} consecutive)", errors.consecutive());
            }
            None => {
                info!("host stream ended");
                return SessionEnd::Closed;
            }
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Connects to the host and runs one session to completion.
///
/// # Errors
///
/// Returns an error if the connection cannot be established or the
/// registration frame cannot be sent.  Once the session is open, every
/// failure is handled inside and reported through the returned
/// [`SessionEnd`].
pub async fn run_plugin(
    bootstrap: Bootstrap,
    config: PluginConfig,
    catalog: ActionCatalog,
    delegate: Arc<dyn PluginDelegate>,
    schema: SettingsSchema,
) -> anyhow::Result<SessionEnd> {
    let mut state = SessionState::Connecting;
    let url = format!("ws://{}:{}", config.host, bootstrap.port);
    info!("connecting to host at {url} as {}", bootstrap.plugin_uuid);

    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|source| TransportError::Connect {
            url: url.clone(),
            source,
        })?;
    state.advance(SessionState::Open);

    let (mut sink, stream) = ws_stream.split();

    // Registration goes out before the writer exists, so nothing can be
    // queued ahead of it.
    let registration = encode_registration(&bootstrap.register_event, &bootstrap.plugin_uuid)
        .map_err(TransportError::from)?;
    sink.send(WsMessage::Text(registration))
        .await
        .map_err(TransportError::Register)
        .with_context(|| format!("registering {} with {url}", bootstrap.plugin_uuid))?;
    debug!("sent {} for {}", bootstrap.register_event, bootstrap.plugin_uuid);

    let (outbound, rx) = Outbound::channel(config.outbound_capacity);
    let writer = tokio::spawn(run_writer(sink, rx));

    let max_errors = config.max_transport_errors;
    let runtime = PluginRuntime::new(
        bootstrap.plugin_uuid,
        bootstrap.info,
        config,
        catalog,
        schema,
        delegate,
        outbound,
    );

    let end = receive_loop(stream, &runtime, max_errors).await;

    state.advance(SessionState::Closing);
    writer.abort();
    state.advance(SessionState::Closed);
    info!("session ended: {end:?}");
    Ok(end)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
