//! The outbound command queue and the task that drains it onto the socket.
//!
//! Producers (handlers, the router, settings publication) never touch the
//! socket.  They encode an envelope and push the text onto a bounded `mpsc`
//! channel; a single writer task owns the sink and writes frames in queue
//! order.  A producer that needs to know the frame actually left (global
//! settings publication) attaches a `oneshot` acknowledgement.

use std::fmt::Display;

use deck_core::{encode_envelope, OutboundEnvelope};
use futures_util::{Sink, SinkExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error};

/// One encoded frame waiting for the writer.
#[derive(Debug)]
pub struct OutboundFrame {
    pub text: String,
    /// Completed once the frame has been written to the socket.
    pub ack: Option<oneshot::Sender<()>>,
}

/// Clonable sending half of the outbound queue.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::Sender<OutboundFrame>,
}

impl Outbound {
    /// Creates a queue holding at most `capacity` unsent frames.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Encodes and queues `envelope`.  Returns `false` if it was dropped
    /// (encode failure or writer gone); the failure is logged here.
    pub async fn send(&self, envelope: OutboundEnvelope) -> bool {
        let Some(text) = encode(&envelope) else {
            return false;
        };
        self.enqueue(&envelope.event, OutboundFrame { text, ack: None })
            .await
    }

    /// Like [`send`](Self::send), but waits until the writer has written the
    /// frame.  Returns `false` if the frame was dropped or the write failed.
    pub async fn send_confirmed(&self, envelope: OutboundEnvelope) -> bool {
        let Some(text) = encode(&envelope) else {
            return false;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        let frame = OutboundFrame {
            text,
            ack: Some(ack_tx),
        };
        if !self.enqueue(&envelope.event, frame).await {
            return false;
        }
        ack_rx.await.is_ok()
    }

    async fn enqueue(&self, event: &str, frame: OutboundFrame) -> bool {
        match self.tx.send(frame).await {
            Ok(()) => true,
            Err(_) => {
                debug!("outbound writer is gone; dropping {event}");
                false
            }
        }
    }
}

fn encode(envelope: &OutboundEnvelope) -> Option<String> {
    match encode_envelope(envelope) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("dropping outbound {}: {e}", envelope.event);
            None
        }
    }
}

/// Drains `rx` onto `sink` until every [`Outbound`] clone is dropped.
///
/// A failed write is logged and its acknowledgement is dropped, which makes
/// the matching [`Outbound::send_confirmed`] return `false`.  The writer
/// keeps going: deciding whether the host is gone is the receive loop's job.
pub async fn run_writer<S>(mut sink: S, mut rx: mpsc::Receiver<OutboundFrame>)
where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    while let Some(frame) = rx.recv().await {
        match sink.send(WsMessage::Text(frame.text)).await {
            Ok(()) => {
                if let Some(ack) = frame.ack {
                    let _ = ack.send(());
                }
            }
            Err(e) => error!("failed to write outbound frame: {e}"),
        }
    }
    debug!("outbound queue closed; writer exiting");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
