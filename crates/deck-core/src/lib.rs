//! # deck-core
//!
//! Shared library for the deck plugin runtime containing the JSON envelope
//! codec, the typed inbound event payloads, the outbound command set and the
//! host description handed to a plugin at launch.
//!
//! This crate has zero dependencies on sockets, async runtimes or threads.
//! Everything here is a pure data transform, so it can be tested in isolation
//! and reused by any transport.
//!
//! # Architecture overview (for beginners)
//!
//! A plugin is a long-lived process launched by a host application that owns
//! the physical control surface (keys, dials, touch strips).  The two sides
//! talk over a single WebSocket connection that carries JSON objects, each
//! tagged with an `"event"` field:
//!
//! ```json
//! {"event":"keyDown","context":"c1","action":"com.acme.counter.increment",
//!  "device":"d1","payload":{"settings":{},"coordinates":{"row":0,"column":1},
//!  "isInMultiAction":false}}
//! ```
//!
//! - **`protocol`** – How envelopes travel over the wire.  Inbound envelopes
//!   are decoded in two phases (a cheap header first, then the payload the
//!   event name selects) into [`InboundEnvelope`]; outbound commands are
//!   built from [`OutboundCommand`] and serialised by [`encode_envelope`].
//!
//! - **`domain`** – Plain value types shared by both directions: controller
//!   kinds, grid coordinates, and the [`HostInfo`] blob describing the host
//!   application and its attached devices.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `deck_core::InboundEnvelope` instead of the full module path.
pub use domain::controller::{Controller, Coordinates};
pub use domain::host_info::{
    ApplicationInfo, DeviceEntry, DeviceInfo, DeviceSize, DeviceType, HostInfo, PluginInfo,
    LEGACY_DIAL_PRESS_VERSION_PREFIX,
};
pub use protocol::codec::{
    decode_envelope, decode_header, decode_with_header, encode, encode_envelope,
    encode_registration, CodecError,
};
pub use protocol::commands::{OutboundCommand, OutboundEnvelope, Target, TriggerDescription};
pub use protocol::events::{
    EnvelopeHeader, EventKind, InboundEnvelope, InboundEvent, Settings,
};
