//! Infrastructure layer for deck-plugin.
//!
//! The infrastructure layer handles all I/O with the host application.
//!
//! # Responsibilities
//!
//! - Parsing the host's launch arguments into a `Bootstrap` and a `PluginConfig`
//! - Connecting to the host's WebSocket server and sending the registration
//! - Running the receive loop and counting transport errors
//! - Owning the socket's write half in a dedicated writer task
//!
//! # What does NOT belong here?
//!
//! - Event routing and instance bookkeeping (that is the application layer)
//! - Envelope encoding and decoding (that is `deck-core`)

pub mod bootstrap;
pub mod outbound;
pub mod transport;

// Re-export the primary entry points so plugin binaries can call them concisely.
pub use bootstrap::{normalize_host_args, Bootstrap, HostArgs};
pub use transport::run_plugin;
