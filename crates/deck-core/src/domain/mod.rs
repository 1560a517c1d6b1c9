//! Domain value types for the deck plugin protocol.
//!
//! These types describe *what* the host talks about (controllers, positions
//! on a device grid, the devices themselves) without any knowledge of how
//! envelopes are framed or transported.

/// Controller kinds and grid coordinates.
pub mod controller;

/// The host/application/device description passed to the plugin at launch.
pub mod host_info;
