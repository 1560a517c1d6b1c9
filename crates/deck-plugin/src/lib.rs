//! # deck-plugin
//!
//! Runtime library for control-surface plugins.  A plugin binary builds an
//! [`ActionCatalog`], optionally a [`PluginDelegate`] and a
//! [`SettingsSchema`], and hands them to [`run_plugin`]; the runtime does the
//! rest:
//!
//! - connects to the host over WebSocket and registers,
//! - decodes every inbound envelope and routes it to the right instance,
//! - creates and drops action instances as controls appear and disappear,
//! - tells short presses from long presses,
//! - mirrors the plugin-wide settings document with the host.
//!
//! # Architecture overview (for beginners)
//!
//! The crate follows the same three-layer layout as the rest of the
//! workspace:
//!
//! ```text
//! deck-plugin
//!   domain/          PluginConfig, SettingsSchema (plain data, no I/O)
//!   application/     Action trait, catalog, instance registry, long-press
//!                    timers, global settings store, PluginRuntime (router)
//!   infrastructure/  WebSocket session, outbound writer, bootstrap CLI
//! ```
//!
//! Application code depends only on traits and channels, so every routing
//! rule can be tested without a socket: the tests feed raw JSON into
//! [`PluginRuntime::accept_frame`] and read the commands the runtime queued.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::action::{Action, ActionContext};
pub use application::catalog::{
    ActionCatalog, ActionFactory, ActionState, ActionType, CatalogError, InstanceSeed,
};
pub use application::delegate::{NoopDelegate, PluginDelegate, PluginError};
pub use application::global_settings::{GlobalSettingsStore, SettingsError};
pub use application::instances::{ControllerRegistry, InstanceRegistry, LiveInstance, Registration};
pub use application::long_press::{LongPressTimers, PressOutcome};
pub use application::runtime::PluginRuntime;
pub use domain::config::PluginConfig;
pub use domain::settings::{SettingKey, SettingKind, SettingsSchema};
pub use infrastructure::bootstrap::{normalize_host_args, Bootstrap, HostArgs};
pub use infrastructure::outbound::{Outbound, OutboundFrame};
pub use infrastructure::transport::{
    receive_loop, run_plugin, SessionEnd, SessionState, TransportError, TransportErrorCounter,
};

// Protocol types plugin authors need in handler signatures.
pub use deck_core;
pub use deck_core::protocol::{
    DialPressPayload, DialRotatePayload, InstancePayload, KeyPayload, TitleParameters,
    TitleParametersPayload, TouchTapPayload,
};
pub use deck_core::{
    Controller, Coordinates, DeviceInfo, HostInfo, InboundEvent, OutboundCommand, Settings,
    Target, TriggerDescription,
};
