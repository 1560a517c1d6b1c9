//! Domain layer: plain configuration and settings declarations.
//!
//! Nothing here touches sockets, timers or locks.

pub mod config;
pub mod settings;

pub use config::PluginConfig;
pub use settings::{SettingKey, SettingKind, SettingsSchema};
