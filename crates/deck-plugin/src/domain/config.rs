//! Runtime configuration.
//!
//! [`PluginConfig`] holds every tunable the runtime reads.  It is a plain
//! struct with no environment reads of its own: the bootstrap layer fills it
//! from command-line flags and environment variables, and tests build it
//! directly.

use std::time::Duration;

/// All runtime configuration for a plugin process.
///
/// # Example
///
/// ```rust
/// use deck_plugin::PluginConfig;
///
/// let cfg = PluginConfig::default();
/// assert_eq!(cfg.max_transport_errors, 50);
/// ```
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// How long a key or dial must stay pressed before the long-press
    /// callback fires instead of the short one.
    pub long_press_threshold: Duration,

    /// Consecutive transport errors after which the host is considered gone
    /// and the session ends.  A successful receive resets the count.
    pub max_transport_errors: u32,

    /// Capacity of the bounded queue between command producers and the
    /// socket writer task.
    pub outbound_capacity: usize,

    /// Host name or IP of the host application's WebSocket server.  The port
    /// always comes from the launch arguments.
    pub host: String,
}

impl Default for PluginConfig {
    /// | Field                  | Default       |
    /// |------------------------|---------------|
    /// | long_press_threshold   | 1 second      |
    /// | max_transport_errors   | 50            |
    /// | outbound_capacity      | 128           |
    /// | host                   | `127.0.0.1`   |
    fn default() -> Self {
        Self {
            long_press_threshold: Duration::from_secs(1),
            max_transport_errors: 50,
            outbound_capacity: 128,
            host: "127.0.0.1".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
