//! Launch arguments passed by the host.
//!
//! The host starts the plugin executable like this:
//!
//! ```text
//! plugin -port 28196 -pluginUUID 5A1B... -registerEvent registerPlugin -info '{...}'
//! ```
//!
//! The single-dash long flags are not something `clap` accepts, so
//! [`normalize_host_args`] rewrites them to `--port` etc. before parsing.
//!
//! # Environment variable overrides
//!
//! | Variable             | Default     | Description                       |
//! |----------------------|-------------|-----------------------------------|
//! | `DECK_LONG_PRESS_MS` | `1000`      | Long-press threshold (ms)         |
//! | `DECK_HOST`          | `127.0.0.1` | Host of the WebSocket server      |

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use deck_core::HostInfo;

use crate::domain::config::PluginConfig;

/// Flags the host passes with a single leading dash.
const HOST_FLAGS: [&str; 4] = ["port", "pluginUUID", "registerEvent", "info"];

/// Everything needed to open the session.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub port: u16,
    pub plugin_uuid: String,
    pub register_event: String,
    pub info: HostInfo,
}

/// The plugin's command line.
#[derive(Debug, Parser)]
#[command(about = "Control-surface plugin launched by its host application", version)]
pub struct HostArgs {
    /// Port of the host's WebSocket server on localhost.
    #[arg(long)]
    pub port: u16,

    /// Identifier the host assigned to this plugin instance.
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: String,

    /// Event name to send in the registration envelope.
    #[arg(long = "registerEvent")]
    pub register_event: String,

    /// JSON description of the host application and attached devices.
    #[arg(long)]
    pub info: String,

    /// How long a key or dial must be held to count as a long press.
    #[arg(long = "long-press-ms", default_value_t = 1000, env = "DECK_LONG_PRESS_MS")]
    pub long_press_ms: u64,

    /// Host name of the WebSocket server.
    #[arg(long, default_value = "127.0.0.1", env = "DECK_HOST")]
    pub host: String,
}

impl HostArgs {
    /// Converts the parsed arguments into a [`Bootstrap`] and a
    /// [`PluginConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `-info` is not valid JSON for [`HostInfo`].
    pub fn into_bootstrap(self) -> anyhow::Result<(Bootstrap, PluginConfig)> {
        let info: HostInfo = serde_json::from_str(&self.info)
            .with_context(|| format!("invalid -info JSON: {}", self.info))?;

        let config = PluginConfig {
            long_press_threshold: Duration::from_millis(self.long_press_ms),
            host: self.host,
            ..PluginConfig::default()
        };
        let bootstrap = Bootstrap {
            port: self.port,
            plugin_uuid: self.plugin_uuid,
            register_event: self.register_event,
            info,
        };
        Ok((bootstrap, config))
    }
}

/// Rewrites the host's `-flag` arguments to `--flag`.  Everything else
/// (including the values, which may start with `-`) is left alone.
pub fn normalize_host_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(name) if HOST_FLAGS.contains(&name) => format!("--{name}"),
            _ => arg,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn host_command_line() -> Vec<String> {
        [
            "counter",
            "-port",
            "28196",
            "-pluginUUID",
            "ABCDEF123",
            "-registerEvent",
            "registerPlugin",
            "-info",
            r#"{"application":{"version":"6.0.4"},"plugin":{"uuid":"com.acme.counter","version":"1.0"}}"#,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_normalize_rewrites_only_host_flags() {
        let args = normalize_host_args(vec![
            "bin".to_string(),
            "-port".to_string(),
            "-5".to_string(),
            "--host".to_string(),
            "-x".to_string(),
        ]);
        assert_eq!(args, vec!["bin", "--port", "-5", "--host", "-x"]);
    }

    #[test]
    fn test_host_command_line_parses() {
        // Arrange
        let argv = normalize_host_args(host_command_line());

        // Act
        let args = HostArgs::try_parse_from(argv).unwrap();

        // Assert
        assert_eq!(args.port, 28196);
        assert_eq!(args.plugin_uuid, "ABCDEF123");
        assert_eq!(args.register_event, "registerPlugin");
    }

    #[test]
    fn test_into_bootstrap_parses_info_and_defaults() {
        let args = HostArgs::try_parse_from(normalize_host_args(host_command_line())).unwrap();

        let (bootstrap, config) = args.into_bootstrap().unwrap();

        assert_eq!(bootstrap.info.application.version, "6.0.4");
        assert_eq!(bootstrap.info.plugin.uuid, "com.acme.counter");
        assert_eq!(config.long_press_threshold, Duration::from_millis(1000));
        assert_eq!(config.max_transport_errors, 50);
    }

    #[test]
    fn test_long_press_override() {
        let mut argv = normalize_host_args(host_command_line());
        argv.extend(["--long-press-ms".to_string(), "250".to_string()]);

        let (_, config) = HostArgs::try_parse_from(argv)
            .unwrap()
            .into_bootstrap()
            .unwrap();

        assert_eq!(config.long_press_threshold, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_info_json_is_an_error() {
        let mut argv = normalize_host_args(host_command_line());
        let last = argv.len() - 1;
        argv[last] = "{not json".to_string();

        let result = HostArgs::try_parse_from(argv).unwrap().into_bootstrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_port_is_rejected() {
        let result = HostArgs::try_parse_from([
            "bin",
            "--pluginUUID",
            "X",
            "--registerEvent",
            "r",
            "--info",
            "{}",
        ]);
        assert!(result.is_err());
    }
}
