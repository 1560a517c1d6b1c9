//! Process-wide event hooks and the runtime's error type.

use async_trait::async_trait;
use deck_core::{CodecError, DeviceInfo, Settings};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::application::runtime::PluginRuntime;

/// Failures the router reports to [`PluginDelegate::on_error`].  None of them
/// stop the session.
#[derive(Debug, Error)]
pub enum PluginError {
    /// An inbound frame could not be decoded; it was discarded.
    #[error("failed to decode inbound envelope: {0}")]
    Decode(#[from] CodecError),

    /// An encoder-only event arrived for a context placed on a keypad.
    #[error("{event} is only valid on an encoder, but context {context} is a keypad")]
    ControllerMismatch { context: String, event: &'static str },
}

/// Handlers for events that are not tied to a single instance.
///
/// Every method has an empty default body; `on_error` logs at `warn`.
#[async_trait]
pub trait PluginDelegate: Send + Sync {
    async fn device_did_connect(
        &self,
        _runtime: &PluginRuntime,
        _device: &str,
        _info: &DeviceInfo,
    ) {
    }

    async fn device_did_disconnect(&self, _runtime: &PluginRuntime, _device: &str) {}

    async fn application_did_launch(&self, _runtime: &PluginRuntime, _application: &str) {}

    async fn application_did_terminate(&self, _runtime: &PluginRuntime, _application: &str) {}

    async fn system_did_wake_up(&self, _runtime: &PluginRuntime) {}

    async fn property_inspector_did_appear(
        &self,
        _runtime: &PluginRuntime,
        _context: &str,
        _action: &str,
    ) {
    }

    async fn property_inspector_did_disappear(
        &self,
        _runtime: &PluginRuntime,
        _context: &str,
        _action: &str,
    ) {
    }

    /// Called for every `sendToPlugin`, after the addressed instance (if any).
    async fn send_to_plugin(
        &self,
        _runtime: &PluginRuntime,
        _context: &str,
        _action: &str,
        _payload: &Value,
    ) {
    }

    /// Called after every instance has seen the new settings.
    async fn did_receive_global_settings(&self, _runtime: &PluginRuntime, _settings: &Settings) {}

    async fn on_error(&self, _runtime: &PluginRuntime, error: &PluginError) {
        warn!("plugin error: {error}");
    }
}

/// A delegate that ignores everything except errors (which it logs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

#[async_trait]
impl PluginDelegate for NoopDelegate {}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_mismatch_message_names_context_and_event() {
        let err = PluginError::ControllerMismatch {
            context: "c1".to_string(),
            event: "dialRotate",
        };
        let msg = err.to_string();
        assert!(msg.contains("c1"));
        assert!(msg.contains("dialRotate"));
    }

    #[test]
    fn test_decode_error_converts_from_codec_error() {
        let err: PluginError = CodecError::UnknownEvent("x".to_string()).into();
        assert!(matches!(err, PluginError::Decode(CodecError::UnknownEvent(_))));
    }
}
