//! Outbound commands: everything the plugin can ask the host to do.
//!
//! Commands are built as typed [`OutboundCommand`] values and converted into
//! an [`OutboundEnvelope`] addressed at a context (an instance, or the plugin
//! UUID for plugin-wide commands such as `setGlobalSettings`):
//!
//! ```json
//! {"event":"setTitle","context":"c1","payload":{"title":"42","target":0}}
//! ```

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::protocol::events::Settings;

/// Which display a title or image update applies to.
///
/// Serialised as the host's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Hardware and software displays (0).
    #[default]
    Both,
    /// The physical device only (1).
    Hardware,
    /// The on-screen canvas only (2).
    Software,
}

impl Target {
    pub fn code(self) -> u8 {
        match self {
            Target::Both => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Descriptions shown by the host next to an encoder's interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_touch: Option<String>,
}

/// A command the plugin sends to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCommand {
    /// Persist an instance's settings.
    SetSettings(Settings),
    /// Ask the host to echo an instance's settings via `didReceiveSettings`.
    GetSettings,
    /// Persist the plugin-wide settings document (full snapshot).
    SetGlobalSettings(Settings),
    /// Ask the host to push `didReceiveGlobalSettings`.
    GetGlobalSettings,
    OpenUrl {
        url: String,
    },
    /// Append a line to the host's plugin log.
    LogMessage {
        message: String,
    },
    SetTitle {
        title: Option<String>,
        target: Option<Target>,
        state: Option<u32>,
    },
    /// `image` is a base64 data URI (`data:image/png;base64,...`) or an SVG
    /// data URI; `None` restores the manifest image.
    SetImage {
        image: Option<String>,
        target: Option<Target>,
        state: Option<u32>,
    },
    /// Update touch-display layout items; any JSON object keyed by item.
    SetFeedback(Value),
    SetFeedbackLayout {
        layout: String,
    },
    SetTriggerDescription(TriggerDescription),
    ShowAlert,
    ShowOk,
    SetState {
        state: u32,
    },
    SwitchToProfile {
        profile: String,
    },
    SendToPropertyInspector(Value),
    SendToPlugin(Value),
}

impl OutboundCommand {
    /// Returns the wire event name of this command.
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundCommand::SetSettings(_) => "setSettings",
            OutboundCommand::GetSettings => "getSettings",
            OutboundCommand::SetGlobalSettings(_) => "setGlobalSettings",
            OutboundCommand::GetGlobalSettings => "getGlobalSettings",
            OutboundCommand::OpenUrl { .. } => "openUrl",
            OutboundCommand::LogMessage { .. } => "logMessage",
            OutboundCommand::SetTitle { .. } => "setTitle",
            OutboundCommand::SetImage { .. } => "setImage",
            OutboundCommand::SetFeedback(_) => "setFeedback",
            OutboundCommand::SetFeedbackLayout { .. } => "setFeedbackLayout",
            OutboundCommand::SetTriggerDescription(_) => "setTriggerDescription",
            OutboundCommand::ShowAlert => "showAlert",
            OutboundCommand::ShowOk => "showOk",
            OutboundCommand::SetState { .. } => "setState",
            OutboundCommand::SwitchToProfile { .. } => "switchToProfile",
            OutboundCommand::SendToPropertyInspector(_) => "sendToPropertyInspector",
            OutboundCommand::SendToPlugin(_) => "sendToPlugin",
        }
    }

    /// Converts the command into the payload value sent on the wire, or
    /// `None` for commands that carry no payload.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            OutboundCommand::SetSettings(settings)
            | OutboundCommand::SetGlobalSettings(settings) => Some(Value::Object(settings)),
            OutboundCommand::GetSettings
            | OutboundCommand::GetGlobalSettings
            | OutboundCommand::ShowAlert
            | OutboundCommand::ShowOk => None,
            OutboundCommand::OpenUrl { url } => Some(json!({ "url": url })),
            OutboundCommand::LogMessage { message } => Some(json!({ "message": message })),
            OutboundCommand::SetTitle {
                title,
                target,
                state,
            } => Some(display_payload("title", title, target, state)),
            OutboundCommand::SetImage {
                image,
                target,
                state,
            } => Some(display_payload("image", image, target, state)),
            OutboundCommand::SetFeedback(value)
            | OutboundCommand::SendToPropertyInspector(value)
            | OutboundCommand::SendToPlugin(value) => Some(value),
            OutboundCommand::SetFeedbackLayout { layout } => Some(json!({ "layout": layout })),
            OutboundCommand::SetTriggerDescription(description) => {
                // A struct of optional strings always serialises.
                Some(serde_json::to_value(description).unwrap_or(Value::Null))
            }
            OutboundCommand::SetState { state } => Some(json!({ "state": state })),
            OutboundCommand::SwitchToProfile { profile } => Some(json!({ "profile": profile })),
        }
    }

    /// Wraps the command in an envelope addressed at `context`.
    pub fn into_envelope(self, context: impl Into<String>) -> OutboundEnvelope {
        let event = self.event_name();
        OutboundEnvelope {
            event: event.to_string(),
            action: None,
            context: Some(context.into()),
            device: None,
            payload: self.into_payload(),
        }
    }
}

/// Builds the `{title|image?, target?, state?}` object shared by `setTitle`
/// and `setImage`, omitting absent fields.
fn display_payload(
    field: &str,
    value: Option<String>,
    target: Option<Target>,
    state: Option<u32>,
) -> Value {
    let mut map = Map::new();
    if let Some(value) = value {
        map.insert(field.to_string(), Value::String(value));
    }
    if let Some(target) = target {
        map.insert("target".to_string(), Value::from(target.code()));
    }
    if let Some(state) = state {
        map.insert("state".to_string(), Value::from(state));
    }
    Value::Object(map)
}

/// The outbound wire envelope.
///
/// Absent identifiers and payloads are omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEnvelope {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl OutboundEnvelope {
    /// Adds the action identifier (required by `sendToPropertyInspector`).
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Adds the device identifier (required by `switchToProfile`).
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_title_omits_absent_fields() {
        // Arrange
        let cmd = OutboundCommand::SetTitle {
            title: Some("42".to_string()),
            target: None,
            state: None,
        };

        // Act
        let envelope = cmd.into_envelope("c1");

        // Assert
        assert_eq!(envelope.event, "setTitle");
        assert_eq!(envelope.context.as_deref(), Some("c1"));
        assert_eq!(envelope.payload, Some(json!({ "title": "42" })));
    }

    #[test]
    fn test_set_image_serialises_target_as_number() {
        let cmd = OutboundCommand::SetImage {
            image: Some("data:image/png;base64,AAAA".to_string()),
            target: Some(Target::Software),
            state: Some(1),
        };
        let payload = cmd.into_payload().unwrap();
        assert_eq!(
            payload,
            json!({ "image": "data:image/png;base64,AAAA", "target": 2, "state": 1 })
        );
    }

    #[test]
    fn test_commands_without_payload() {
        assert_eq!(OutboundCommand::ShowOk.into_payload(), None);
        assert_eq!(OutboundCommand::ShowAlert.into_payload(), None);
        assert_eq!(OutboundCommand::GetGlobalSettings.into_payload(), None);
        assert_eq!(OutboundCommand::GetSettings.event_name(), "getSettings");
    }

    #[test]
    fn test_set_global_settings_payload_is_the_snapshot() {
        let mut settings = Settings::new();
        settings.insert("count".to_string(), json!(3));
        let payload = OutboundCommand::SetGlobalSettings(settings).into_payload();
        assert_eq!(payload, Some(json!({ "count": 3 })));
    }

    #[test]
    fn test_trigger_description_uses_camel_case() {
        let cmd = OutboundCommand::SetTriggerDescription(TriggerDescription {
            long_touch: Some("Reset".to_string()),
            rotate: Some("Adjust".to_string()),
            ..Default::default()
        });
        assert_eq!(
            cmd.into_payload(),
            Some(json!({ "rotate": "Adjust", "longTouch": "Reset" }))
        );
    }

    #[test]
    fn test_envelope_builders_set_identifiers() {
        let envelope = OutboundCommand::SwitchToProfile {
            profile: "Gaming".to_string(),
        }
        .into_envelope("com.acme.counter")
        .with_device("D1");
        assert_eq!(envelope.device.as_deref(), Some("D1"));
        assert_eq!(envelope.payload, Some(json!({ "profile": "Gaming" })));
    }
}
