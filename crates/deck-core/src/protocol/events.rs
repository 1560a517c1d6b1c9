//! Inbound event types: everything the host can push to the plugin.
//!
//! # Envelope shape
//!
//! Every inbound message is a JSON object with an `"event"` discriminant,
//! optional identifiers, and a payload whose shape depends on the event:
//!
//! ```json
//! {"event":"dialRotate","context":"c9","action":"com.acme.volume","device":"D2",
//!  "payload":{"settings":{},"coordinates":{"row":0,"column":2},"ticks":-3,"pressed":false}}
//! ```
//!
//! Decoding is split in two (see [`crate::protocol::codec`]): the
//! [`EnvelopeHeader`] is read first, and the [`EventKind`] it names selects
//! which payload struct below is used for the second pass.
//!
//! Unknown fields inside a payload are ignored by serde's default behaviour,
//! so newer hosts that add fields keep working.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::controller::{Controller, Coordinates};
use crate::domain::host_info::DeviceInfo;

/// Instance-local and global settings documents are opaque JSON objects.
pub type Settings = Map<String, Value>;

// ── Header ────────────────────────────────────────────────────────────────────

/// The cheap, schema-stable part of every inbound envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvelopeHeader {
    pub event: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

// ── Event names ───────────────────────────────────────────────────────────────

/// Every inbound event name the runtime understands.
///
/// There is deliberately no catch-all variant: an event name outside this
/// list is a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DidReceiveSettings,
    DidReceiveGlobalSettings,
    KeyDown,
    KeyUp,
    DialDown,
    DialUp,
    /// Deprecated dial press event, version-gated by the router.
    DialPress,
    DialRotate,
    TouchTap,
    WillAppear,
    WillDisappear,
    TitleParametersDidChange,
    DeviceDidConnect,
    DeviceDidDisconnect,
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    SystemDidWakeUp,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    SendToPlugin,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 20] = [
        EventKind::DidReceiveSettings,
        EventKind::DidReceiveGlobalSettings,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::DialDown,
        EventKind::DialUp,
        EventKind::DialPress,
        EventKind::DialRotate,
        EventKind::TouchTap,
        EventKind::WillAppear,
        EventKind::WillDisappear,
        EventKind::TitleParametersDidChange,
        EventKind::DeviceDidConnect,
        EventKind::DeviceDidDisconnect,
        EventKind::ApplicationDidLaunch,
        EventKind::ApplicationDidTerminate,
        EventKind::SystemDidWakeUp,
        EventKind::PropertyInspectorDidAppear,
        EventKind::PropertyInspectorDidDisappear,
        EventKind::SendToPlugin,
    ];

    /// Parses a wire event name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns the wire event name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::DidReceiveSettings => "didReceiveSettings",
            EventKind::DidReceiveGlobalSettings => "didReceiveGlobalSettings",
            EventKind::KeyDown => "keyDown",
            EventKind::KeyUp => "keyUp",
            EventKind::DialDown => "dialDown",
            EventKind::DialUp => "dialUp",
            EventKind::DialPress => "dialPress",
            EventKind::DialRotate => "dialRotate",
            EventKind::TouchTap => "touchTap",
            EventKind::WillAppear => "willAppear",
            EventKind::WillDisappear => "willDisappear",
            EventKind::TitleParametersDidChange => "titleParametersDidChange",
            EventKind::DeviceDidConnect => "deviceDidConnect",
            EventKind::DeviceDidDisconnect => "deviceDidDisconnect",
            EventKind::ApplicationDidLaunch => "applicationDidLaunch",
            EventKind::ApplicationDidTerminate => "applicationDidTerminate",
            EventKind::SystemDidWakeUp => "systemDidWakeUp",
            EventKind::PropertyInspectorDidAppear => "propertyInspectorDidAppear",
            EventKind::PropertyInspectorDidDisappear => "propertyInspectorDidDisappear",
            EventKind::SendToPlugin => "sendToPlugin",
        }
    }

    /// Returns `true` for events that address one placed instance and
    /// therefore must carry a `context`.
    pub fn requires_context(self) -> bool {
        matches!(
            self,
            EventKind::DidReceiveSettings
                | EventKind::KeyDown
                | EventKind::KeyUp
                | EventKind::DialDown
                | EventKind::DialUp
                | EventKind::DialPress
                | EventKind::DialRotate
                | EventKind::TouchTap
                | EventKind::WillAppear
                | EventKind::WillDisappear
                | EventKind::TitleParametersDidChange
        )
    }

    /// Returns `true` for events that only make sense on an encoder.
    pub fn is_encoder_only(self) -> bool {
        matches!(
            self,
            EventKind::DialDown
                | EventKind::DialUp
                | EventKind::DialPress
                | EventKind::DialRotate
                | EventKind::TouchTap
        )
    }
}

// ── Payloads ──────────────────────────────────────────────────────────────────

/// Payload of `keyDown` / `keyUp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Current state index for multi-state actions.
    #[serde(default)]
    pub state: Option<u32>,
    /// State the user picked inside a multi-action, if any.
    #[serde(default)]
    pub user_desired_state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `willAppear`, `willDisappear` and `didReceiveSettings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancePayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Reported by hosts that support encoders; absent on older hosts.
    #[serde(default)]
    pub controller: Option<Controller>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `dialDown`, `dialUp` and the legacy `dialPress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialPressPayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Only present on the legacy `dialPress`: `true` on press, `false` on
    /// release.
    #[serde(default)]
    pub pressed: Option<bool>,
}

/// Payload of `dialRotate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialRotatePayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Signed detent count; negative is counter-clockwise.
    pub ticks: i32,
    /// Whether the dial was held down while rotating.
    #[serde(default)]
    pub pressed: bool,
}

/// Payload of `touchTap`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTapPayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// `true` when the host classified the touch as a long hold.
    #[serde(default)]
    pub hold: bool,
    /// Tap position within the touch-strip segment, `[x, y]` in pixels.
    #[serde(default)]
    pub tap_pos: [i32; 2],
}

/// Payload of `didReceiveGlobalSettings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettingsPayload {
    #[serde(default)]
    pub settings: Settings,
}

/// Font and layout parameters the user chose for a key title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: String,
    pub title_color: String,
}

/// Payload of `titleParametersDidChange`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParametersPayload {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_parameters: TitleParameters,
}

/// Payload of `applicationDidLaunch` / `applicationDidTerminate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPayload {
    /// Bundle identifier or executable name of the monitored application.
    pub application: String,
}

// ── Decoded envelope ──────────────────────────────────────────────────────────

/// A fully decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    DidReceiveSettings(InstancePayload),
    DidReceiveGlobalSettings(GlobalSettingsPayload),
    KeyDown(KeyPayload),
    KeyUp(KeyPayload),
    DialDown(DialPressPayload),
    DialUp(DialPressPayload),
    DialPress(DialPressPayload),
    DialRotate(DialRotatePayload),
    TouchTap(TouchTapPayload),
    WillAppear(InstancePayload),
    WillDisappear(InstancePayload),
    TitleParametersDidChange(TitleParametersPayload),
    DeviceDidConnect(DeviceInfo),
    DeviceDidDisconnect,
    ApplicationDidLaunch(ApplicationPayload),
    ApplicationDidTerminate(ApplicationPayload),
    SystemDidWakeUp,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    SendToPlugin(Value),
}

impl InboundEvent {
    /// Returns the kind of this event.
    ///
    /// Note that a `keyDown` received for an encoder context decodes as
    /// [`InboundEvent::DialDown`], so the kind reflects the *decoded* meaning
    /// rather than the raw wire name.
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::DidReceiveSettings(_) => EventKind::DidReceiveSettings,
            InboundEvent::DidReceiveGlobalSettings(_) => EventKind::DidReceiveGlobalSettings,
            InboundEvent::KeyDown(_) => EventKind::KeyDown,
            InboundEvent::KeyUp(_) => EventKind::KeyUp,
            InboundEvent::DialDown(_) => EventKind::DialDown,
            InboundEvent::DialUp(_) => EventKind::DialUp,
            InboundEvent::DialPress(_) => EventKind::DialPress,
            InboundEvent::DialRotate(_) => EventKind::DialRotate,
            InboundEvent::TouchTap(_) => EventKind::TouchTap,
            InboundEvent::WillAppear(_) => EventKind::WillAppear,
            InboundEvent::WillDisappear(_) => EventKind::WillDisappear,
            InboundEvent::TitleParametersDidChange(_) => EventKind::TitleParametersDidChange,
            InboundEvent::DeviceDidConnect(_) => EventKind::DeviceDidConnect,
            InboundEvent::DeviceDidDisconnect => EventKind::DeviceDidDisconnect,
            InboundEvent::ApplicationDidLaunch(_) => EventKind::ApplicationDidLaunch,
            InboundEvent::ApplicationDidTerminate(_) => EventKind::ApplicationDidTerminate,
            InboundEvent::SystemDidWakeUp => EventKind::SystemDidWakeUp,
            InboundEvent::PropertyInspectorDidAppear => EventKind::PropertyInspectorDidAppear,
            InboundEvent::PropertyInspectorDidDisappear => {
                EventKind::PropertyInspectorDidDisappear
            }
            InboundEvent::SendToPlugin(_) => EventKind::SendToPlugin,
        }
    }

    /// Returns the grid position carried by the payload, if any.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            InboundEvent::DidReceiveSettings(p)
            | InboundEvent::WillAppear(p)
            | InboundEvent::WillDisappear(p) => p.coordinates,
            InboundEvent::KeyDown(p) | InboundEvent::KeyUp(p) => p.coordinates,
            InboundEvent::DialDown(p) | InboundEvent::DialUp(p) | InboundEvent::DialPress(p) => {
                p.coordinates
            }
            InboundEvent::DialRotate(p) => p.coordinates,
            InboundEvent::TouchTap(p) => p.coordinates,
            InboundEvent::TitleParametersDidChange(p) => p.coordinates,
            _ => None,
        }
    }
}

/// A decoded inbound envelope: identifiers plus the typed event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEnvelope {
    /// Opaque identifier of the placed instance this event addresses.
    pub context: Option<String>,
    /// Action type identifier, e.g. `com.acme.counter.increment`.
    pub action: Option<String>,
    /// Identifier of the device the event originated on.
    pub device: Option<String>,
    pub event: InboundEvent,
}

impl InboundEnvelope {
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
