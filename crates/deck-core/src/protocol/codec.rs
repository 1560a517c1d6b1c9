//! JSON codec for inbound and outbound envelopes.
//!
//! # Two-phase decoding
//!
//! ```text
//! text ──► decode_header()      {event, context, action, device}
//!              │
//!              ▼  EventKind::from_wire(event)  (unknown name → error)
//!          decode_with_header() payload schema chosen by the kind
//! ```
//!
//! The header pass is cheap and never depends on the payload schema, so the
//! caller can use the context it names to look up per-instance facts (the
//! recorded [`Controller`]) before the second pass runs.
//!
//! # Overloaded event names
//!
//! `keyDown` / `keyUp` are also emitted for encoder presses by some hosts.
//! When the caller reports that the context is an [`Controller::Encoder`],
//! those names decode as [`InboundEvent::DialDown`] / [`InboundEvent::DialUp`].
//! A context with no recorded controller is treated as a keypad.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::controller::Controller;
use crate::domain::host_info::DeviceInfo;
use crate::protocol::commands::OutboundEnvelope;
use crate::protocol::events::{
    ApplicationPayload, DialPressPayload, DialRotatePayload, EnvelopeHeader, EventKind,
    GlobalSettingsPayload, InboundEnvelope, InboundEvent, InstancePayload, KeyPayload,
    TitleParametersPayload, TouchTapPayload,
};

/// Errors that can occur while decoding or encoding an envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not a JSON object with a string `event` field.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// The `event` field names an event this runtime does not know.
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),

    /// A field the event requires is absent.
    #[error("event {event:?} is missing required field {field:?}")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },

    /// The payload does not match the schema selected by the event name.
    #[error("malformed {event:?} payload: {source}")]
    MalformedPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An outbound payload could not be represented as JSON.
    #[error("failed to encode {event:?}: {source}")]
    Encode {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes only the schema-stable header of an inbound envelope.
///
/// # Errors
///
/// Returns [`CodecError::InvalidEnvelope`] if the text is not a JSON object
/// with a string `event` field.
pub fn decode_header(text: &str) -> Result<EnvelopeHeader, CodecError> {
    serde_json::from_str(text).map_err(CodecError::InvalidEnvelope)
}

/// Decodes the payload of an envelope whose header was already read.
///
/// `controller` is the controller recorded for `header.context`, if any.
///
/// # Errors
///
/// - [`CodecError::UnknownEvent`] for event names outside [`EventKind`].
/// - [`CodecError::MissingField`] when a per-instance event has no context.
/// - [`CodecError::MalformedPayload`] when the payload does not fit the
///   schema the event selects.
pub fn decode_with_header(
    header: &EnvelopeHeader,
    text: &str,
    controller: Option<Controller>,
) -> Result<InboundEnvelope, CodecError> {
    let kind = EventKind::from_wire(&header.event)
        .ok_or_else(|| CodecError::UnknownEvent(header.event.clone()))?;

    if kind.requires_context() && header.context.is_none() {
        return Err(CodecError::MissingField {
            event: kind.as_str(),
            field: "context",
        });
    }

    let is_encoder = controller == Some(Controller::Encoder);

    let event = match kind {
        EventKind::DidReceiveSettings => InboundEvent::DidReceiveSettings(payload(kind, text)?),
        EventKind::DidReceiveGlobalSettings => {
            let settings = optional_payload::<GlobalSettingsPayload>(kind, text)?;
            InboundEvent::DidReceiveGlobalSettings(settings)
        }
        EventKind::KeyDown if is_encoder => {
            InboundEvent::DialDown(payload::<DialPressPayload>(kind, text)?)
        }
        EventKind::KeyUp if is_encoder => {
            InboundEvent::DialUp(payload::<DialPressPayload>(kind, text)?)
        }
        EventKind::KeyDown => InboundEvent::KeyDown(payload::<KeyPayload>(kind, text)?),
        EventKind::KeyUp => InboundEvent::KeyUp(payload::<KeyPayload>(kind, text)?),
        EventKind::DialDown => InboundEvent::DialDown(payload(kind, text)?),
        EventKind::DialUp => InboundEvent::DialUp(payload(kind, text)?),
        EventKind::DialPress => InboundEvent::DialPress(payload(kind, text)?),
        EventKind::DialRotate => {
            InboundEvent::DialRotate(payload::<DialRotatePayload>(kind, text)?)
        }
        EventKind::TouchTap => InboundEvent::TouchTap(payload::<TouchTapPayload>(kind, text)?),
        EventKind::WillAppear => InboundEvent::WillAppear(payload::<InstancePayload>(kind, text)?),
        EventKind::WillDisappear => {
            InboundEvent::WillDisappear(payload::<InstancePayload>(kind, text)?)
        }
        EventKind::TitleParametersDidChange => {
            InboundEvent::TitleParametersDidChange(payload::<TitleParametersPayload>(kind, text)?)
        }
        EventKind::DeviceDidConnect => InboundEvent::DeviceDidConnect(device_info(kind, text)?),
        EventKind::DeviceDidDisconnect => InboundEvent::DeviceDidDisconnect,
        EventKind::ApplicationDidLaunch => {
            InboundEvent::ApplicationDidLaunch(payload::<ApplicationPayload>(kind, text)?)
        }
        EventKind::ApplicationDidTerminate => {
            InboundEvent::ApplicationDidTerminate(payload::<ApplicationPayload>(kind, text)?)
        }
        EventKind::SystemDidWakeUp => InboundEvent::SystemDidWakeUp,
        EventKind::PropertyInspectorDidAppear => InboundEvent::PropertyInspectorDidAppear,
        EventKind::PropertyInspectorDidDisappear => InboundEvent::PropertyInspectorDidDisappear,
        EventKind::SendToPlugin => {
            InboundEvent::SendToPlugin(optional_payload::<Value>(kind, text)?)
        }
    };

    Ok(InboundEnvelope {
        context: header.context.clone(),
        action: header.action.clone(),
        device: header.device.clone(),
        event,
    })
}

/// Decodes a complete inbound envelope in one call.
///
/// `controller_of` is consulted with the envelope's context (only when one
/// is present) to disambiguate overloaded event names.
///
/// # Examples
///
/// ```rust
/// use deck_core::{decode_envelope, InboundEvent};
///
/// let text = r#"{"event":"keyDown","context":"c1","payload":{"settings":{}}}"#;
/// let envelope = decode_envelope(text, |_| None).unwrap();
/// assert!(matches!(envelope.event, InboundEvent::KeyDown(_)));
/// assert_eq!(envelope.context(), Some("c1"));
/// ```
pub fn decode_envelope<F>(text: &str, controller_of: F) -> Result<InboundEnvelope, CodecError>
where
    F: FnOnce(&str) -> Option<Controller>,
{
    let header = decode_header(text)?;
    let controller = header.context.as_deref().and_then(controller_of);
    decode_with_header(&header, text, controller)
}

/// Envelope body with a required payload.
#[derive(Deserialize)]
struct Body<P> {
    payload: P,
}

/// Envelope body whose payload may be absent.
#[derive(Deserialize)]
struct OptionalBody<P> {
    #[serde(default)]
    payload: Option<P>,
}

/// `deviceDidConnect` carries `deviceInfo` at the top level; some hosts nest
/// it inside `payload` instead.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceBody {
    #[serde(default)]
    device_info: Option<DeviceInfo>,
    #[serde(default)]
    payload: Option<DevicePayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevicePayload {
    #[serde(default)]
    device_info: Option<DeviceInfo>,
}

fn payload<P: DeserializeOwned>(kind: EventKind, text: &str) -> Result<P, CodecError> {
    serde_json::from_str::<Body<P>>(text)
        .map(|body| body.payload)
        .map_err(|source| CodecError::MalformedPayload {
            event: kind.as_str(),
            source,
        })
}

fn optional_payload<P: DeserializeOwned + Default>(
    kind: EventKind,
    text: &str,
) -> Result<P, CodecError> {
    serde_json::from_str::<OptionalBody<P>>(text)
        .map(|body| body.payload.unwrap_or_default())
        .map_err(|source| CodecError::MalformedPayload {
            event: kind.as_str(),
            source,
        })
}

fn device_info(kind: EventKind, text: &str) -> Result<DeviceInfo, CodecError> {
    let body: DeviceBody =
        serde_json::from_str(text).map_err(|source| CodecError::MalformedPayload {
            event: kind.as_str(),
            source,
        })?;
    body.device_info
        .or_else(|| body.payload.and_then(|p| p.device_info))
        .ok_or(CodecError::MissingField {
            event: kind.as_str(),
            field: "deviceInfo",
        })
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialises an outbound envelope to a JSON text frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode_envelope(envelope: &OutboundEnvelope) -> Result<String, CodecError> {
    serde_json::to_string(envelope).map_err(|source| CodecError::Encode {
        event: envelope.event.clone(),
        source,
    })
}

/// Builds and serialises an envelope from loose parts.
///
/// Use this for payloads that are not covered by
/// [`crate::OutboundCommand`].
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if `payload` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn encode<P: Serialize + ?Sized>(
    event: &str,
    action: Option<&str>,
    context: Option<&str>,
    payload: Option<&P>,
) -> Result<String, CodecError> {
    let payload = payload
        .map(serde_json::to_value)
        .transpose()
        .map_err(|source| CodecError::Encode {
            event: event.to_string(),
            source,
        })?;
    encode_envelope(&OutboundEnvelope {
        event: event.to_string(),
        action: action.map(str::to_string),
        context: context.map(str::to_string),
        device: None,
        payload,
    })
}

/// Serialises the registration envelope that must open every session.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode_registration(register_event: &str, plugin_uuid: &str) -> Result<String, CodecError> {
    #[derive(Serialize)]
    struct Registration<'a> {
        event: &'a str,
        uuid: &'a str,
    }

    serde_json::to_string(&Registration {
        event: register_event,
        uuid: plugin_uuid,
    })
    .map_err(|source| CodecError::Encode {
        event: register_event.to_string(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
