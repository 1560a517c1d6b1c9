//! The per-control capability trait and the handle passed to its methods.
//!
//! # For beginners
//!
//! A plugin implements [`Action`] once per kind of control.  Every method
//! has an empty default body, so an implementation only overrides the events
//! it cares about:
//!
//! ```rust
//! use async_trait::async_trait;
//! use deck_plugin::{Action, ActionContext, KeyPayload};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Action for Hello {
//!     async fn key_up(&self, cx: &ActionContext, _event: &KeyPayload) {
//!         cx.set_title("Hello").await;
//!     }
//! }
//! ```
//!
//! Each inbound event runs on its own task, so handlers for different
//! contexts (and different events of the same context) may run concurrently.
//! Instances that keep state must synchronise it themselves.

use async_trait::async_trait;
use deck_core::protocol::{
    DialPressPayload, DialRotatePayload, InstancePayload, KeyPayload, TitleParametersPayload,
    TouchTapPayload,
};
use deck_core::{Controller, Coordinates, OutboundCommand, Settings, Target, TriggerDescription};
use serde::Serialize;
use serde_json::Value;

use crate::application::runtime::PluginRuntime;

/// Event handlers for one placed control.
#[async_trait]
pub trait Action: Send + Sync {
    /// The control became visible.  Also called when the host repeats
    /// `willAppear` for a context that already has an instance.
    async fn will_appear(&self, _cx: &ActionContext, _event: &InstancePayload) {}

    /// The control is no longer visible.  The instance has already been
    /// dropped from the registry when this runs.
    async fn will_disappear(&self, _cx: &ActionContext, _event: &InstancePayload) {}

    async fn did_receive_settings(&self, _cx: &ActionContext, _event: &InstancePayload) {}

    /// The plugin-wide settings changed, locally or on the host.
    async fn did_receive_global_settings(&self, _cx: &ActionContext, _settings: &Settings) {}

    async fn key_down(&self, _cx: &ActionContext, _event: &KeyPayload) {}

    /// Short press.  Not called when [`long_key_press`](Self::long_key_press)
    /// already ran for this press.
    async fn key_up(&self, _cx: &ActionContext, _event: &KeyPayload) {}

    /// The key stayed down past the long-press threshold.  `event` is the
    /// payload of the `keyDown` that started the press.
    async fn long_key_press(&self, _cx: &ActionContext, _event: &KeyPayload) {}

    async fn dial_down(&self, _cx: &ActionContext, _event: &DialPressPayload) {}

    /// Short dial press; suppressed after [`long_dial_press`](Self::long_dial_press).
    async fn dial_up(&self, _cx: &ActionContext, _event: &DialPressPayload) {}

    async fn long_dial_press(&self, _cx: &ActionContext, _event: &DialPressPayload) {}

    async fn dial_rotate(&self, _cx: &ActionContext, _event: &DialRotatePayload) {}

    async fn touch_tap(&self, _cx: &ActionContext, _event: &TouchTapPayload) {}

    /// A touch the host classified as a hold.
    async fn long_touch_press(&self, _cx: &ActionContext, _event: &TouchTapPayload) {}

    async fn title_parameters_did_change(
        &self,
        _cx: &ActionContext,
        _event: &TitleParametersPayload,
    ) {
    }

    async fn property_inspector_did_appear(&self, _cx: &ActionContext) {}

    async fn property_inspector_did_disappear(&self, _cx: &ActionContext) {}

    /// A message from this control's property inspector.
    async fn send_to_plugin(&self, _cx: &ActionContext, _payload: &Value) {}
}

/// Identity of the instance an event is for, plus a runtime handle for
/// sending commands back to the host.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub context: String,
    pub action: String,
    pub device: String,
    pub coordinates: Option<Coordinates>,
    pub controller: Controller,
    runtime: PluginRuntime,
}

impl ActionContext {
    pub fn new(
        context: impl Into<String>,
        action: impl Into<String>,
        device: impl Into<String>,
        coordinates: Option<Coordinates>,
        controller: Controller,
        runtime: PluginRuntime,
    ) -> Self {
        Self {
            context: context.into(),
            action: action.into(),
            device: device.into(),
            coordinates,
            controller,
            runtime,
        }
    }

    pub fn runtime(&self) -> &PluginRuntime {
        &self.runtime
    }

    async fn send(&self, command: OutboundCommand) {
        self.runtime.send_command(&self.context, command).await;
    }

    // ── Display ───────────────────────────────────────────────────────────────

    /// Sets the title on both hardware and software displays.
    pub async fn set_title(&self, title: impl Into<String>) {
        self.set_title_with(Some(title.into()), None, None).await;
    }

    /// `None` for `title` restores the user's title.
    pub async fn set_title_with(
        &self,
        title: Option<String>,
        target: Option<Target>,
        state: Option<u32>,
    ) {
        self.send(OutboundCommand::SetTitle {
            title,
            target,
            state,
        })
        .await;
    }

    /// `image` is a data URI; `None` restores the manifest image.
    pub async fn set_image(&self, image: Option<String>) {
        self.send(OutboundCommand::SetImage {
            image,
            target: None,
            state: None,
        })
        .await;
    }

    pub async fn set_state(&self, state: u32) {
        self.send(OutboundCommand::SetState { state }).await;
    }

    pub async fn show_ok(&self) {
        self.send(OutboundCommand::ShowOk).await;
    }

    pub async fn show_alert(&self) {
        self.send(OutboundCommand::ShowAlert).await;
    }

    // ── Encoder touch display ─────────────────────────────────────────────────

    /// Updates touch-display items.  A payload that cannot be serialised to a
    /// JSON object is logged and dropped.
    pub async fn set_feedback<T: Serialize + ?Sized>(&self, feedback: &T) {
        self.runtime.set_feedback(&self.context, feedback).await;
    }

    pub async fn set_feedback_layout(&self, layout: impl Into<String>) {
        self.send(OutboundCommand::SetFeedbackLayout {
            layout: layout.into(),
        })
        .await;
    }

    pub async fn set_trigger_description(&self, description: TriggerDescription) {
        self.send(OutboundCommand::SetTriggerDescription(description))
            .await;
    }

    // ── Settings and property inspector ───────────────────────────────────────

    pub async fn set_settings(&self, settings: Settings) {
        self.send(OutboundCommand::SetSettings(settings)).await;
    }

    /// Asks the host to echo this instance's settings via `didReceiveSettings`.
    pub async fn get_settings(&self) {
        self.send(OutboundCommand::GetSettings).await;
    }

    pub async fn send_to_property_inspector(&self, payload: Value) {
        self.runtime
            .send_to_property_inspector(&self.context, &self.action, payload)
            .await;
    }
}
