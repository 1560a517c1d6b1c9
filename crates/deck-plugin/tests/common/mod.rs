//! Shared fixtures for the runtime integration tests.
//!
//! Every test builds a [`PluginRuntime`] whose actions and delegate write a
//! line to a shared [`Journal`] for each callback, then asserts on the
//! journal.  Handler tasks are awaited through the handle returned by
//! `accept_frame`, so no test depends on scheduling luck.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use deck_plugin::{
    Action, ActionCatalog, ActionContext, ActionType, Controller, DeviceInfo, DialPressPayload,
    DialRotatePayload, HostInfo, InstancePayload, InstanceSeed, KeyPayload, Outbound,
    OutboundFrame, PluginConfig, PluginDelegate, PluginError, PluginRuntime, Settings,
    SettingKey, SettingsSchema, TouchTapPayload,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

pub const KEY_ACTION: &str = "com.acme.counter.increment";
pub const DIAL_ACTION: &str = "com.acme.volume.dial";
pub const PLUGIN_UUID: &str = "com.acme.counter";

// ── Journal ───────────────────────────────────────────────────────────────────

/// Append-only record of callbacks, shared by actions and the delegate.
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ── Recording action ──────────────────────────────────────────────────────────

pub struct RecordingAction {
    journal: Arc<Journal>,
}

#[async_trait]
impl Action for RecordingAction {
    async fn will_appear(&self, cx: &ActionContext, _event: &InstancePayload) {
        self.journal.push(format!("will_appear:{}:{}", cx.context, cx.controller));
    }

    async fn will_disappear(&self, cx: &ActionContext, _event: &InstancePayload) {
        self.journal.push(format!("will_disappear:{}", cx.context));
    }

    async fn did_receive_settings(&self, cx: &ActionContext, event: &InstancePayload) {
        let settings = Value::Object(event.settings.clone());
        self.journal
            .push(format!("did_receive_settings:{}:{settings}", cx.context));
    }

    async fn did_receive_global_settings(&self, cx: &ActionContext, settings: &Settings) {
        self.journal.push(format!(
            "did_receive_global_settings:{}:{}",
            cx.context,
            Value::Object(settings.clone())
        ));
    }

    async fn key_down(&self, cx: &ActionContext, _event: &KeyPayload) {
        let at = cx.coordinates.map(|c| c.to_string()).unwrap_or_default();
        self.journal.push(format!("key_down:{}{}", cx.context, at));
    }

    async fn key_up(&self, cx: &ActionContext, _event: &KeyPayload) {
        self.journal.push(format!("key_up:{}", cx.context));
    }

    async fn long_key_press(&self, cx: &ActionContext, _event: &KeyPayload) {
        self.journal.push(format!("long_key_press:{}", cx.context));
    }

    async fn dial_down(&self, cx: &ActionContext, _event: &DialPressPayload) {
        self.journal.push(format!("dial_down:{}", cx.context));
    }

    async fn dial_up(&self, cx: &ActionContext, _event: &DialPressPayload) {
        self.journal.push(format!("dial_up:{}", cx.context));
    }

    async fn long_dial_press(&self, cx: &ActionContext, _event: &DialPressPayload) {
        self.journal.push(format!("long_dial_press:{}", cx.context));
    }

    async fn dial_rotate(&self, cx: &ActionContext, event: &DialRotatePayload) {
        self.journal.push(format!("dial_rotate:{}:{}", cx.context, event.ticks));
    }

    async fn touch_tap(&self, cx: &ActionContext, _event: &TouchTapPayload) {
        self.journal.push(format!("touch_tap:{}", cx.context));
    }

    async fn long_touch_press(&self, cx: &ActionContext, _event: &TouchTapPayload) {
        self.journal.push(format!("long_touch_press:{}", cx.context));
    }

    async fn property_inspector_did_appear(&self, cx: &ActionContext) {
        self.journal.push(format!("pi_appear:{}", cx.context));
    }

    async fn send_to_plugin(&self, cx: &ActionContext, payload: &Value) {
        self.journal.push(format!("send_to_plugin:{}:{}", cx.context, payload));
    }
}

// ── Recording delegate ────────────────────────────────────────────────────────

pub struct RecordingDelegate {
    journal: Arc<Journal>,
}

#[async_trait]
impl PluginDelegate for RecordingDelegate {
    async fn device_did_connect(&self, _runtime: &PluginRuntime, device: &str, info: &DeviceInfo) {
        self.journal
            .push(format!("delegate.device_did_connect:{}:{}", device, info.name));
    }

    async fn device_did_disconnect(&self, _runtime: &PluginRuntime, device: &str) {
        self.journal
            .push(format!("delegate.device_did_disconnect:{device}"));
    }

    async fn application_did_launch(&self, _runtime: &PluginRuntime, application: &str) {
        self.journal
            .push(format!("delegate.application_did_launch:{application}"));
    }

    async fn system_did_wake_up(&self, _runtime: &PluginRuntime) {
        self.journal.push("delegate.system_did_wake_up");
    }

    async fn property_inspector_did_appear(
        &self,
        _runtime: &PluginRuntime,
        context: &str,
        _action: &str,
    ) {
        self.journal.push(format!("delegate.pi_appear:{context}"));
    }

    async fn send_to_plugin(
        &self,
        _runtime: &PluginRuntime,
        context: &str,
        _action: &str,
        payload: &Value,
    ) {
        self.journal
            .push(format!("delegate.send_to_plugin:{context}:{payload}"));
    }

    async fn did_receive_global_settings(&self, _runtime: &PluginRuntime, settings: &Settings) {
        self.journal.push(format!(
            "delegate.did_receive_global_settings:{}",
            Value::Object(settings.clone())
        ));
    }

    async fn on_error(&self, _runtime: &PluginRuntime, error: &PluginError) {
        let kind = match error {
            PluginError::Decode(_) => "decode",
            PluginError::ControllerMismatch { .. } => "controller_mismatch",
        };
        self.journal.push(format!("error:{kind}"));
    }
}

// ── Runtime construction ──────────────────────────────────────────────────────

pub fn catalog(journal: &Arc<Journal>) -> ActionCatalog {
    let key_journal = Arc::clone(journal);
    let dial_journal = Arc::clone(journal);
    ActionCatalog::new(vec![
        ActionType::new(KEY_ACTION, "Increment", move |_seed: &InstanceSeed| -> Arc<dyn Action> {
            Arc::new(RecordingAction {
                journal: Arc::clone(&key_journal),
            })
        }),
        ActionType::new(DIAL_ACTION, "Volume", move |_seed: &InstanceSeed| -> Arc<dyn Action> {
            Arc::new(RecordingAction {
                journal: Arc::clone(&dial_journal),
            })
        })
        .controllers(&[Controller::Encoder]),
    ])
    .unwrap()
}

pub struct Harness {
    pub runtime: PluginRuntime,
    pub outbound: mpsc::Receiver<OutboundFrame>,
    pub journal: Arc<Journal>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(HostInfo::default(), PluginConfig::default())
    }

    pub fn with_host_version(version: &str) -> Self {
        let mut info = HostInfo::default();
        info.application.version = version.to_string();
        Self::with(info, PluginConfig::default())
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        let config = PluginConfig {
            long_press_threshold: threshold,
            ..PluginConfig::default()
        };
        Self::with(HostInfo::default(), config)
    }

    pub fn with(info: HostInfo, config: PluginConfig) -> Self {
        let journal = Arc::new(Journal::default());
        let (outbound, rx) = Outbound::channel(64);
        let runtime = PluginRuntime::new(
            PLUGIN_UUID,
            info,
            config,
            catalog(&journal),
            SettingsSchema::new().with(SettingKey::integer("count", 0)),
            Arc::new(RecordingDelegate {
                journal: Arc::clone(&journal),
            }),
            outbound,
        );
        Self {
            runtime,
            outbound: rx,
            journal,
        }
    }

    /// Feeds one frame and waits for its handler task, if any.
    pub async fn feed(&self, text: &str) {
        if let Some(handle) = self.runtime.accept_frame(text).await {
            handle.await.unwrap();
        }
    }

    /// Drains every queued outbound frame as JSON.
    pub fn sent(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(serde_json::from_str(&frame.text).unwrap());
        }
        frames
    }

    /// Entries excluding delegate callbacks.
    pub fn action_calls(&self) -> Vec<String> {
        self.journal
            .entries()
            .into_iter()
            .filter(|e| !e.starts_with("delegate.") && !e.starts_with("error:"))
            .collect()
    }
}

// ── Envelope builders ─────────────────────────────────────────────────────────

pub fn envelope(event: &str, context: &str, action: &str, payload: Value) -> String {
    json!({
        "event": event,
        "context": context,
        "action": action,
        "device": "D1",
        "payload": payload,
    })
    .to_string()
}

pub fn will_appear(context: &str, action: &str, controller: Option<&str>) -> String {
    let mut payload = json!({
        "settings": {},
        "coordinates": {"row": 0, "column": 1},
        "isInMultiAction": false,
    });
    if let Some(controller) = controller {
        payload["controller"] = json!(controller);
    }
    envelope("willAppear", context, action, payload)
}

pub fn key(event: &str, context: &str) -> String {
    envelope(
        event,
        context,
        KEY_ACTION,
        json!({"settings": {}, "coordinates": {"row": 0, "column": 1}, "isInMultiAction": false}),
    )
}

pub fn dial(event: &str, context: &str, extra: Value) -> String {
    let mut payload = json!({"settings": {}, "coordinates": {"row": 0, "column": 0}});
    if let (Some(target), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    envelope(event, context, DIAL_ACTION, payload)
}
