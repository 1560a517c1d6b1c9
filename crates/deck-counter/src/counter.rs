//! The counter action and the plugin delegate.
//!
//! Every placed counter shows the same number: the count lives in the
//! plugin-wide settings document under [`COUNT_KEY`], so the host persists it
//! and every instance is told when it changes.
//!
//! | Gesture                    | Effect                          |
//! |----------------------------|---------------------------------|
//! | key press / dial press     | `count += step`                 |
//! | long key or dial press     | `count = 0`, then a checkmark   |
//! | dial rotation              | `count += ticks`                |
//!
//! `step` is a per-instance setting (default 1) edited in the property
//! inspector.

use std::sync::Arc;

use async_trait::async_trait;
use deck_plugin::{
    Action, ActionCatalog, ActionContext, ActionType, CatalogError, Controller, DeviceInfo,
    DialPressPayload, DialRotatePayload, InstancePayload, InstanceSeed, KeyPayload,
    PluginDelegate, PluginRuntime, Settings, SettingKey, SettingsSchema,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Identifier of the counter action in the plugin manifest.
pub const COUNTER_ACTION: &str = "com.acme.counter.increment";

/// Global settings key holding the shared count.
pub const COUNT_KEY: &str = "count";

/// Builds the plugin's action catalog.
pub fn catalog() -> Result<ActionCatalog, CatalogError> {
    ActionCatalog::new(vec![ActionType::new(
        COUNTER_ACTION,
        "Counter",
        |_seed: &InstanceSeed| -> Arc<dyn Action> { Arc::new(CounterAction) },
    )
    .icon("imgs/actions/counter/icon")
    .controllers(&[Controller::Keypad, Controller::Encoder])])
}

/// The global settings the plugin declares.
pub fn schema() -> SettingsSchema {
    SettingsSchema::new().with(SettingKey::integer(COUNT_KEY, 0))
}

fn current_count(runtime: &PluginRuntime) -> i64 {
    runtime.global_setting(COUNT_KEY).as_i64().unwrap_or(0)
}

/// `step` from the instance settings, falling back to 1.
fn step(settings: &Settings) -> i64 {
    settings.get("step").and_then(Value::as_i64).unwrap_or(1)
}

pub struct CounterAction;

impl CounterAction {
    /// Applies `change` to the shared count in one atomic step, publishes
    /// the result and updates this instance's title.  Other instances pick
    /// the change up through the global settings fan-out.
    async fn store(&self, cx: &ActionContext, change: impl FnOnce(i64) -> i64) {
        let updated = cx.runtime().update_global_setting(COUNT_KEY, |current| {
            Value::from(change(current.as_i64().unwrap_or(0)))
        });
        match updated {
            Ok((count, _publish)) => {
                debug!("{}: count is now {count}", cx.context);
                cx.set_title(count.to_string()).await;
            }
            Err(e) => warn!("{}: could not store count: {e}", cx.context),
        }
    }

    async fn add(&self, cx: &ActionContext, delta: i64) {
        self.store(cx, |count| count.saturating_add(delta)).await;
    }

    async fn reset(&self, cx: &ActionContext) {
        self.store(cx, |_| 0).await;
        cx.show_ok().await;
    }
}

#[async_trait]
impl Action for CounterAction {
    async fn will_appear(&self, cx: &ActionContext, _event: &InstancePayload) {
        cx.set_title(current_count(cx.runtime()).to_string()).await;
    }

    async fn did_receive_global_settings(&self, cx: &ActionContext, settings: &Settings) {
        let count = settings.get(COUNT_KEY).and_then(Value::as_i64).unwrap_or(0);
        cx.set_title(count.to_string()).await;
    }

    async fn key_up(&self, cx: &ActionContext, event: &KeyPayload) {
        self.add(cx, step(&event.settings)).await;
    }

    async fn long_key_press(&self, cx: &ActionContext, _event: &KeyPayload) {
        self.reset(cx).await;
    }

    async fn dial_up(&self, cx: &ActionContext, event: &DialPressPayload) {
        self.add(cx, step(&event.settings)).await;
    }

    async fn long_dial_press(&self, cx: &ActionContext, _event: &DialPressPayload) {
        self.reset(cx).await;
    }

    async fn dial_rotate(&self, cx: &ActionContext, event: &DialRotatePayload) {
        self.add(cx, i64::from(event.ticks)).await;
    }
}

/// Logs device and application events.
pub struct CounterDelegate;

#[async_trait]
impl PluginDelegate for CounterDelegate {
    async fn device_did_connect(&self, _runtime: &PluginRuntime, device: &str, info: &DeviceInfo) {
        info!(
            "device {device} ({}) connected: {}x{} keys",
            info.name, info.size.columns, info.size.rows
        );
    }

    async fn device_did_disconnect(&self, _runtime: &PluginRuntime, device: &str) {
        info!("device {device} disconnected");
    }

    async fn system_did_wake_up(&self, runtime: &PluginRuntime) {
        info!("system woke up; count is {}", current_count(runtime));
    }

    async fn did_receive_global_settings(&self, _runtime: &PluginRuntime, settings: &Settings) {
        let document = Value::Object(settings.clone());
        debug!("global settings now {document}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
