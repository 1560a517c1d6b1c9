//! PluginRuntime: the event router and the handle every handler receives.
//!
//! # Message flow
//!
//! ```text
//! receive loop ──► accept_frame(text)
//!                    │ 1. first frame ever?  → getGlobalSettings (once)
//!                    │ 2. decode header, look up controller, decode payload
//!                    │ 3. ordered bookkeeping (under the registry/timer locks):
//!                    │      willAppear → register     willDisappear → detach
//!                    │      keyDown/dialDown → arm     keyUp/dialUp → resolve
//!                    │      dialPress → version gate  globals → replace cache
//!                    ▼
//!                 tokio::spawn(handler work)   ◄── returned as a JoinHandle
//! ```
//!
//! Steps 1-3 run inline, in receipt order, so a `keyUp` can never be
//! resolved before the `keyDown` it belongs to, and a `willDisappear` can
//! never be overtaken by the `willAppear` that created the instance.  Only
//! the user callbacks run concurrently.  Handlers are always invoked on a
//! cloned `Arc<dyn Action>` after the registry lock has been released, so a
//! handler may call straight back into the runtime.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use deck_core::protocol::{DialPressPayload, InstancePayload, KeyPayload, TouchTapPayload};
use deck_core::{
    decode_header, decode_with_header, CodecError, Controller, Coordinates, EventKind, HostInfo,
    InboundEnvelope, InboundEvent, OutboundCommand, Settings, TriggerDescription,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::action::{Action, ActionContext};
use crate::application::catalog::{ActionCatalog, InstanceSeed};
use crate::application::delegate::{PluginDelegate, PluginError};
use crate::application::global_settings::{GlobalSettingsStore, SettingsError};
use crate::application::instances::{InstanceRegistry, Registration};
use crate::application::long_press::{LongPressTimers, PressOutcome};
use crate::domain::config::PluginConfig;
use crate::domain::settings::SettingsSchema;
use crate::infrastructure::outbound::Outbound;

/// Handler work produced by routing one inbound event.
type Work = BoxFuture<'static, ()>;

/// Cheaply clonable handle to the plugin's shared state.
#[derive(Clone)]
pub struct PluginRuntime {
    inner: Arc<Inner>,
}

struct Inner {
    plugin_uuid: String,
    host_info: HostInfo,
    config: PluginConfig,
    catalog: Arc<ActionCatalog>,
    instances: Mutex<InstanceRegistry>,
    timers: Mutex<LongPressTimers>,
    settings: GlobalSettingsStore,
    delegate: Arc<dyn PluginDelegate>,
    outbound: Outbound,
    settings_requested: AtomicBool,
}

impl fmt::Debug for PluginRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRuntime")
            .field("plugin_uuid", &self.inner.plugin_uuid)
            .field("host_version", &self.inner.host_info.application.version)
            .finish_non_exhaustive()
    }
}

impl PluginRuntime {
    /// Builds the runtime.  Commands are queued on `outbound`; something
    /// (normally the session's writer task) must drain the other end.
    pub fn new(
        plugin_uuid: impl Into<String>,
        host_info: HostInfo,
        config: PluginConfig,
        catalog: ActionCatalog,
        schema: SettingsSchema,
        delegate: Arc<dyn PluginDelegate>,
        outbound: Outbound,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                plugin_uuid: plugin_uuid.into(),
                host_info,
                config,
                catalog: Arc::new(catalog),
                instances: Mutex::new(InstanceRegistry::new()),
                timers: Mutex::new(LongPressTimers::new()),
                settings: GlobalSettingsStore::new(schema),
                delegate,
                outbound,
                settings_requested: AtomicBool::new(false),
            }),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn plugin_uuid(&self) -> &str {
        &self.inner.plugin_uuid
    }

    pub fn host_info(&self) -> &HostInfo {
        &self.inner.host_info
    }

    pub fn config(&self) -> &PluginConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.inner.catalog
    }

    pub fn global_settings(&self) -> &GlobalSettingsStore {
        &self.inner.settings
    }

    /// Shorthand for `global_settings().get(key)`.
    pub fn global_setting(&self, key: &str) -> Value {
        self.inner.settings.get(key)
    }

    pub async fn instance_count(&self) -> usize {
        self.inner.instances.lock().await.len()
    }

    pub async fn controller_of(&self, context: &str) -> Option<Controller> {
        self.inner.instances.lock().await.controller(context)
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    /// Decodes one inbound text frame, applies its ordered bookkeeping and
    /// spawns the resulting handler work.
    ///
    /// Returns the spawned task, or `None` when the frame needs no handler
    /// (for example an event for an unknown context).  Callers in the receive
    /// loop drop the handle; tests await it.
    pub async fn accept_frame(&self, text: &str) -> Option<JoinHandle<()>> {
        self.request_global_settings_once().await;

        let work = match self.decode(text).await {
            Ok(envelope) => self.route(envelope).await,
            Err(e) => Some(self.report(PluginError::Decode(e))),
        };
        work.map(tokio::spawn)
    }

    async fn request_global_settings_once(&self) {
        if !self.inner.settings_requested.swap(true, Ordering::SeqCst) {
            debug!("first inbound frame; requesting global settings");
            self.send_command(&self.inner.plugin_uuid, OutboundCommand::GetGlobalSettings)
                .await;
        }
    }

    async fn decode(&self, text: &str) -> Result<InboundEnvelope, CodecError> {
        let header = decode_header(text)?;
        let controller = match header.context.as_deref() {
            Some(context) => self.inner.instances.lock().await.controller(context),
            None => None,
        };
        decode_with_header(&header, text, controller)
    }

    async fn route(&self, envelope: InboundEnvelope) -> Option<Work> {
        let kind = envelope.kind();
        debug!("inbound {} (context {:?})", kind.as_str(), envelope.context);

        let InboundEnvelope {
            context,
            action,
            device,
            event,
        } = envelope;
        let context = context.unwrap_or_default();
        let action = action.unwrap_or_default();
        let device = device.unwrap_or_default();

        match event {
            // ── Instance lifecycle ───────────────────────────────────────────
            InboundEvent::WillAppear(payload) => {
                self.on_will_appear(context, action, device, payload).await
            }
            InboundEvent::WillDisappear(payload) => self.on_will_disappear(context, payload).await,
            InboundEvent::DidReceiveSettings(payload) => {
                let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
                Some(async move { instance.did_receive_settings(&cx, &payload).await }.boxed())
            }
            InboundEvent::TitleParametersDidChange(payload) => {
                let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
                Some(
                    async move { instance.title_parameters_did_change(&cx, &payload).await }
                        .boxed(),
                )
            }

            // ── Keys ─────────────────────────────────────────────────────────
            InboundEvent::KeyDown(payload) => self.on_key_down(context, payload).await,
            InboundEvent::KeyUp(payload) => self.on_key_up(context, payload).await,

            // ── Encoders ─────────────────────────────────────────────────────
            InboundEvent::DialDown(payload) => self.on_dial_down(context, kind, payload).await,
            InboundEvent::DialUp(payload) => self.on_dial_up(context, kind, payload).await,
            InboundEvent::DialPress(payload) => self.on_legacy_dial_press(context, payload).await,
            InboundEvent::DialRotate(payload) => {
                let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
                if let Err(e) = require_encoder(&cx, kind) {
                    return Some(self.report(e));
                }
                Some(async move { instance.dial_rotate(&cx, &payload).await }.boxed())
            }
            InboundEvent::TouchTap(payload) => self.on_touch_tap(context, kind, payload).await,

            // ── Global settings ──────────────────────────────────────────────
            InboundEvent::DidReceiveGlobalSettings(payload) => {
                self.inner.settings.replace(payload.settings);
                let runtime = self.clone();
                Some(async move { runtime.fan_out_global_settings().await }.boxed())
            }

            // ── Delegate only ────────────────────────────────────────────────
            InboundEvent::DeviceDidConnect(info) => {
                info!("device {device} connected: {} ({:?})", info.name, info.device_type);
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move { delegate.device_did_connect(&runtime, &device, &info).await }
                        .boxed(),
                )
            }
            InboundEvent::DeviceDidDisconnect => {
                info!("device {device} disconnected");
                let (delegate, runtime) = self.delegate_handle();
                Some(async move { delegate.device_did_disconnect(&runtime, &device).await }.boxed())
            }
            InboundEvent::ApplicationDidLaunch(payload) => {
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move {
                        delegate
                            .application_did_launch(&runtime, &payload.application)
                            .await
                    }
                    .boxed(),
                )
            }
            InboundEvent::ApplicationDidTerminate(payload) => {
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move {
                        delegate
                            .application_did_terminate(&runtime, &payload.application)
                            .await
                    }
                    .boxed(),
                )
            }
            InboundEvent::SystemDidWakeUp => {
                let (delegate, runtime) = self.delegate_handle();
                Some(async move { delegate.system_did_wake_up(&runtime).await }.boxed())
            }

            // ── Property inspector: instance (if any) then delegate ──────────
            InboundEvent::PropertyInspectorDidAppear => {
                let target = self.target(&context, kind, None).await;
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move {
                        if let Some((instance, cx)) = target {
                            instance.property_inspector_did_appear(&cx).await;
                        }
                        delegate
                            .property_inspector_did_appear(&runtime, &context, &action)
                            .await;
                    }
                    .boxed(),
                )
            }
            InboundEvent::PropertyInspectorDidDisappear => {
                let target = self.target(&context, kind, None).await;
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move {
                        if let Some((instance, cx)) = target {
                            instance.property_inspector_did_disappear(&cx).await;
                        }
                        delegate
                            .property_inspector_did_disappear(&runtime, &context, &action)
                            .await;
                    }
                    .boxed(),
                )
            }
            InboundEvent::SendToPlugin(payload) => {
                let target = self.target(&context, kind, None).await;
                let (delegate, runtime) = self.delegate_handle();
                Some(
                    async move {
                        if let Some((instance, cx)) = target {
                            instance.send_to_plugin(&cx, &payload).await;
                        }
                        delegate
                            .send_to_plugin(&runtime, &context, &action, &payload)
                            .await;
                    }
                    .boxed(),
                )
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    async fn on_will_appear(
        &self,
        context: String,
        action: String,
        device: String,
        payload: InstancePayload,
    ) -> Option<Work> {
        let controller = self.inner.catalog.resolve_controller(&action, payload.controller);
        let seed = InstanceSeed {
            action,
            context,
            device,
            coordinates: payload.coordinates,
            controller,
            settings: payload.settings.clone(),
        };

        let (instance, cx) = {
            let mut registry = self.inner.instances.lock().await;
            match registry.register_instance(&self.inner.catalog, &seed) {
                Registration::UnknownAction => return None,
                Registration::Created(instance) => {
                    let cx = ActionContext::new(
                        seed.context,
                        seed.action,
                        seed.device,
                        seed.coordinates,
                        seed.controller,
                        self.clone(),
                    );
                    (instance, cx)
                }
                Registration::AlreadyPresent => {
                    let live = registry.get(&seed.context)?;
                    let cx = ActionContext::new(
                        seed.context.clone(),
                        live.action.clone(),
                        live.device.clone(),
                        seed.coordinates.or(live.coordinates),
                        registry.controller(&seed.context).unwrap_or_default(),
                        self.clone(),
                    );
                    (Arc::clone(&live.instance), cx)
                }
            }
        };

        Some(async move { instance.will_appear(&cx, &payload).await }.boxed())
    }

    async fn on_will_disappear(&self, context: String, payload: InstancePayload) -> Option<Work> {
        // Detached before `will_disappear` runs, so no later frame reaches it.
        let detached = {
            let mut registry = self.inner.instances.lock().await;
            let controller = registry.controller(&context).unwrap_or_default();
            registry
                .remove_instance(&context)
                .map(|live| (live, controller))
        };
        self.inner.timers.lock().await.remove(&context);

        let Some((live, controller)) = detached else {
            debug!("willDisappear for unknown context {context:?}; ignoring");
            return None;
        };
        let cx = ActionContext::new(
            context,
            live.action,
            live.device,
            payload.coordinates.or(live.coordinates),
            controller,
            self.clone(),
        );
        let instance = live.instance;
        Some(async move { instance.will_disappear(&cx, &payload).await }.boxed())
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    async fn on_key_down(&self, context: String, payload: KeyPayload) -> Option<Work> {
        let (instance, cx) = self
            .target(&context, EventKind::KeyDown, payload.coordinates)
            .await?;

        let generation = self.inner.timers.lock().await.begin(&context);
        let on_long = {
            let (instance, cx, payload) = (Arc::clone(&instance), cx.clone(), payload.clone());
            async move { instance.long_key_press(&cx, &payload).await }
        };
        self.arm_long_press(context, generation, on_long);

        Some(async move { instance.key_down(&cx, &payload).await }.boxed())
    }

    async fn on_key_up(&self, context: String, payload: KeyPayload) -> Option<Work> {
        let (instance, cx) = self
            .target(&context, EventKind::KeyUp, payload.coordinates)
            .await?;

        let outcome = self.inner.timers.lock().await.release(&context);
        match outcome {
            PressOutcome::Long => {
                debug!("long press already handled for {context}; suppressing key_up");
                None
            }
            PressOutcome::Short => {
                Some(async move { instance.key_up(&cx, &payload).await }.boxed())
            }
        }
    }

    // ── Encoders ──────────────────────────────────────────────────────────────

    async fn on_dial_down(
        &self,
        context: String,
        kind: EventKind,
        payload: DialPressPayload,
    ) -> Option<Work> {
        let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
        if let Err(e) = require_encoder(&cx, kind) {
            return Some(self.report(e));
        }

        let generation = self.inner.timers.lock().await.begin(&context);
        let on_long = {
            let (instance, cx, payload) = (Arc::clone(&instance), cx.clone(), payload.clone());
            async move { instance.long_dial_press(&cx, &payload).await }
        };
        self.arm_long_press(context, generation, on_long);

        Some(async move { instance.dial_down(&cx, &payload).await }.boxed())
    }

    async fn on_dial_up(
        &self,
        context: String,
        kind: EventKind,
        payload: DialPressPayload,
    ) -> Option<Work> {
        let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
        if let Err(e) = require_encoder(&cx, kind) {
            return Some(self.report(e));
        }

        let outcome = self.inner.timers.lock().await.release(&context);
        match outcome {
            PressOutcome::Long => {
                debug!("long dial press already handled for {context}; suppressing dial_up");
                None
            }
            PressOutcome::Short => {
                Some(async move { instance.dial_up(&cx, &payload).await }.boxed())
            }
        }
    }

    /// `dialPress` predates `dialDown`/`dialUp`.  Hosts after 6.0 send both,
    /// so it is only acted on when the host is a 6.0 release.
    async fn on_legacy_dial_press(
        &self,
        context: String,
        payload: DialPressPayload,
    ) -> Option<Work> {
        if !self.inner.host_info.delivers_legacy_dial_press() {
            warn!(
                "dropping legacy dialPress for {context}: host version {:?} \
                 also sends dialDown/dialUp",
                self.inner.host_info.application.version
            );
            return None;
        }
        if payload.pressed.unwrap_or(false) {
            self.on_dial_down(context, EventKind::DialPress, payload).await
        } else {
            self.on_dial_up(context, EventKind::DialPress, payload).await
        }
    }

    async fn on_touch_tap(
        &self,
        context: String,
        kind: EventKind,
        payload: TouchTapPayload,
    ) -> Option<Work> {
        let (instance, cx) = self.target(&context, kind, payload.coordinates).await?;
        if let Err(e) = require_encoder(&cx, kind) {
            return Some(self.report(e));
        }
        if payload.hold {
            Some(async move { instance.long_touch_press(&cx, &payload).await }.boxed())
        } else {
            Some(async move { instance.touch_tap(&cx, &payload).await }.boxed())
        }
    }

    fn arm_long_press<F>(&self, context: String, generation: u64, on_long: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = self.clone();
        let threshold = self.inner.config.long_press_threshold;
        tokio::spawn(async move {
            tokio::time::sleep(threshold).await;
            let fired = runtime
                .inner
                .timers
                .lock()
                .await
                .expire(&context, generation);
            if fired {
                debug!("long press fired for {context}");
                on_long.await;
            }
        });
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Clones out the instance for `context` and builds its handler context.
    /// Logs and returns `None` when there is no instance.
    async fn target(
        &self,
        context: &str,
        kind: EventKind,
        coordinates: Option<Coordinates>,
    ) -> Option<(Arc<dyn Action>, ActionContext)> {
        let registry = self.inner.instances.lock().await;
        let Some(live) = registry.get(context) else {
            debug!("{} for context {context:?} has no instance; ignoring", kind.as_str());
            return None;
        };
        let cx = ActionContext::new(
            context,
            live.action.clone(),
            live.device.clone(),
            coordinates.or(live.coordinates),
            registry.controller(context).unwrap_or_default(),
            self.clone(),
        );
        Some((Arc::clone(&live.instance), cx))
    }

    fn delegate_handle(&self) -> (Arc<dyn PluginDelegate>, PluginRuntime) {
        (Arc::clone(&self.inner.delegate), self.clone())
    }

    fn report(&self, error: PluginError) -> Work {
        debug!("routing failure: {error}");
        let (delegate, runtime) = self.delegate_handle();
        async move { delegate.on_error(&runtime, &error).await }.boxed()
    }

    // ── Global settings ───────────────────────────────────────────────────────

    /// Writes one global setting locally and publishes the full document.
    ///
    /// The new value is visible to [`global_setting`](Self::global_setting)
    /// as soon as this returns.  The returned task sends `setGlobalSettings`
    /// and, once the frame has been written, calls
    /// `did_receive_global_settings` on every instance and the delegate.
    ///
    /// # Errors
    ///
    /// [`SettingsError::TypeMismatch`] if `key` is declared with another type.
    pub fn set_global_setting(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<JoinHandle<()>, SettingsError> {
        self.inner.settings.set(key, value.into())?;
        Ok(self.spawn_publish())
    }

    /// Atomic read-modify-write of one global setting, then publication as
    /// in [`set_global_setting`](Self::set_global_setting).
    ///
    /// `f` receives the current value (cached, else the declared default)
    /// and runs under the store's write lock, so concurrent handlers never
    /// lose each other's updates.  Returns the stored value and the
    /// publishing task.
    ///
    /// # Errors
    ///
    /// [`SettingsError::TypeMismatch`] if the new value does not fit the
    /// declared type; nothing is published.
    pub fn update_global_setting<F>(
        &self,
        key: &str,
        f: F,
    ) -> Result<(Value, JoinHandle<()>), SettingsError>
    where
        F: FnOnce(&Value) -> Value,
    {
        let value = self.inner.settings.update(key, f)?;
        Ok((value, self.spawn_publish()))
    }

    fn spawn_publish(&self) -> JoinHandle<()> {
        let runtime = self.clone();
        tokio::spawn(async move {
            runtime.publish_global_settings().await;
        })
    }

    async fn publish_global_settings(&self) {
        let snapshot = self.inner.settings.snapshot();
        let envelope = OutboundCommand::SetGlobalSettings(snapshot)
            .into_envelope(self.inner.plugin_uuid.as_str());
        if self.inner.outbound.send_confirmed(envelope).await {
            self.fan_out_global_settings().await;
        } else {
            warn!("setGlobalSettings was not written; skipping fan-out");
        }
    }

    /// Replaces the local document with `snapshot` and notifies everyone.
    pub async fn apply_remote_global_settings(&self, snapshot: Settings) {
        self.inner.settings.replace(snapshot);
        self.fan_out_global_settings().await;
    }

    async fn fan_out_global_settings(&self) {
        let settings = self.inner.settings.snapshot();
        let targets: Vec<(Arc<dyn Action>, ActionContext)> = {
            let registry = self.inner.instances.lock().await;
            registry
                .snapshot()
                .into_iter()
                .map(|(context, live, controller)| {
                    let cx = ActionContext::new(
                        context,
                        live.action,
                        live.device,
                        live.coordinates,
                        controller,
                        self.clone(),
                    );
                    (live.instance, cx)
                })
                .collect()
        };

        for (instance, cx) in &targets {
            instance.did_receive_global_settings(cx, &settings).await;
        }
        self.inner
            .delegate
            .did_receive_global_settings(self, &settings)
            .await;
    }

    // ── Outbound ──────────────────────────────────────────────────────────────

    /// Queues `command` addressed at `context`.  Encode failures and a closed
    /// writer are logged by [`Outbound`] and otherwise ignored.
    pub async fn send_command(&self, context: &str, command: OutboundCommand) {
        self.inner.outbound.send(command.into_envelope(context)).await;
    }

    pub async fn set_title(&self, context: &str, title: impl Into<String>) {
        self.send_command(
            context,
            OutboundCommand::SetTitle {
                title: Some(title.into()),
                target: None,
                state: None,
            },
        )
        .await;
    }

    pub async fn set_image(&self, context: &str, image: Option<String>) {
        self.send_command(
            context,
            OutboundCommand::SetImage {
                image,
                target: None,
                state: None,
            },
        )
        .await;
    }

    pub async fn set_state(&self, context: &str, state: u32) {
        self.send_command(context, OutboundCommand::SetState { state })
            .await;
    }

    pub async fn show_ok(&self, context: &str) {
        self.send_command(context, OutboundCommand::ShowOk).await;
    }

    pub async fn show_alert(&self, context: &str) {
        self.send_command(context, OutboundCommand::ShowAlert).await;
    }

    pub async fn set_settings(&self, context: &str, settings: Settings) {
        self.send_command(context, OutboundCommand::SetSettings(settings))
            .await;
    }

    pub async fn get_settings(&self, context: &str) {
        self.send_command(context, OutboundCommand::GetSettings).await;
    }

    /// Opens `url` in the user's default browser.
    pub async fn open_url(&self, url: impl Into<String>) {
        self.send_command(&self.inner.plugin_uuid, OutboundCommand::OpenUrl { url: url.into() })
            .await;
    }

    /// Appends a line to the host's log for this plugin.
    pub async fn log_message(&self, message: impl Into<String>) {
        self.send_command(
            &self.inner.plugin_uuid,
            OutboundCommand::LogMessage {
                message: message.into(),
            },
        )
        .await;
    }

    /// Sends a `setFeedback`.  The payload must serialise to a JSON object.
    pub async fn set_feedback<T: Serialize + ?Sized>(&self, context: &str, feedback: &T) {
        match serde_json::to_value(feedback) {
            Ok(value @ Value::Object(_)) => {
                self.send_command(context, OutboundCommand::SetFeedback(value))
                    .await;
            }
            Ok(other) => error!("setFeedback for {context} must be a JSON object, got {other}"),
            Err(e) => error!("failed to encode setFeedback for {context}: {e}"),
        }
    }

    pub async fn set_feedback_layout(&self, context: &str, layout: impl Into<String>) {
        self.send_command(
            context,
            OutboundCommand::SetFeedbackLayout {
                layout: layout.into(),
            },
        )
        .await;
    }

    pub async fn set_trigger_description(&self, context: &str, description: TriggerDescription) {
        self.send_command(context, OutboundCommand::SetTriggerDescription(description))
            .await;
    }

    /// Switches `device` to a profile bundled with the plugin.
    pub async fn switch_to_profile(&self, device: &str, profile: impl Into<String>) {
        let envelope = OutboundCommand::SwitchToProfile {
            profile: profile.into(),
        }
        .into_envelope(self.inner.plugin_uuid.as_str())
        .with_device(device);
        self.inner.outbound.send(envelope).await;
    }

    pub async fn send_to_property_inspector(&self, context: &str, action: &str, payload: Value) {
        let envelope = OutboundCommand::SendToPropertyInspector(payload)
            .into_envelope(context)
            .with_action(action);
        self.inner.outbound.send(envelope).await;
    }
}

/// Rejects encoder-only events addressed at a keypad placement.
fn require_encoder(cx: &ActionContext, kind: EventKind) -> Result<(), PluginError> {
    if kind.is_encoder_only() && cx.controller == Controller::Keypad {
        return Err(PluginError::ControllerMismatch {
            context: cx.context.clone(),
            event: kind.as_str(),
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
