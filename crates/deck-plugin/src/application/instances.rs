//! Live action instances and the controller kind recorded for each.
//!
//! # For beginners
//!
//! The host identifies every placed control by an opaque *context* string.
//! When a control scrolls into view the host sends `willAppear`; when it
//! leaves, `willDisappear`.  [`InstanceRegistry`] keeps exactly one instance
//! per context between those two events, plus the [`Controller`] kind the
//! codec needs to decode overloaded event names for that context.
//!
//! The registry lives behind a `tokio::sync::Mutex` inside the runtime.
//! Callers clone the `Arc<dyn Action>` out and release the lock before
//! invoking any handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use deck_core::{Controller, Coordinates};
use tracing::{debug, info, warn};

use crate::application::action::Action;
use crate::application::catalog::{ActionCatalog, InstanceSeed};

// ── Controller registry ───────────────────────────────────────────────────────

/// Flat map from context to controller kind.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Controller>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `controller` for `context`; last write wins.
    pub fn store(&mut self, context: &str, controller: Controller) {
        self.controllers.insert(context.to_string(), controller);
    }

    pub fn remove(&mut self, context: &str) -> Option<Controller> {
        self.controllers.remove(context)
    }

    pub fn lookup(&self, context: &str) -> Option<Controller> {
        self.controllers.get(context).copied()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

// ── Instance registry ─────────────────────────────────────────────────────────

/// A live instance together with the placement facts it was created with.
#[derive(Clone)]
pub struct LiveInstance {
    pub action: String,
    pub device: String,
    pub coordinates: Option<Coordinates>,
    pub instance: Arc<dyn Action>,
}

impl fmt::Debug for LiveInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveInstance")
            .field("action", &self.action)
            .field("device", &self.device)
            .field("coordinates", &self.coordinates)
            .finish_non_exhaustive()
    }
}

/// Result of [`InstanceRegistry::register_instance`].
pub enum Registration {
    /// The context already had an instance; nothing changed.
    AlreadyPresent,
    /// The catalog has no action type with the requested identifier.
    UnknownAction,
    /// A new instance was built and stored.
    Created(Arc<dyn Action>),
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::AlreadyPresent => f.write_str("AlreadyPresent"),
            Registration::UnknownAction => f.write_str("UnknownAction"),
            Registration::Created(_) => f.write_str("Created(..)"),
        }
    }
}

/// Thread-unsafe registry of live instances; wrap in a mutex to share.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: HashMap<String, LiveInstance>,
    controllers: ControllerRegistry,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an instance for `seed.context` unless one already exists.
    ///
    /// On creation the seed's controller is recorded for the context.
    pub fn register_instance(
        &mut self,
        catalog: &ActionCatalog,
        seed: &InstanceSeed,
    ) -> Registration {
        if self.instances.contains_key(&seed.context) {
            debug!("context {} already has an instance; ignoring", seed.context);
            return Registration::AlreadyPresent;
        }

        let Some(action_type) = catalog.lookup(&seed.action) else {
            warn!(
                "host placed unknown action {:?} (context {}); ignoring",
                seed.action, seed.context
            );
            return Registration::UnknownAction;
        };

        let instance = action_type.create(seed);
        self.instances.insert(
            seed.context.clone(),
            LiveInstance {
                action: seed.action.clone(),
                device: seed.device.clone(),
                coordinates: seed.coordinates,
                instance: Arc::clone(&instance),
            },
        );
        self.controllers.store(&seed.context, seed.controller);

        info!(
            "created {} instance for context {} ({})",
            seed.action, seed.context, seed.controller
        );
        Registration::Created(instance)
    }

    /// Detaches the instance for `context` and its controller entry.
    /// Returns `None` (and changes nothing) if the context is unknown.
    pub fn remove_instance(&mut self, context: &str) -> Option<LiveInstance> {
        let removed = self.instances.remove(context)?;
        self.controllers.remove(context);
        info!("removed {} instance for context {}", removed.action, context);
        Some(removed)
    }

    pub fn lookup(&self, context: &str) -> Option<Arc<dyn Action>> {
        self.instances.get(context).map(|live| Arc::clone(&live.instance))
    }

    pub fn get(&self, context: &str) -> Option<&LiveInstance> {
        self.instances.get(context)
    }

    pub fn controller(&self, context: &str) -> Option<Controller> {
        self.controllers.lookup(context)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Clones out every live instance with its context and controller.
    pub fn snapshot(&self) -> Vec<(String, LiveInstance, Controller)> {
        self.instances
            .iter()
            .map(|(context, live)| {
                let controller = self.controllers.lookup(context).unwrap_or_default();
                (context.clone(), live.clone(), controller)
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
