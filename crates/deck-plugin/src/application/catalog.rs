//! The action type catalog.
//!
//! Every kind of control a plugin offers is described once at startup by an
//! [`ActionType`]: identifier, display name, icon, optional states, the
//! controllers it can be placed on, and a factory that builds an instance
//! for one placement.  The [`ActionCatalog`] validates the set and is then
//! shared read-only (behind an `Arc`, no lock) for the life of the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use deck_core::{Controller, Coordinates, Settings};
use thiserror::Error;

use crate::application::action::Action;

/// Builds an instance for one placement.
pub type ActionFactory = Arc<dyn Fn(&InstanceSeed) -> Arc<dyn Action> + Send + Sync>;

/// Errors detected while building the catalog.  Any of these stops the
/// plugin from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("action identifier {0:?} is registered more than once")]
    DuplicateIdentifier(String),

    #[error("action identifier {0:?} is not a dotted reverse-domain name")]
    InvalidIdentifier(String),
}

/// Everything a factory knows about the placement it is building for.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSeed {
    pub action: String,
    pub context: String,
    pub device: String,
    pub coordinates: Option<Coordinates>,
    pub controller: Controller,
    pub settings: Settings,
}

/// One discrete visual state of a multi-state action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionState {
    pub image: String,
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Descriptor of one action type.
#[derive(Clone)]
pub struct ActionType {
    uuid: String,
    name: String,
    icon: String,
    states: Vec<ActionState>,
    controllers: Vec<Controller>,
    factory: ActionFactory,
}

impl ActionType {
    /// Creates a keypad action type with no icon and no states.
    pub fn new<F>(uuid: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&InstanceSeed) -> Arc<dyn Action> + Send + Sync + 'static,
    {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            icon: String::new(),
            states: Vec::new(),
            controllers: vec![Controller::Keypad],
            factory: Arc::new(factory),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn states(mut self, states: Vec<ActionState>) -> Self {
        self.states = states;
        self
    }

    /// Sets the supported controllers.  An empty list keeps the default
    /// (keypad only).
    pub fn controllers(mut self, controllers: &[Controller]) -> Self {
        if !controllers.is_empty() {
            self.controllers = controllers.to_vec();
        }
        self
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon_path(&self) -> &str {
        &self.icon
    }

    pub fn state_list(&self) -> &[ActionState] {
        &self.states
    }

    pub fn supported_controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn supports(&self, controller: Controller) -> bool {
        self.controllers.contains(&controller)
    }

    /// The controller assumed for a placement whose `willAppear` did not say.
    pub fn default_controller(&self) -> Controller {
        if self.supports(Controller::Keypad) {
            Controller::Keypad
        } else {
            Controller::Encoder
        }
    }

    /// Runs the factory.
    pub fn create(&self, seed: &InstanceSeed) -> Arc<dyn Action> {
        (self.factory)(seed)
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionType")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("states", &self.states)
            .field("controllers", &self.controllers)
            .finish_non_exhaustive()
    }
}

/// Returns `true` for identifiers like `com.acme.counter.increment`: two or
/// more non-empty dot-separated segments of ASCII letters, digits and `-`.
pub fn is_valid_identifier(identifier: &str) -> bool {
    let mut segments = 0;
    for segment in identifier.split('.') {
        if segment.is_empty()
            || !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}

/// The validated, immutable set of action types.
#[derive(Debug, Default)]
pub struct ActionCatalog {
    types: Vec<ActionType>,
    index: HashMap<String, usize>,
}

impl ActionCatalog {
    /// Validates and indexes `types`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidIdentifier`] for a malformed identifier.
    /// - [`CatalogError::DuplicateIdentifier`] when two types share one.
    pub fn new(types: Vec<ActionType>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(types.len());
        for (position, action_type) in types.iter().enumerate() {
            if !is_valid_identifier(&action_type.uuid) {
                return Err(CatalogError::InvalidIdentifier(action_type.uuid.clone()));
            }
            if index.insert(action_type.uuid.clone(), position).is_some() {
                return Err(CatalogError::DuplicateIdentifier(action_type.uuid.clone()));
            }
        }
        Ok(Self { types, index })
    }

    pub fn lookup(&self, identifier: &str) -> Option<&ActionType> {
        self.index.get(identifier).map(|&i| &self.types[i])
    }

    /// Resolves the controller for a new placement: the one the host reported,
    /// else the action type's default, else keypad.
    pub fn resolve_controller(&self, identifier: &str, reported: Option<Controller>) -> Controller {
        reported.unwrap_or_else(|| {
            self.lookup(identifier)
                .map(ActionType::default_controller)
                .unwrap_or_default()
        })
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
