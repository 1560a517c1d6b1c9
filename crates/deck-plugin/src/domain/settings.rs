//! Declared global-settings keys.
//!
//! A plugin declares the keys it reads from the plugin-wide settings
//! document, each with a default and a JSON type tag:
//!
//! ```rust
//! use deck_plugin::{SettingKey, SettingsSchema};
//!
//! let schema = SettingsSchema::new()
//!     .with(SettingKey::integer("count", 0))
//!     .with(SettingKey::string("label", "Clicks"));
//! assert_eq!(schema.len(), 2);
//! ```
//!
//! The table drives both the fallback value returned for keys the host has
//! never sent and the type check applied to local writes.  Keys that are not
//! declared are still readable and writable; they just have no default and
//! no type check.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// JSON type tag for a declared setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    /// Any JSON number with no fractional part.
    Integer,
    /// Any JSON number.
    Float,
    String,
    Object,
    Array,
    /// No type check.
    Any,
}

impl SettingKind {
    /// Returns `true` if `value` is acceptable for a key of this kind.
    ///
    /// `null` is always accepted so a key can be cleared.
    pub fn accepts(self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            SettingKind::Bool => value.is_boolean(),
            SettingKind::Integer => value.is_i64() || value.is_u64(),
            SettingKind::Float => value.is_number(),
            SettingKind::String => value.is_string(),
            SettingKind::Object => value.is_object(),
            SettingKind::Array => value.is_array(),
            SettingKind::Any => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKind::Bool => "bool",
            SettingKind::Integer => "integer",
            SettingKind::Float => "float",
            SettingKind::String => "string",
            SettingKind::Object => "object",
            SettingKind::Array => "array",
            SettingKind::Any => "any",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared key: name, default and type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingKey {
    pub name: String,
    pub default: Value,
    pub kind: SettingKind,
}

impl SettingKey {
    pub fn new(name: impl Into<String>, default: Value, kind: SettingKind) -> Self {
        Self {
            name: name.into(),
            default,
            kind,
        }
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, Value::Bool(default), SettingKind::Bool)
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, Value::from(default), SettingKind::Integer)
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, Value::from(default), SettingKind::Float)
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, Value::String(default.into()), SettingKind::String)
    }
}

/// The table of declared keys.
#[derive(Debug, Clone, Default)]
pub struct SettingsSchema {
    keys: HashMap<String, SettingKey>,
}

impl SettingsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, replacing any earlier declaration with the same name.
    pub fn with(mut self, key: SettingKey) -> Self {
        self.keys.insert(key.name.clone(), key);
        self
    }

    pub fn key(&self, name: &str) -> Option<&SettingKey> {
        self.keys.get(name)
    }

    /// Returns the declared default for `name`, if the key is declared.
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.keys.get(name).map(|k| &k.default)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_kind_rejects_fractions_and_strings() {
        assert!(SettingKind::Integer.accepts(&json!(3)));
        assert!(SettingKind::Integer.accepts(&json!(-3)));
        assert!(!SettingKind::Integer.accepts(&json!(3.5)));
        assert!(!SettingKind::Integer.accepts(&json!("3")));
    }

    #[test]
    fn test_float_kind_accepts_any_number() {
        assert!(SettingKind::Float.accepts(&json!(3)));
        assert!(SettingKind::Float.accepts(&json!(0.25)));
        assert!(!SettingKind::Float.accepts(&json!(true)));
    }

    #[test]
    fn test_null_is_accepted_by_every_kind() {
        for kind in [
            SettingKind::Bool,
            SettingKind::Integer,
            SettingKind::Float,
            SettingKind::String,
            SettingKind::Object,
            SettingKind::Array,
            SettingKind::Any,
        ] {
            assert!(kind.accepts(&Value::Null), "{kind}");
        }
    }

    #[test]
    fn test_schema_lookup_and_defaults() {
        // Arrange
        let schema = SettingsSchema::new()
            .with(SettingKey::integer("count", 0))
            .with(SettingKey::bool("enabled", true));

        // Act / Assert
        assert_eq!(schema.default_for("count"), Some(&json!(0)));
        assert_eq!(schema.key("enabled").map(|k| k.kind), Some(SettingKind::Bool));
        assert_eq!(schema.default_for("missing"), None);
    }

    #[test]
    fn test_redeclaring_a_key_replaces_it() {
        let schema = SettingsSchema::new()
            .with(SettingKey::integer("count", 0))
            .with(SettingKey::integer("count", 10));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.default_for("count"), Some(&json!(10)));
    }
}
