//! Local mirror of the plugin-wide settings document.
//!
//! The host owns the authoritative copy.  The store keeps a cache that is:
//!
//! - replaced wholesale by every `didReceiveGlobalSettings` push,
//! - updated key by key by local writes, visible immediately to every reader.
//!
//! Publishing local writes back to the host (a full-snapshot
//! `setGlobalSettings`) is orchestrated by the runtime, not here.  The cache
//! sits behind a `std::sync::RwLock` that is never held across an await.

use std::sync::{PoisonError, RwLock};

use deck_core::Settings;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::settings::{SettingKind, SettingsSchema};

/// Errors returned by typed settings access.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("setting {key:?} is declared as {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: SettingKind,
        actual: Value,
    },

    #[error("setting {key:?} cannot be read as the requested type: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
struct Cache {
    values: Settings,
    revision: u64,
}

#[derive(Debug, Default)]
pub struct GlobalSettingsStore {
    schema: SettingsSchema,
    cache: RwLock<Cache>,
}

impl GlobalSettingsStore {
    /// Creates an empty store backed by `schema` for defaults and type checks.
    pub fn new(schema: SettingsSchema) -> Self {
        Self {
            schema,
            cache: RwLock::new(Cache::default()),
        }
    }

    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    /// Returns the cached value, else the declared default, else `null`.
    ///
    /// A cached `null` counts as absent, so clearing a key restores its
    /// default.
    pub fn get(&self, key: &str) -> Value {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        self.resolve(&cache.values, key)
    }

    fn resolve(&self, values: &Settings, key: &str) -> Value {
        values
            .get(key)
            .filter(|value| !value.is_null())
            .or_else(|| self.schema.default_for(key))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn check(&self, key: &str, value: Value) -> Result<Value, SettingsError> {
        match self.schema.key(key) {
            Some(declared) if !declared.kind.accepts(&value) => Err(SettingsError::TypeMismatch {
                key: key.to_string(),
                expected: declared.kind,
                actual: value,
            }),
            _ => Ok(value),
        }
    }

    /// Reads `key` (with the same fallback as [`get`](Self::get)) as `T`.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Deserialize`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
        serde_json::from_value(self.get(key)).map_err(|source| SettingsError::Deserialize {
            key: key.to_string(),
            source,
        })
    }

    /// Writes one key locally.  Undeclared keys are stored unchecked.
    ///
    /// # Errors
    ///
    /// [`SettingsError::TypeMismatch`] if `key` is declared with a kind that
    /// does not accept `value`; the cache is left unchanged.
    pub fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let value = self.check(key, value)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.values.insert(key.to_string(), value);
        cache.revision += 1;
        debug!("global setting {key:?} set locally (revision {})", cache.revision);
        Ok(())
    }

    /// Read-modify-write of one key under a single write lock.
    ///
    /// `f` sees the current value (with the same fallback as
    /// [`get`](Self::get)) and returns the new one, which is type-checked
    /// like [`set`](Self::set) and stored.  Concurrent updates never lose
    /// each other's writes.  Returns the stored value.
    ///
    /// # Errors
    ///
    /// [`SettingsError::TypeMismatch`] if the new value does not fit the
    /// declared kind; the cache is left unchanged.
    pub fn update<F>(&self, key: &str, f: F) -> Result<Value, SettingsError>
    where
        F: FnOnce(&Value) -> Value,
    {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let current = self.resolve(&cache.values, key);
        let value = self.check(key, f(&current))?;
        cache.values.insert(key.to_string(), value.clone());
        cache.revision += 1;
        debug!("global setting {key:?} updated locally (revision {})", cache.revision);
        Ok(value)
    }

    /// Replaces the whole cache with a snapshot received from the host.
    pub fn replace(&self, snapshot: Settings) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.values = snapshot;
        cache.revision += 1;
        debug!(
            "global settings replaced by host snapshot ({} keys, revision {})",
            cache.values.len(),
            cache.revision
        );
    }

    /// Returns a copy of the cached document (without defaults filled in).
    pub fn snapshot(&self) -> Settings {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values
            .clone()
    }

    /// Incremented by every local write and every remote replacement.
    pub fn revision(&self) -> u64 {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::SettingKey;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> GlobalSettingsStore {
        GlobalSettingsStore::new(
            SettingsSchema::new()
                .with(SettingKey::integer("count", 0))
                .with(SettingKey::string("label", "Clicks")),
        )
    }

    #[test]
    fn test_get_never_set_key_returns_declared_default() {
        let store = store();
        assert_eq!(store.get("count"), json!(0));
        assert_eq!(store.get("label"), json!("Clicks"));
    }

    #[test]
    fn test_get_undeclared_key_returns_null() {
        assert_eq!(store().get("nothing"), Value::Null);
    }

    #[test]
    fn test_set_is_visible_immediately() {
        // Arrange
        let store = store();

        // Act
        store.set("count", json!(7)).unwrap();

        // Assert
        assert_eq!(store.get("count"), json!(7));
        assert_eq!(store.get_as::<i64>("count").unwrap(), 7);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_remote_snapshot_overwrites_local_value() {
        let store = store();
        store.set("count", json!(7)).unwrap();

        let mut remote = Settings::new();
        remote.insert("count".to_string(), json!(3));
        store.replace(remote);

        assert_eq!(store.get("count"), json!(3));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_remote_snapshot_drops_keys_it_does_not_contain() {
        let store = store();
        store.set("count", json!(7)).unwrap();
        store.set("extra", json!(true)).unwrap();

        store.replace(Settings::new());

        // Declared keys fall back to defaults; undeclared ones are gone.
        assert_eq!(store.get("count"), json!(0));
        assert_eq!(store.get("extra"), Value::Null);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_set_rejects_wrong_type_for_declared_key() {
        let store = store();

        let result = store.set("count", json!("seven"));

        assert!(matches!(
            result,
            Err(SettingsError::TypeMismatch {
                expected: SettingKind::Integer,
                ..
            })
        ));
        assert_eq!(store.get("count"), json!(0), "cache must be unchanged");
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_undeclared_keys_pass_through() {
        let store = store();
        store.set("theme", json!({"dark": true})).unwrap();
        assert_eq!(store.get("theme"), json!({"dark": true}));
    }

    #[test]
    fn test_get_as_wrong_type_is_an_error() {
        let store = store();
        let result = store.get_as::<bool>("label");
        assert!(matches!(result, Err(SettingsError::Deserialize { .. })));
    }

    #[test]
    fn test_concurrent_sets_leave_one_of_the_values() {
        // Arrange
        let store = Arc::new(store());
        let a = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    store.set("count", json!(1)).unwrap();
                }
            })
        };
        let b = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    store.set("count", json!(2)).unwrap();
                }
            })
        };

        // Act
        a.join().unwrap();
        b.join().unwrap();

        // Assert
        let value = store.get("count");
        assert!(value == json!(1) || value == json!(2), "got {value}");
        assert_eq!(store.revision(), 1000);
    }

    #[test]
    fn test_setting_null_restores_the_default() {
        // Arrange
        let store = store();
        store.set("count", json!(7)).unwrap();

        // Act
        store.set("count", Value::Null).unwrap();

        // Assert
        assert_eq!(store.get("count"), json!(0));
        assert_eq!(store.get_as::<i64>("count").unwrap(), 0);
    }

    #[test]
    fn test_null_in_remote_snapshot_reads_as_default() {
        let store = store();
        let mut remote = Settings::new();
        remote.insert("count".to_string(), Value::Null);
        remote.insert("label".to_string(), Value::Null);

        store.replace(remote);

        assert_eq!(store.get("count"), json!(0));
        assert_eq!(store.get("label"), json!("Clicks"));
    }

    #[test]
    fn test_update_starts_from_the_default() {
        let store = store();

        let stored = store
            .update("count", |current| json!(current.as_i64().unwrap_or(0) + 5))
            .unwrap();

        assert_eq!(stored, json!(5));
        assert_eq!(store.get("count"), json!(5));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_update_rejects_wrong_type_and_leaves_cache() {
        let store = store();
        store.set("count", json!(2)).unwrap();

        let result = store.update("count", |_| json!("two"));

        assert!(matches!(result, Err(SettingsError::TypeMismatch { .. })));
        assert_eq!(store.get("count"), json!(2));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_concurrent_updates_lose_no_increments() {
        // Arrange
        let store = Arc::new(store());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        store
                            .update("count", |current| json!(current.as_i64().unwrap() + 1))
                            .unwrap();
                    }
                })
            })
            .collect();

        // Act
        for worker in workers {
            worker.join().unwrap();
        }

        // Assert
        assert_eq!(store.get("count"), json!(8000));
        assert_eq!(store.revision(), 8000);
    }
}
