//! Typed property storage with change notification
//!
//! `PropertyRegistry` owns every property of one device. It separates the two
//! write paths a device model has:
//!
//! - **device → model**: `set_cached_value` / `update` always succeed (the
//!   device is the source of truth, read-only flags do not apply)
//! - **consumer → device**: `validate_write` enforces read-only, type and
//!   enum constraints before anything is sent to the device

use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc, Mutex, RwLock};

use crate::error::{RegistryError, Result};
use crate::event::ChangeEvent;
use crate::iter::ChangeIterator;
use crate::property::{PropertyDescriptor, PropertyValue};

#[derive(Debug, Clone)]
struct PropertyEntry {
    descriptor: PropertyDescriptor,
    value: PropertyValue,
}

#[derive(Debug, Default)]
struct Entries {
    /// Keys in registration order
    order: Vec<String>,
    by_key: HashMap<String, PropertyEntry>,
}

/// Registry of typed, observable properties for a single device
///
/// Cloning is cheap and clones share state.
///
/// # Example
///
/// ```rust
/// use state_store::{PropertyDescriptor, PropertyRegistry, PropertyValue};
///
/// let registry = PropertyRegistry::new();
/// registry
///     .register("volume", PropertyDescriptor::number("Volume").with_unit("percent"), 100u8.into())
///     .unwrap();
///
/// registry.watch("volume").unwrap();
///
/// // Only changed values are announced
/// assert!(registry.update("volume", 40u8.into()).unwrap());
/// assert!(!registry.update("volume", 40u8.into()).unwrap());
/// assert_eq!(registry.iter().try_iter().count(), 1);
///
/// assert_eq!(registry.get("volume"), Some(PropertyValue::Number(40.0)));
/// ```
pub struct PropertyRegistry {
    entries: Arc<RwLock<Entries>>,

    /// Keys whose changes are sent to `iter()`
    watched: Arc<RwLock<HashSet<String>>>,

    /// Channel sender for change events
    event_tx: mpsc::Sender<ChangeEvent>,

    /// Channel receiver for change events (wrapped for cloning)
    event_rx: Arc<Mutex<mpsc::Receiver<ChangeEvent>>>,
}

impl PropertyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            watched: Arc::new(RwLock::new(HashSet::new())),
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Register a property with its descriptor and initial value
    pub fn register(
        &self,
        key: impl Into<String>,
        descriptor: PropertyDescriptor,
        initial: PropertyValue,
    ) -> Result<()> {
        let key = key.into();
        if initial.value_type() != descriptor.value_type {
            return Err(RegistryError::TypeMismatch {
                key,
                expected: descriptor.value_type,
                actual: initial.value_type(),
            });
        }

        let mut entries = self.entries.write().map_err(|_| lock_error(&key))?;
        if entries.by_key.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered(key));
        }

        tracing::debug!("Registering property {} = {}", key, initial);
        entries.order.push(key.clone());
        entries.by_key.insert(
            key,
            PropertyEntry {
                descriptor,
                value: initial,
            },
        );
        Ok(())
    }

    /// Current value of a property
    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        let entries = self.entries.read().ok()?;
        entries.by_key.get(key).map(|e| e.value.clone())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Descriptor of a property
    pub fn descriptor(&self, key: &str) -> Option<PropertyDescriptor> {
        let entries = self.entries.read().ok()?;
        entries.by_key.get(key).map(|e| e.descriptor.clone())
    }

    /// Check whether a property exists
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.by_key.contains_key(key))
            .unwrap_or(false)
    }

    /// Check a consumer write against the property's constraints
    ///
    /// Never mutates the registry.
    pub fn validate_write(&self, key: &str, value: &PropertyValue) -> Result<()> {
        let descriptor = self
            .descriptor(key)
            .ok_or_else(|| RegistryError::UnknownProperty(key.to_string()))?;

        if descriptor.read_only {
            return Err(RegistryError::ReadOnly(key.to_string()));
        }
        if value.value_type() != descriptor.value_type {
            return Err(RegistryError::TypeMismatch {
                key: key.to_string(),
                expected: descriptor.value_type,
                actual: value.value_type(),
            });
        }
        if !descriptor.allows(value) {
            return Err(RegistryError::NotInEnum {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    /// Store a value without notifying anyone
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_cached_value(&self, key: &str, value: PropertyValue) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| lock_error(key))?;
        let entry = entries
            .by_key
            .get_mut(key)
            .ok_or_else(|| RegistryError::UnknownProperty(key.to_string()))?;

        if entry.descriptor.value_type != value.value_type() {
            return Err(RegistryError::TypeMismatch {
                key: key.to_string(),
                expected: entry.descriptor.value_type,
                actual: value.value_type(),
            });
        }

        if entry.value != value {
            entry.value = value;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Start sending changes of `key` to `iter()`
    pub fn watch(&self, key: &str) -> Result<()> {
        if !self.contains(key) {
            return Err(RegistryError::UnknownProperty(key.to_string()));
        }
        let mut watched = self.watched.write().map_err(|_| lock_error(key))?;
        watched.insert(key.to_string());
        Ok(())
    }

    /// Watch every registered property
    pub fn watch_all(&self) -> Result<()> {
        let keys = self.keys();
        let mut watched = self.watched.write().map_err(|_| lock_error("*"))?;
        watched.extend(keys);
        Ok(())
    }

    /// Stop sending changes of `key`; events already queued stay queued
    pub fn unwatch(&self, key: &str) {
        if let Ok(mut watched) = self.watched.write() {
            watched.remove(key);
        }
    }

    pub fn is_watched(&self, key: &str) -> bool {
        self.watched
            .read()
            .map(|w| w.contains(key))
            .unwrap_or(false)
    }

    /// Announce that a property changed, if anyone watches it
    pub fn notify_changed(&self, key: &str) {
        if self.is_watched(key) {
            let _ = self.event_tx.send(ChangeEvent::new(key));
        }
    }

    /// Store a value and announce it to watchers, but only if it changed
    ///
    /// Returns `true` if the stored value changed.
    pub fn update(&self, key: &str, value: PropertyValue) -> Result<bool> {
        let changed = self.set_cached_value(key, value)?;
        if changed {
            self.notify_changed(key);
        }
        Ok(changed)
    }

    /// Promote a property to read-only
    pub fn mark_read_only(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| lock_error(key))?;
        let entry = entries
            .by_key
            .get_mut(key)
            .ok_or_else(|| RegistryError::UnknownProperty(key.to_string()))?;
        entry.descriptor.read_only = true;
        Ok(())
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.order.clone())
            .unwrap_or_default()
    }

    /// Number of registered properties
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptors of all properties as a JSON object keyed by property
    pub fn describe(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Ok(entries) = self.entries.read() {
            for key in &entries.order {
                if let Some(entry) = entries.by_key.get(key) {
                    let description =
                        serde_json::to_value(&entry.descriptor).unwrap_or(serde_json::Value::Null);
                    map.insert(key.clone(), description);
                }
            }
        }
        serde_json::Value::Object(map)
    }

    /// Create a blocking iterator over change events of watched properties
    pub fn iter(&self) -> ChangeIterator {
        ChangeIterator::new(Arc::clone(&self.event_rx))
    }
}

fn lock_error(key: &str) -> RegistryError {
    tracing::warn!("Property registry lock poisoned while accessing {}", key);
    RegistryError::LockPoisoned
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PropertyRegistry {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            watched: Arc::clone(&self.watched),
            event_tx: self.event_tx.clone(),
            event_rx: Arc::clone(&self.event_rx),
        }
    }
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("property_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ValueType;
    use rstest::rstest;
    use std::time::Duration;

    fn registry() -> PropertyRegistry {
        let registry = PropertyRegistry::new();
        registry
            .register("volume", PropertyDescriptor::number("Volume"), 100u8.into())
            .unwrap();
        registry
            .register("playing", PropertyDescriptor::boolean("Play/Pause"), false.into())
            .unwrap();
        registry
            .register(
                "repeat",
                PropertyDescriptor::string("Repeat").with_enum(["None", "One", "All"]),
                "None".into(),
            )
            .unwrap();
        registry
            .register(
                "track",
                PropertyDescriptor::string("Track").read_only(),
                "".into(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get_number("volume"), Some(100.0));
        assert_eq!(registry.get_bool("playing"), Some(false));
        assert_eq!(registry.get_string("repeat"), Some("None".to_string()));
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_initial() {
        let registry = registry();
        assert_eq!(
            registry.register("volume", PropertyDescriptor::number("Volume"), 1u8.into()),
            Err(RegistryError::AlreadyRegistered("volume".into()))
        );
        assert!(matches!(
            registry.register("mute", PropertyDescriptor::boolean("Mute"), "no".into()),
            Err(RegistryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_keys_keep_registration_order() {
        assert_eq!(registry().keys(), vec!["volume", "playing", "repeat", "track"]);
    }

    #[rstest]
    #[case("track", PropertyValue::from("Song"), RegistryError::ReadOnly("track".into()))]
    #[case("missing", PropertyValue::from(true), RegistryError::UnknownProperty("missing".into()))]
    #[case(
        "repeat",
        PropertyValue::from("Twice"),
        RegistryError::NotInEnum { key: "repeat".into(), value: "\"Twice\"".into() }
    )]
    #[case(
        "playing",
        PropertyValue::from(1u8),
        RegistryError::TypeMismatch {
            key: "playing".into(),
            expected: ValueType::Boolean,
            actual: ValueType::Number,
        }
    )]
    fn test_validate_write_rejections(
        #[case] key: &str,
        #[case] value: PropertyValue,
        #[case] expected: RegistryError,
    ) {
        assert_eq!(registry().validate_write(key, &value), Err(expected));
    }

    #[test]
    fn test_validate_write_accepts_valid_values() {
        let registry = registry();
        assert!(registry.validate_write("repeat", &"All".into()).is_ok());
        assert!(registry.validate_write("volume", &55u8.into()).is_ok());
    }

    #[test]
    fn test_cached_value_bypasses_read_only() {
        let registry = registry();
        assert_eq!(registry.set_cached_value("track", "Song".into()), Ok(true));
        assert_eq!(registry.get_string("track"), Some("Song".to_string()));
    }

    #[test]
    fn test_set_cached_value_is_silent() {
        let registry = registry();
        registry.set_cached_value("volume", 20u8.into()).unwrap();
        assert!(registry.iter().try_recv().is_none());
    }

    #[test]
    fn test_update_notifies_only_on_change() {
        let registry = registry();
        registry.watch("volume").unwrap();
        let iter = registry.iter();

        assert_eq!(registry.update("volume", 30u8.into()), Ok(true));
        let event = iter.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(event.property_key, "volume");

        assert_eq!(registry.update("volume", 30u8.into()), Ok(false));
        assert!(iter.recv_timeout(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_unwatched_changes_are_not_queued() {
        let registry = registry();
        for level in 0..1000u32 {
            registry.update("volume", f64::from(level % 100).into()).unwrap();
        }
        assert_eq!(registry.iter().try_iter().count(), 0);

        registry.watch("playing").unwrap();
        registry.update("volume", 55u8.into()).unwrap();
        registry.update("playing", true.into()).unwrap();
        let keys: Vec<_> = registry.iter().try_iter().map(|e| e.property_key).collect();
        assert_eq!(keys, vec!["playing"]);
    }

    #[test]
    fn test_watch_and_unwatch() {
        let registry = registry();
        assert!(!registry.is_watched("volume"));
        assert_eq!(
            registry.watch("missing"),
            Err(RegistryError::UnknownProperty("missing".into()))
        );

        registry.watch_all().unwrap();
        assert!(registry.is_watched("volume"));
        assert!(registry.is_watched("track"));

        registry.unwatch("volume");
        registry.update("volume", 1u8.into()).unwrap();
        assert!(registry.iter().try_recv().is_none());

        // Clones share the watch set
        let cloned = registry.clone();
        cloned.update("track", "Song".into()).unwrap();
        assert_eq!(registry.iter().try_recv().unwrap().property_key, "track");
    }

    #[test]
    fn test_mark_read_only() {
        let registry = registry();
        registry.mark_read_only("volume").unwrap();
        assert_eq!(
            registry.validate_write("volume", &10u8.into()),
            Err(RegistryError::ReadOnly("volume".into()))
        );
    }

    #[test]
    fn test_describe_lists_every_property() {
        let description = registry().describe();
        assert_eq!(description["track"]["readOnly"], true);
        assert_eq!(description["repeat"]["enum"][2], "All");
        assert_eq!(description["volume"]["type"], "number");
    }

    #[test]
    fn test_clone_shares_state() {
        let registry = registry();
        let cloned = registry.clone();
        registry.update("playing", true.into()).unwrap();
        assert_eq!(cloned.get_bool("playing"), Some(true));
    }
}
