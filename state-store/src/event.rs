//! Change notifications for property updates
//!
//! When a property is announced through `PropertyRegistry::notify_changed`,
//! a `ChangeEvent` carrying the property key is emitted.

use std::time::Instant;

/// A change notification for one property
///
/// Events only carry the key, not the value. Use `PropertyRegistry::get()`
/// to read the new value after receiving an event.
///
/// # Example
///
/// ```rust,ignore
/// for event in registry.iter() {
///     let value = registry.get(&event.property_key);
///     println!("{} is now {:?}", event.property_key, value);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The property key that changed
    pub property_key: String,

    /// When the change was announced
    pub timestamp: Instant,
}

impl ChangeEvent {
    /// Create a new change event stamped with the current time
    pub fn new(property_key: impl Into<String>) -> Self {
        Self {
            property_key: property_key.into(),
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for ChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.property_key == other.property_key
    }
}
