//! Property Registry
//!
//! A typed, observable key/value store backing the externally visible model
//! of a device. Each property has a descriptor (label, type, unit, semantic
//! type, allowed values, read-only flag) and a current value.
//!
//! # Features
//!
//! - **Typed values**: boolean, number and string properties, with optional enums
//! - **Write validation**: read-only, type and enum checks for consumer writes
//! - **Change detection**: `update` only notifies when the value actually changed
//! - **Opt-in watching**: only watched properties are queued for `iter()`
//! - **Blocking iteration**: consume change events via blocking iterators
//!
//! # Quick Start
//!
//! ```rust
//! use state_store::{PropertyDescriptor, PropertyRegistry};
//!
//! let registry = PropertyRegistry::new();
//! registry
//!     .register("playing", PropertyDescriptor::boolean("Play/Pause"), false.into())
//!     .unwrap();
//! registry.watch("playing").unwrap();
//!
//! registry.update("playing", true.into()).unwrap();
//!
//! let event = registry.iter().try_recv().unwrap();
//! assert_eq!(event.property_key, "playing");
//! assert_eq!(registry.get_bool("playing"), Some(true));
//! ```
//!
//! # Architecture
//!
//! ```text
//! PropertyRegistry
//!     │
//!     ├── entries: key -> (PropertyDescriptor, PropertyValue)
//!     ├── watched: keys forwarded to the channel
//!     │
//!     └── event_channel: mpsc::channel<ChangeEvent>
//!             │
//!             └── ChangeIterator
//! ```

pub mod error;
pub mod event;
pub mod iter;
pub mod property;
pub mod store;

pub use error::{RegistryError, Result};
pub use event::ChangeEvent;
pub use iter::{ChangeIterator, TimeoutIter, TryIter};
pub use property::{PropertyDescriptor, PropertyValue, ValueType};
pub use store::PropertyRegistry;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::RegistryError;
    pub use crate::event::ChangeEvent;
    pub use crate::iter::ChangeIterator;
    pub use crate::property::{PropertyDescriptor, PropertyValue, ValueType};
    pub use crate::store::PropertyRegistry;
}
