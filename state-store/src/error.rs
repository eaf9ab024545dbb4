//! Error types for the property registry

use thiserror::Error;

use crate::property::ValueType;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised by the property registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No property registered under this key
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// A property with this key already exists
    #[error("Property already registered: {0}")]
    AlreadyRegistered(String),

    /// Consumer write to a read-only property
    #[error("Read only property: {0}")]
    ReadOnly(String),

    /// Value does not match the declared type
    #[error("Property '{key}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// Value is outside the property's allowed enum values
    #[error("Value {value} is not allowed for property '{key}'")]
    NotInEnum { key: String, value: String },

    /// Internal lock poisoned
    #[error("Property registry lock poisoned")]
    LockPoisoned,
}
