//! Property values and descriptors
//!
//! A property is a named, typed value owned by a [`PropertyRegistry`](crate::PropertyRegistry).
//! The descriptor carries everything a consumer needs to render or validate
//! the property: label, value type, unit, semantic type, allowed enum values
//! and whether writes are accepted at all.
//!
//! # Example
//!
//! ```rust
//! use state_store::{PropertyDescriptor, PropertyValue, ValueType};
//!
//! let repeat = PropertyDescriptor::string("Repeat")
//!     .with_semantic_type("EnumProperty")
//!     .with_enum(["None", "One", "All"]);
//!
//! assert_eq!(repeat.value_type, ValueType::String);
//! assert!(repeat.allows(&PropertyValue::from("One")));
//! assert!(!repeat.allows(&PropertyValue::from("Twice")));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Number,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
        };
        f.write_str(name)
    }
}

/// A property value
///
/// Serialized untagged so it maps directly onto JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// The value type this value belongs to
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Bool(_) => ValueType::Boolean,
            PropertyValue::Number(_) => ValueType::Number,
            PropertyValue::String(_) => ValueType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<u8> for PropertyValue {
    fn from(value: u8) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

/// Static description of a registered property
///
/// Serializes to the description shape consumers expect:
/// `{"title", "type", "unit", "@type", "enum", "readOnly"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Human-readable label
    #[serde(rename = "title")]
    pub label: String,

    /// Scalar type of the value
    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Optional unit (e.g. "percent")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,

    /// Semantic annotation (e.g. "LevelProperty", "BooleanProperty")
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none", default)]
    pub semantic_type: Option<String>,

    /// Allowed values for enum properties
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none", default)]
    pub enum_values: Option<Vec<PropertyValue>>,

    /// Whether writes from consumers are rejected
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
}

impl PropertyDescriptor {
    /// Create a descriptor of the given type
    pub fn new(label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            label: label.into(),
            value_type,
            unit: None,
            semantic_type: None,
            enum_values: None,
            read_only: false,
        }
    }

    pub fn boolean(label: impl Into<String>) -> Self {
        Self::new(label, ValueType::Boolean)
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::new(label, ValueType::Number)
    }

    pub fn string(label: impl Into<String>) -> Self {
        Self::new(label, ValueType::String)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    /// Restrict the property to a fixed set of values
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PropertyValue>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the property as read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Check whether a value is acceptable for this descriptor
    ///
    /// The value must have the descriptor's type and, for enum properties,
    /// be one of the allowed values.
    pub fn allows(&self, value: &PropertyValue) -> bool {
        if value.value_type() != self.value_type {
            return false;
        }
        match &self.enum_values {
            Some(allowed) => allowed.contains(value),
            None => true,
        }
    }
}
