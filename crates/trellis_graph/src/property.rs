//! Element property bags.
//!
//! Every element carries an open, string-keyed map of values. One key is
//! special: `"type"` holds the caller-supplied type tag (e.g. `"UML_CLASS"`)
//! and must always be present. [`Properties`] keeps the tag in its own field
//! so it cannot go missing, and refuses to remove it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Name of the property that carries an element's type tag.
pub const TYPE_KEY: &str = "type";

/// Ordered map of property names to values.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single property value.
///
/// Serialized untagged, so a document reads as plain JSON. Numbers are kept
/// as [`serde_json::Number`] so integers and floats survive a round trip
/// without conversion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicit absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer or floating point number.
    Number(serde_json::Number),
    /// A string.
    String(String),
    /// An ordered list of values.
    List(Vec<PropertyValue>),
    /// A nested string-keyed document.
    Document(PropertyMap),
}

impl PropertyValue {
    /// Returns the string slice if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this value is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns true for [`PropertyValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value.into())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(value.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::Number(value.into())
    }
}

/// Non-finite floats have no JSON representation and become [`PropertyValue::Null`].
impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(PropertyValue::Null, PropertyValue::Number)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        PropertyValue::Document(value)
    }
}

/// The property bag of one element.
///
/// The `"type"` entry lives in a dedicated field; every other entry lives in
/// an ordinary map. Reads and writes through [`get`](Self::get) and
/// [`set`](Self::set) treat both uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    type_tag: PropertyValue,
    entries: PropertyMap,
}

impl Properties {
    /// Builds a bag from a type tag and any further entries.
    ///
    /// A `"type"` entry inside `entries` is overridden by `type_tag`.
    #[must_use]
    pub fn new(type_tag: impl Into<PropertyValue>, mut entries: PropertyMap) -> Self {
        entries.remove(TYPE_KEY);
        Self {
            type_tag: type_tag.into(),
            entries,
        }
    }

    /// Returns the type tag.
    #[must_use]
    pub fn type_tag(&self) -> &PropertyValue {
        &self.type_tag
    }

    /// Returns a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        if name == TYPE_KEY {
            Some(&self.type_tag)
        } else {
            self.entries.get(name)
        }
    }

    /// Returns true if the property exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == TYPE_KEY || self.entries.contains_key(name)
    }

    /// Inserts or replaces a property. Setting `"type"` replaces the type tag.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        if name == TYPE_KEY {
            self.type_tag = value;
        } else {
            self.entries.insert(name, value);
        }
    }

    /// Removes a property. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvariantViolation`] when `name` is `"type"`.
    pub fn remove(&mut self, name: &str) -> Result<Option<PropertyValue>> {
        if name == TYPE_KEY {
            return Err(GraphError::invariant_violation(
                "the \"type\" property cannot be deleted",
            ));
        }
        Ok(self.entries.remove(name))
    }

    /// Returns the number of properties, the type tag included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Always false: the type tag is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over all properties, the type tag first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        core::iter::once((TYPE_KEY, &self.type_tag))
            .chain(self.entries.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Returns the full property map, `"type"` included.
    #[must_use]
    pub fn to_map(&self) -> PropertyMap {
        let mut map = self.entries.clone();
        map.insert(TYPE_KEY.to_owned(), self.type_tag.clone());
        map
    }
}
