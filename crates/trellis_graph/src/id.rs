//! Element identifiers.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier for an element in the graph.
///
/// Identifiers are always supplied by the caller: the [`Graph`](crate::graph::Graph)
/// never invents one. [`ElementId::new`] is the provider callers use to obtain
/// fresh ids; it is backed by nanoid, so ids from independent sources do not
/// collide without coordination.
///
/// Internally uses `Arc<str>` for cheap cloning (reference count bump only).
/// Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(Arc<str>);

impl ElementId {
    /// Creates a new element ID with a unique nanoid.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Creates an element ID from a specific string value.
    ///
    /// Used when restoring interchange documents and in tests.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::from_string(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self::from_string(id)
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_the_raw_string() {
        let id = ElementId::from_string("model-1");
        assert_eq!(id.to_string(), "model-1");
        assert_eq!(id.as_str(), "model-1");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ElementId::from("node-7");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"node-7\"");

        let back: ElementId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
