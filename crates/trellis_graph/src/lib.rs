//! Typed, hierarchically nested element graph for Trellis.
//!
//! `trellis_graph` holds the data structure behind a diagram: models that
//! contain nodes, nodes that own connectors, edges that join connectors, and
//! models nested under nodes or edges as sub-diagrams.
//!
//! # Core Concepts
//!
//! - [`Graph`] - Owning container with validated create, mutate and delete operations
//! - [`ElementKind`] - The four element kinds: model, node, connector, edge
//! - [`ElementRef`] - Read-only view of one element and its neighbours
//! - [`Properties`] - Property bag with a protected `"type"` tag
//! - [`InterchangeGraph`] - Flat document produced by [`Graph::serialize`]
//!   and consumed by [`Graph::deserialize`]
//!
//! # Example
//!
//! ```
//! use trellis_graph::{ElementId, Graph, PropertyMap};
//!
//! let mut graph = Graph::new();
//! let root = ElementId::from("root");
//! let class = ElementId::from("class");
//! graph.add_model(root.clone(), "MODEL_UML", PropertyMap::new(), None)?;
//! graph.add_node(class.clone(), "UML_CLASS", &root, PropertyMap::new())?;
//! graph.add_model("detail".into(), "MODEL_UML", PropertyMap::new(), Some(&class))?;
//!
//! let json = graph.serialize().to_json_string()?;
//! let restored = Graph::deserialize(&trellis_graph::InterchangeGraph::from_json_str(&json)?)?;
//! assert_eq!(restored.serialize(), graph.serialize());
//!
//! graph.delete_node(&class)?;
//! assert_eq!(graph.len(), 1);
//! # Ok::<(), trellis_graph::GraphError>(())
//! ```
//!
//! # Deletion
//!
//! Deleting an element removes exactly the elements that depend on it:
//!
//! - a model takes its nodes and edges with it
//! - a node takes its connectors and nested models
//! - a connector takes the edges anchored on it
//! - an edge takes its nested models
//!
//! Deleting an id that is already gone is a no-op.

mod arena;
mod cascade;
mod registry;

/// Element kinds and read-only element views.
pub mod element;

/// Error types.
pub mod error;

/// The graph container.
pub mod graph;

/// Element identifiers.
pub mod id;

/// Interchange document and (de)serialization.
pub mod interchange;

/// Element property bags.
pub mod property;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::element::{ElementKind, ElementRef};
    pub use crate::error::{GraphError, Result};
    pub use crate::graph::Graph;
    pub use crate::id::ElementId;
    pub use crate::interchange::{ElementRecord, InterchangeGraph, NeighbourLists, Neighbours};
    pub use crate::property::{Properties, PropertyMap, PropertyValue, TYPE_KEY};
}

// Re-export key types at crate root for convenience
pub use element::{ElementKind, ElementRef};
pub use error::{GraphError, Result};
pub use graph::Graph;
pub use id::ElementId;
pub use interchange::{ElementRecord, InterchangeGraph, NeighbourLists, Neighbours};
pub use property::{Properties, PropertyMap, PropertyValue, TYPE_KEY};
