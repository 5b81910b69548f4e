//! A typed, hierarchically nested diagram graph.
//!
//! Models contain nodes, nodes own connectors, edges join connectors, and
//! any node or edge may carry a nested model of its own. Deletes cascade to
//! exactly the dependent elements, and a whole graph converts to and from a
//! flat JSON interchange document.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut graph = Graph::new();
//! graph.add_model("m".into(), "MODEL", PropertyMap::new(), None)?;
//! let doc = graph.serialize();
//! assert_eq!(Graph::deserialize(&doc)?.serialize(), doc);
//! # Ok::<(), GraphError>(())
//! ```

pub use trellis_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use trellis_internal::prelude::*;
}
