//! Shared, lock-protected graph access.
//!
//! [`Graph`] itself is a plain single-threaded value. [`SharedGraph`] puts
//! one behind an `Arc<RwLock<_>>` so several threads can hold it: readers
//! proceed in parallel, writers get exclusive access, and every call into
//! the graph runs to completion under the lock.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use trellis_graph::{Graph, InterchangeGraph, Result};

/// A [`Graph`] shared between threads.
///
/// Cloning a `SharedGraph` yields another handle to the same graph.
///
/// # Example
///
/// ```
/// use trellis_core::SharedGraph;
/// use trellis_graph::{ElementId, PropertyMap};
///
/// let shared = SharedGraph::default();
/// let handle = shared.clone();
///
/// std::thread::spawn(move || {
///     handle
///         .write()
///         .add_model(ElementId::from("m"), "MODEL", PropertyMap::new(), None)
/// })
/// .join()
/// .unwrap()?;
///
/// assert!(shared.read().has_model(&ElementId::from("m")));
/// # Ok::<(), trellis_graph::GraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    /// Wraps an existing graph.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Acquires shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.inner.read()
    }

    /// Acquires exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.inner.write()
    }

    /// Serializes the graph under a read lock.
    #[must_use]
    pub fn snapshot(&self) -> InterchangeGraph {
        self.inner.read().serialize()
    }

    /// Replaces the graph with one restored from `doc`.
    ///
    /// The document is restored before the write lock is taken; on error
    /// the current graph is kept.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MalformedDocument`](trellis_graph::GraphError::MalformedDocument)
    /// if the document cannot be restored.
    pub fn restore(&self, doc: &InterchangeGraph) -> Result<()> {
        let graph = Graph::deserialize(doc)?;
        *self.inner.write() = graph;
        tracing::debug!(elements = doc.element_count(), "shared graph replaced");
        Ok(())
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_graph::{ElementId, ElementKind, GraphError, PropertyMap};

    fn id(s: &str) -> ElementId {
        ElementId::from(s)
    }

    #[test]
    fn clones_share_one_graph() {
        let shared = SharedGraph::default();
        let other = shared.clone();
        other
            .write()
            .add_model(id("m"), "M", PropertyMap::new(), None)
            .unwrap();
        assert_eq!(shared.read().len(), 1);
    }

    #[test]
    fn concurrent_writers_all_land() {
        let shared = SharedGraph::default();
        shared
            .write()
            .add_model(id("m"), "M", PropertyMap::new(), None)
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .write()
                        .add_node(id(&format!("n{i}")), "N", &id("m"), PropertyMap::new())
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let graph = shared.read();
        assert_eq!(graph.len(), 9);
        let model = graph.element(&id("m")).unwrap();
        assert_eq!(model.children(ElementKind::Node).len(), 8);
    }

    #[test]
    fn restore_swaps_in_document() {
        let mut graph = Graph::new();
        graph.add_model(id("a"), "M", PropertyMap::new(), None).unwrap();
        let doc = graph.serialize();

        let shared = SharedGraph::default();
        shared.restore(&doc).unwrap();
        assert_eq!(shared.snapshot(), doc);
    }

    #[test]
    fn failed_restore_keeps_current_graph() {
        let shared = SharedGraph::default();
        shared
            .write()
            .add_model(id("keep"), "M", PropertyMap::new(), None)
            .unwrap();
        let before = shared.snapshot();

        let mut doc = InterchangeGraph::default();
        doc.models.insert(
            id("bad"),
            trellis_graph::ElementRecord {
                id: id("bad"),
                ..Default::default()
            },
        );
        assert!(matches!(
            shared.restore(&doc),
            Err(GraphError::MalformedDocument(_))
        ));
        assert_eq!(shared.snapshot(), before);
    }
}
