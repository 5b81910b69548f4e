//! Element kinds and read-only element views.
//!
//! A graph holds four kinds of element: models (diagram scopes), nodes
//! (vertices owned by a model), connectors (attachment points owned by a
//! node) and edges (links between two connectors). Elements are stored
//! internally by the graph; callers only ever see them through an
//! [`ElementRef`], which exposes read queries and nothing else. All
//! mutation goes through [`Graph`](crate::graph::Graph).

use core::fmt;

use crate::arena::Arena;
use crate::id::ElementId;
use crate::property::{Properties, PropertyValue};
use crate::registry::{Adjacency, EdgeEnds};

/// The fixed kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// A diagram or sub-diagram scope.
    Model,
    /// A vertex owned by a model.
    Node,
    /// An attachment point owned by a node.
    Connector,
    /// A link between two connectors, owned by a model.
    Edge,
}

impl ElementKind {
    /// All kinds, in document order.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Model,
        ElementKind::Node,
        ElementKind::Edge,
        ElementKind::Connector,
    ];

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Model => "model",
            ElementKind::Node => "node",
            ElementKind::Connector => "connector",
            ElementKind::Edge => "edge",
        }
    }

    /// Position of this kind inside per-kind adjacency arrays.
    pub(crate) fn slot(self) -> usize {
        match self {
            ElementKind::Model => 0,
            ElementKind::Node => 1,
            ElementKind::Connector => 2,
            ElementKind::Edge => 3,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an element inside the graph's arena.
///
/// Only meaningful while the element is alive; slots are reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ElementIndex(pub(crate) u32);

impl ElementIndex {
    pub(crate) fn get(self) -> usize {
        self.0 as usize
    }
}

/// Kind-specific element state.
#[derive(Debug, Clone)]
pub(crate) enum Variant {
    Model,
    Node,
    Connector,
    Edge(EdgeEnds),
}

impl Variant {
    pub(crate) fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Model => Variant::Model,
            ElementKind::Node => Variant::Node,
            ElementKind::Connector => Variant::Connector,
            ElementKind::Edge => Variant::Edge(EdgeEnds::default()),
        }
    }
}

/// A stored element: identity, properties and adjacency.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) id: ElementId,
    pub(crate) variant: Variant,
    pub(crate) properties: Properties,
    pub(crate) adjacency: Adjacency,
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, properties: Properties) -> Self {
        Self {
            id,
            variant: Variant::for_kind(kind),
            properties,
            adjacency: Adjacency::default(),
        }
    }

    pub(crate) fn kind(&self) -> ElementKind {
        match self.variant {
            Variant::Model => ElementKind::Model,
            Variant::Node => ElementKind::Node,
            Variant::Connector => ElementKind::Connector,
            Variant::Edge(_) => ElementKind::Edge,
        }
    }

    pub(crate) fn edge_ends(&self) -> Option<&EdgeEnds> {
        match &self.variant {
            Variant::Edge(ends) => Some(ends),
            _ => None,
        }
    }

    /// Connector neighbours with an edge's start and end pinned to the front.
    pub(crate) fn connector_indices(&self) -> Vec<ElementIndex> {
        let mut out = Vec::new();
        if let Some(ends) = self.edge_ends() {
            out.extend(ends.start());
            out.extend(ends.end());
        }
        let rest = self
            .adjacency
            .parents(ElementKind::Connector)
            .iter()
            .chain(self.adjacency.children(ElementKind::Connector));
        for &index in rest {
            if !out.contains(&index) {
                out.push(index);
            }
        }
        out
    }
}

/// Read-only view of one element.
///
/// Neighbour queries return ids in no particular order, except
/// [`connector_neighbours`](Self::connector_neighbours) on an edge, which
/// always yields `[start, end, ..]`.
#[derive(Clone, Copy)]
pub struct ElementRef<'g> {
    arena: &'g Arena,
    element: &'g Element,
}

impl<'g> ElementRef<'g> {
    pub(crate) fn new(arena: &'g Arena, element: &'g Element) -> Self {
        Self { arena, element }
    }

    /// Returns the element's id.
    #[must_use]
    pub fn id(&self) -> &'g ElementId {
        &self.element.id
    }

    /// Returns the element's kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    /// Returns the element's property bag.
    #[must_use]
    pub fn properties(&self) -> &'g Properties {
        &self.element.properties
    }

    /// Returns a single property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'g PropertyValue> {
        self.element.properties.get(name)
    }

    /// Returns the `"type"` property.
    #[must_use]
    pub fn type_tag(&self) -> &'g PropertyValue {
        self.element.properties.type_tag()
    }

    /// Returns the parent neighbours of the given kind.
    #[must_use]
    pub fn parents(&self, kind: ElementKind) -> Vec<ElementId> {
        self.resolve(self.element.adjacency.parents(kind).iter().copied())
    }

    /// Returns the child neighbours of the given kind.
    #[must_use]
    pub fn children(&self, kind: ElementKind) -> Vec<ElementId> {
        self.resolve(self.element.adjacency.children(kind).iter().copied())
    }

    /// Returns parent and child neighbours of the given kind, parents first.
    #[must_use]
    pub fn neighbours(&self, kind: ElementKind) -> Vec<ElementId> {
        let adjacency = &self.element.adjacency;
        let mut indices: Vec<ElementIndex> = adjacency.parents(kind).iter().copied().collect();
        for &index in adjacency.children(kind) {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        self.resolve(indices)
    }

    /// Returns every neighbour of every kind.
    #[must_use]
    pub fn all_neighbours(&self) -> Vec<ElementId> {
        ElementKind::ALL
            .into_iter()
            .flat_map(|kind| self.neighbours(kind))
            .collect()
    }

    /// Returns the connector neighbours.
    ///
    /// For an edge the first two entries are always the start and end
    /// connectors, followed by any other connector neighbours.
    #[must_use]
    pub fn connector_neighbours(&self) -> Vec<ElementId> {
        self.resolve(self.element.connector_indices())
    }

    /// Returns the start connector of an edge.
    #[must_use]
    pub fn start_connector(&self) -> Option<ElementId> {
        let start = self.element.edge_ends()?.start()?;
        self.arena.get(start).map(|e| e.id.clone())
    }

    /// Returns the end connector of an edge.
    #[must_use]
    pub fn end_connector(&self) -> Option<ElementId> {
        let end = self.element.edge_ends()?.end()?;
        self.arena.get(end).map(|e| e.id.clone())
    }

    fn resolve(&self, indices: impl IntoIterator<Item = ElementIndex>) -> Vec<ElementId> {
        indices
            .into_iter()
            .filter_map(|index| self.arena.get(index).map(|e| e.id.clone()))
            .collect()
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.element.id)
            .field("kind", &self.kind())
            .field("properties", &self.element.properties)
            .finish()
    }
}
