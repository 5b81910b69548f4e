//! The graph container.
//!
//! A [`Graph`] owns every element and is the only way to create, change or
//! delete one. Each operation validates all of its references before it
//! touches anything, so a failed call leaves the graph unchanged.
//!
//! # Example
//!
//! ```
//! use trellis_graph::{ElementId, ElementKind, Graph, PropertyMap};
//!
//! let mut graph = Graph::new();
//! let model = ElementId::from("model");
//! let (a, b) = (ElementId::from("a"), ElementId::from("b"));
//! let (ca, cb) = (ElementId::from("ca"), ElementId::from("cb"));
//!
//! graph.add_model(model.clone(), "MODEL_UML", PropertyMap::new(), None)?;
//! graph.add_node(a.clone(), "UML_CLASS", &model, PropertyMap::new())?;
//! graph.add_node(b.clone(), "UML_CLASS", &model, PropertyMap::new())?;
//! graph.add_connector(ca.clone(), "PORT", &a, PropertyMap::new())?;
//! graph.add_connector(cb.clone(), "PORT", &b, PropertyMap::new())?;
//! graph.add_edge("inherits".into(), "UML_INHERITS", &model, &ca, &cb, PropertyMap::new())?;
//!
//! // Deleting a node takes its connectors and their edges with it.
//! graph.delete_node(&a)?;
//! assert!(!graph.has_edge(&"inherits".into()));
//! assert_eq!(graph.element(&model)?.children(ElementKind::Node), vec![b]);
//! # Ok::<(), trellis_graph::GraphError>(())
//! ```

use crate::arena::Arena;
use crate::cascade;
use crate::element::{Element, ElementIndex, ElementKind, ElementRef};
use crate::error::{GraphError, Result};
use crate::id::ElementId;
use crate::property::{Properties, PropertyMap, PropertyValue};
use crate::registry;

/// A typed, hierarchically nested graph of models, nodes, connectors and edges.
///
/// # Ownership
///
/// - A model owns nodes and edges, and may itself be nested under exactly
///   one node or edge.
/// - A node owns connectors and may own nested models.
/// - An edge joins a start and an end connector, lives in one model and may
///   own nested models.
///
/// All relationships are recorded on both sides; see
/// [`ElementRef::parents`] and [`ElementRef::children`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Every live element, addressed by slot and by id.
    arena: Arena,
}

impl Graph {
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the number of elements in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true if the graph has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns true if any element has this id.
    #[must_use]
    pub fn has_element(&self, id: &ElementId) -> bool {
        self.arena.contains(id)
    }

    /// Returns true if a model has this id.
    #[must_use]
    pub fn has_model(&self, id: &ElementId) -> bool {
        self.has_kind(id, ElementKind::Model)
    }

    /// Returns true if a node has this id.
    #[must_use]
    pub fn has_node(&self, id: &ElementId) -> bool {
        self.has_kind(id, ElementKind::Node)
    }

    /// Returns true if a connector has this id.
    #[must_use]
    pub fn has_connector(&self, id: &ElementId) -> bool {
        self.has_kind(id, ElementKind::Connector)
    }

    /// Returns true if an edge has this id.
    #[must_use]
    pub fn has_edge(&self, id: &ElementId) -> bool {
        self.has_kind(id, ElementKind::Edge)
    }

    fn has_kind(&self, id: &ElementId, kind: ElementKind) -> bool {
        self.arena
            .lookup(id)
            .is_some_and(|(_, element)| element.kind() == kind)
    }

    /// Returns a read-only view of an element.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if no element has this id.
    pub fn element(&self, id: &ElementId) -> Result<ElementRef<'_>> {
        let (_, element) = self
            .arena
            .lookup(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        Ok(ElementRef::new(&self.arena, element))
    }

    /// Returns a single property of an element.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if no element has this id.
    pub fn property(&self, id: &ElementId, name: &str) -> Result<Option<&PropertyValue>> {
        let (_, element) = self
            .arena
            .lookup(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        Ok(element.properties.get(name))
    }

    /// Iterates over every element.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.arena
            .iter()
            .map(|(_, element)| ElementRef::new(&self.arena, element))
    }

    /// Returns the ids of every element of one kind.
    #[must_use]
    pub fn ids_of(&self, kind: ElementKind) -> Vec<ElementId> {
        self.arena
            .iter()
            .filter(|(_, element)| element.kind() == kind)
            .map(|(_, element)| element.id.clone())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a model, optionally nested under a node or an edge.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateId`] if `id` is taken.
    /// - [`GraphError::NotFound`] if `parent` is given but is not an
    ///   existing node or edge.
    pub fn add_model(
        &mut self,
        id: ElementId,
        type_tag: impl Into<PropertyValue>,
        properties: PropertyMap,
        parent: Option<&ElementId>,
    ) -> Result<()> {
        self.ensure_vacant(&id)?;
        let parent = match parent {
            Some(parent_id) => {
                let (index, element) = self
                    .arena
                    .lookup(parent_id)
                    .ok_or_else(|| GraphError::NotFound(parent_id.clone()))?;
                if !matches!(element.kind(), ElementKind::Node | ElementKind::Edge) {
                    return Err(GraphError::NotFound(parent_id.clone()));
                }
                Some(index)
            }
            None => None,
        };

        let index = self.insert(id, ElementKind::Model, type_tag, properties);
        if let Some(parent) = parent {
            registry::link(&mut self.arena, parent, index);
        }
        Ok(())
    }

    /// Adds a node to a model.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateId`] if `id` is taken.
    /// - [`GraphError::NotFound`] if `model` does not exist.
    /// - [`GraphError::WrongKind`] if `model` is not a model.
    pub fn add_node(
        &mut self,
        id: ElementId,
        type_tag: impl Into<PropertyValue>,
        model: &ElementId,
        properties: PropertyMap,
    ) -> Result<()> {
        self.ensure_vacant(&id)?;
        let model = self.resolve(model, ElementKind::Model)?;

        let index = self.insert(id, ElementKind::Node, type_tag, properties);
        registry::link(&mut self.arena, model, index);
        Ok(())
    }

    /// Adds a connector to a node.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateId`] if `id` is taken.
    /// - [`GraphError::NotFound`] if `node` does not exist.
    /// - [`GraphError::WrongKind`] if `node` is not a node.
    pub fn add_connector(
        &mut self,
        id: ElementId,
        type_tag: impl Into<PropertyValue>,
        node: &ElementId,
        properties: PropertyMap,
    ) -> Result<()> {
        self.ensure_vacant(&id)?;
        let node = self.resolve(node, ElementKind::Node)?;

        let index = self.insert(id, ElementKind::Connector, type_tag, properties);
        registry::link(&mut self.arena, node, index);
        Ok(())
    }

    /// Adds an edge from `start` to `end` inside a model.
    ///
    /// The connectors may belong to nodes anywhere in the hierarchy,
    /// including other models.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateId`] if `id` is taken.
    /// - [`GraphError::NotFound`] if `model`, `start` or `end` does not exist.
    /// - [`GraphError::WrongKind`] if `model` is not a model or either end
    ///   is not a connector.
    pub fn add_edge(
        &mut self,
        id: ElementId,
        type_tag: impl Into<PropertyValue>,
        model: &ElementId,
        start: &ElementId,
        end: &ElementId,
        properties: PropertyMap,
    ) -> Result<()> {
        self.ensure_vacant(&id)?;
        let model = self.resolve(model, ElementKind::Model)?;
        let start = self.resolve(start, ElementKind::Connector)?;
        let end = self.resolve(end, ElementKind::Connector)?;

        let index = self.insert(id, ElementKind::Edge, type_tag, properties);
        registry::attach_start_connector(&mut self.arena, index, start);
        registry::attach_end_connector(&mut self.arena, index, end);
        registry::link(&mut self.arena, model, index);
        Ok(())
    }

    fn ensure_vacant(&self, id: &ElementId) -> Result<()> {
        if self.arena.contains(id) {
            return Err(GraphError::DuplicateId(id.clone()));
        }
        Ok(())
    }

    /// Looks up an id that must refer to an element of `expected` kind.
    fn resolve(&self, id: &ElementId, expected: ElementKind) -> Result<ElementIndex> {
        let (index, element) = self
            .arena
            .lookup(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        let found = element.kind();
        if found != expected {
            return Err(GraphError::WrongKind {
                id: id.clone(),
                expected,
                found,
            });
        }
        Ok(index)
    }

    fn insert(
        &mut self,
        id: ElementId,
        kind: ElementKind,
        type_tag: impl Into<PropertyValue>,
        properties: PropertyMap,
    ) -> ElementIndex {
        tracing::debug!(id = %id, kind = %kind, "adding element");
        let properties = Properties::new(type_tag, properties);
        self.arena.insert(Element::new(id, kind, properties))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts or replaces a property. Setting `"type"` replaces the type tag.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if no element has this id.
    pub fn set_property(
        &mut self,
        id: &ElementId,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let element = self.element_mut(id)?;
        let name = name.into();
        tracing::debug!(id = %id, property = %name, "setting property");
        element.properties.set(name, value);
        Ok(())
    }

    /// Removes a property, returning its previous value.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NotFound`] if no element has this id.
    /// - [`GraphError::InvariantViolation`] if `name` is `"type"`.
    pub fn delete_property(&mut self, id: &ElementId, name: &str) -> Result<Option<PropertyValue>> {
        let element = self.element_mut(id)?;
        let removed = element.properties.remove(name)?;
        tracing::debug!(id = %id, property = name, existed = removed.is_some(), "deleted property");
        Ok(removed)
    }

    fn element_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        let index = self
            .arena
            .index_of(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        self.arena
            .get_mut(index)
            .ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────────

    /// Deletes a model, its nodes and edges, and everything they own.
    ///
    /// Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::KindMismatch`] if `id` is not a model.
    pub fn delete_model(&mut self, id: &ElementId) -> Result<()> {
        self.delete_as(id, ElementKind::Model)
    }

    /// Deletes a node, its connectors (and their edges) and nested models.
    ///
    /// Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::KindMismatch`] if `id` is not a node.
    pub fn delete_node(&mut self, id: &ElementId) -> Result<()> {
        self.delete_as(id, ElementKind::Node)
    }

    /// Deletes a connector and every edge anchored on it.
    ///
    /// Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::KindMismatch`] if `id` is not a connector.
    pub fn delete_connector(&mut self, id: &ElementId) -> Result<()> {
        self.delete_as(id, ElementKind::Connector)
    }

    /// Deletes an edge and its nested models.
    ///
    /// Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::KindMismatch`] if `id` is not an edge.
    pub fn delete_edge(&mut self, id: &ElementId) -> Result<()> {
        self.delete_as(id, ElementKind::Edge)
    }

    fn delete_as(&mut self, id: &ElementId, requested: ElementKind) -> Result<()> {
        let Some((index, element)) = self.arena.lookup(id) else {
            return Ok(());
        };
        let found = element.kind();
        if found != requested {
            return Err(GraphError::KindMismatch {
                id: id.clone(),
                requested,
                found,
            });
        }

        let plan = cascade::plan(&self.arena, index);
        if plan.is_empty() {
            return Ok(());
        }
        cascade::apply(&mut self.arena, &plan);
        tracing::debug!(
            id = %id,
            kind = %found,
            removed = plan.remove.len(),
            unlinked = plan.unlink.len(),
            "cascade applied"
        );
        Ok(())
    }
}
