//! The interchange document and graph (de)serialization.
//!
//! [`Graph::serialize`] flattens a graph into an [`InterchangeGraph`]: one
//! record per element, bucketed by kind, each carrying its id, its full
//! property map and all eight neighbour lists. [`Graph::deserialize`] rebuilds
//! an independent graph from such a document.
//!
//! Output is canonical. Every neighbour list is sorted by id, except an
//! edge's `connectors.parent`, which always starts with `[start, end]`. Two
//! graphs with the same content therefore serialize to equal documents no
//! matter in which order their elements were created.
//!
//! # Restore order
//!
//! Restoring is a breadth-first walk from the root models (models with no
//! parent node and no parent edge). A node's connectors are created in the
//! same step as the node. After an element is created its child models,
//! nodes and edges are queued. An edge whose connectors live in a part of
//! the hierarchy that has not been reached yet is moved to the back of the
//! queue; if the whole queue is waiting on elements that never appear, the
//! document is rejected.

use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::element::{Element, ElementIndex, ElementKind};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::id::ElementId;
use crate::property::{PropertyMap, PropertyValue, TYPE_KEY};

// ─────────────────────────────────────────────────────────────────────────────
// Document types
// ─────────────────────────────────────────────────────────────────────────────

/// Flat, serializable form of a whole graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchangeGraph {
    /// Model records keyed by id.
    pub models: BTreeMap<ElementId, ElementRecord>,
    /// Node records keyed by id.
    pub nodes: BTreeMap<ElementId, ElementRecord>,
    /// Edge records keyed by id.
    pub edges: BTreeMap<ElementId, ElementRecord>,
    /// Connector records keyed by id.
    pub connectors: BTreeMap<ElementId, ElementRecord>,
}

/// One serialized element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRecord {
    /// The element's id. Must match the key it is stored under.
    pub id: ElementId,
    /// All properties, `"type"` included.
    pub properties: PropertyMap,
    /// Parent and child neighbours, per neighbour kind.
    pub neighbours: Neighbours,
}

/// The eight neighbour lists of one record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Neighbours {
    /// Model neighbours.
    pub models: NeighbourLists,
    /// Node neighbours.
    pub nodes: NeighbourLists,
    /// Edge neighbours.
    pub edges: NeighbourLists,
    /// Connector neighbours.
    pub connectors: NeighbourLists,
}

/// Parent and child ids for one neighbour kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighbourLists {
    /// Neighbours this element depends on.
    pub parent: Vec<ElementId>,
    /// Neighbours that depend on this element.
    pub child: Vec<ElementId>,
}

impl Neighbours {
    /// Returns the lists for one neighbour kind.
    #[must_use]
    pub fn of(&self, kind: ElementKind) -> &NeighbourLists {
        match kind {
            ElementKind::Model => &self.models,
            ElementKind::Node => &self.nodes,
            ElementKind::Edge => &self.edges,
            ElementKind::Connector => &self.connectors,
        }
    }

    fn of_mut(&mut self, kind: ElementKind) -> &mut NeighbourLists {
        match kind {
            ElementKind::Model => &mut self.models,
            ElementKind::Node => &mut self.nodes,
            ElementKind::Edge => &mut self.edges,
            ElementKind::Connector => &mut self.connectors,
        }
    }
}

impl InterchangeGraph {
    /// Returns the records of one element kind.
    #[must_use]
    pub fn group(&self, kind: ElementKind) -> &BTreeMap<ElementId, ElementRecord> {
        match kind {
            ElementKind::Model => &self.models,
            ElementKind::Node => &self.nodes,
            ElementKind::Edge => &self.edges,
            ElementKind::Connector => &self.connectors,
        }
    }

    fn group_mut(&mut self, kind: ElementKind) -> &mut BTreeMap<ElementId, ElementRecord> {
        match kind {
            ElementKind::Model => &mut self.models,
            ElementKind::Node => &mut self.nodes,
            ElementKind::Edge => &mut self.edges,
            ElementKind::Connector => &mut self.connectors,
        }
    }

    /// Looks up one record.
    #[must_use]
    pub fn record(&self, kind: ElementKind, id: &ElementId) -> Option<&ElementRecord> {
        self.group(kind).get(id)
    }

    /// Total number of records across all four groups.
    #[must_use]
    pub fn element_count(&self) -> usize {
        ElementKind::ALL
            .into_iter()
            .map(|kind| self.group(kind).len())
            .sum()
    }

    /// Returns true if the document holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Renders the document as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if encoding fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders the document as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if encoding fails.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if the text is not a valid document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts the document into a [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if encoding fails.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reads a document from a [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if the value is not a valid document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialize
// ─────────────────────────────────────────────────────────────────────────────

impl Graph {
    /// Flattens the graph into an interchange document.
    #[must_use]
    pub fn serialize(&self) -> InterchangeGraph {
        let arena = self.arena();
        let mut doc = InterchangeGraph::default();
        for (_, element) in arena.iter() {
            doc.group_mut(element.kind())
                .insert(element.id.clone(), record_of(arena, element));
        }
        doc
    }

    /// Rebuilds a graph from an interchange document.
    ///
    /// The document is not modified and the returned graph shares nothing
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MalformedDocument`] if the document does not
    /// describe a valid graph: a record stored under a key other than its id,
    /// a model with more than one parent, a node or edge without exactly one
    /// parent model, an edge with fewer than two connectors, a record without
    /// `"type"`, a reference to a record that does not exist, or records that
    /// cannot be reached from any root model.
    pub fn deserialize(doc: &InterchangeGraph) -> Result<Graph> {
        let graph = Restore::new(doc)?.run()?;
        tracing::info!(
            models = doc.models.len(),
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            connectors = doc.connectors.len(),
            "restored graph from document"
        );
        Ok(graph)
    }
}

fn record_of(arena: &Arena, element: &Element) -> ElementRecord {
    let mut neighbours = Neighbours::default();
    for kind in ElementKind::ALL {
        let lists = neighbours.of_mut(kind);
        lists.parent = sorted_ids(arena, element.adjacency.parents(kind).iter().copied());
        lists.child = sorted_ids(arena, element.adjacency.children(kind).iter().copied());
    }

    if let Some(ends) = element.edge_ends() {
        let pinned = [ends.start(), ends.end()];
        let rest = element
            .adjacency
            .parents(ElementKind::Connector)
            .iter()
            .copied()
            .filter(|&index| !pinned.contains(&Some(index)));
        let mut parents: Vec<ElementId> = pinned
            .into_iter()
            .flatten()
            .filter_map(|index| arena.get(index).map(|e| e.id.clone()))
            .collect();
        parents.extend(sorted_ids(arena, rest));
        neighbours.connectors.parent = parents;
    }

    ElementRecord {
        id: element.id.clone(),
        properties: element.properties.to_map(),
        neighbours,
    }
}

fn sorted_ids(arena: &Arena, indices: impl Iterator<Item = ElementIndex>) -> Vec<ElementId> {
    let mut ids: Vec<ElementId> = indices
        .filter_map(|index| arena.get(index).map(|e| e.id.clone()))
        .collect();
    ids.sort();
    ids
}

// ─────────────────────────────────────────────────────────────────────────────
// Deserialize
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of one queued step.
enum Step {
    /// The element was created.
    Done,
    /// Some referenced element has not been created yet.
    Waiting,
}

/// State of one restore.
struct Restore<'d> {
    doc: &'d InterchangeGraph,
    graph: Graph,
    queue: VecDeque<(ElementKind, ElementId)>,
    seen: HashSet<ElementId>,
}

fn malformed(msg: String) -> GraphError {
    tracing::warn!(reason = %msg, "rejecting interchange document");
    GraphError::malformed(msg)
}

/// Restore failures are problems with the document, not with the caller.
fn rejected(id: &ElementId, err: GraphError) -> GraphError {
    malformed(format!("cannot restore '{id}': {err}"))
}

impl<'d> Restore<'d> {
    fn new(doc: &'d InterchangeGraph) -> Result<Self> {
        for kind in ElementKind::ALL {
            for (key, record) in doc.group(kind) {
                if *key != record.id {
                    return Err(malformed(format!(
                        "{kind} record stored under '{key}' has id '{}'",
                        record.id
                    )));
                }
            }
        }

        let mut restore = Self {
            doc,
            graph: Graph::new(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
        };

        for (id, record) in &doc.models {
            let parents = record.neighbours.nodes.parent.len() + record.neighbours.edges.parent.len();
            match parents {
                0 => restore.enqueue(ElementKind::Model, id),
                1 => {}
                _ => {
                    return Err(malformed(format!(
                        "model '{id}' lists {parents} parents, at most one is allowed"
                    )));
                }
            }
        }
        Ok(restore)
    }

    fn enqueue(&mut self, kind: ElementKind, id: &ElementId) {
        if self.seen.insert(id.clone()) {
            self.queue.push_back((kind, id.clone()));
        }
    }

    fn run(mut self) -> Result<Graph> {
        let doc = self.doc;
        let mut stalled = 0;
        while let Some((kind, id)) = self.queue.pop_front() {
            let record = doc.record(kind, &id).ok_or_else(|| {
                malformed(format!("{kind} '{id}' is referenced but has no record"))
            })?;

            let step = match kind {
                ElementKind::Model => self.restore_model(record)?,
                ElementKind::Node => self.restore_node(record)?,
                ElementKind::Edge => self.restore_edge(record)?,
                ElementKind::Connector => {
                    return Err(malformed(format!("connector '{id}' cannot be queued")));
                }
            };

            match step {
                Step::Done => {
                    stalled = 0;
                    for child_kind in [ElementKind::Model, ElementKind::Node, ElementKind::Edge] {
                        for child in &record.neighbours.of(child_kind).child {
                            self.enqueue(child_kind, child);
                        }
                    }
                }
                Step::Waiting => {
                    self.queue.push_back((kind, id));
                    stalled += 1;
                    if stalled >= self.queue.len() {
                        return Err(malformed(format!(
                            "{} queued elements reference elements that never appear",
                            self.queue.len()
                        )));
                    }
                }
            }
        }

        let expected = doc.element_count();
        if self.graph.len() != expected {
            return Err(malformed(format!(
                "{} of {expected} records are unreachable from any root model",
                expected - self.graph.len()
            )));
        }
        Ok(self.graph)
    }

    fn restore_model(&mut self, record: &ElementRecord) -> Result<Step> {
        let neighbours = &record.neighbours;
        let parent = neighbours
            .nodes
            .parent
            .first()
            .map(|id| (ElementKind::Node, id))
            .or_else(|| neighbours.edges.parent.first().map(|id| (ElementKind::Edge, id)));

        if let Some((kind, parent)) = parent {
            self.require(kind, parent, &record.id)?;
            if !self.graph.has_element(parent) {
                return Ok(Step::Waiting);
            }
        }

        self.graph
            .add_model(
                record.id.clone(),
                type_tag(record)?,
                record.properties.clone(),
                parent.map(|(_, id)| id),
            )
            .map_err(|err| rejected(&record.id, err))?;
        Ok(Step::Done)
    }

    fn restore_node(&mut self, record: &ElementRecord) -> Result<Step> {
        let model = sole_parent_model(record, ElementKind::Node)?;
        self.require(ElementKind::Model, model, &record.id)?;
        if !self.graph.has_model(model) {
            return Ok(Step::Waiting);
        }

        let doc = self.doc;
        let connectors = record
            .neighbours
            .connectors
            .child
            .iter()
            .map(|id| {
                doc.record(ElementKind::Connector, id)
                    .ok_or_else(|| {
                        malformed(format!(
                            "node '{}' lists connector '{id}' which has no record",
                            record.id
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.graph
            .add_node(record.id.clone(), type_tag(record)?, model, record.properties.clone())
            .map_err(|err| rejected(&record.id, err))?;

        for connector in connectors {
            self.graph
                .add_connector(
                    connector.id.clone(),
                    type_tag(connector)?,
                    &record.id,
                    connector.properties.clone(),
                )
                .map_err(|err| rejected(&connector.id, err))?;
        }
        Ok(Step::Done)
    }

    fn restore_edge(&mut self, record: &ElementRecord) -> Result<Step> {
        let model = sole_parent_model(record, ElementKind::Edge)?;
        let [start, end, ..] = record.neighbours.connectors.parent.as_slice() else {
            return Err(malformed(format!(
                "edge '{}' needs a start and an end connector",
                record.id
            )));
        };

        self.require(ElementKind::Model, model, &record.id)?;
        self.require(ElementKind::Connector, start, &record.id)?;
        self.require(ElementKind::Connector, end, &record.id)?;
        let ready = self.graph.has_model(model)
            && self.graph.has_connector(start)
            && self.graph.has_connector(end);
        if !ready {
            return Ok(Step::Waiting);
        }

        self.graph
            .add_edge(
                record.id.clone(),
                type_tag(record)?,
                model,
                start,
                end,
                record.properties.clone(),
            )
            .map_err(|err| rejected(&record.id, err))?;
        Ok(Step::Done)
    }

    /// Fails unless the document has a record for a referenced element.
    fn require(&self, kind: ElementKind, id: &ElementId, from: &ElementId) -> Result<()> {
        if self.doc.record(kind, id).is_none() {
            return Err(malformed(format!(
                "'{from}' references {kind} '{id}' which has no record"
            )));
        }
        Ok(())
    }
}

fn sole_parent_model(record: &ElementRecord, kind: ElementKind) -> Result<&ElementId> {
    match record.neighbours.models.parent.as_slice() {
        [model] => Ok(model),
        parents => Err(malformed(format!(
            "{kind} '{}' lists {} parent models, exactly one is required",
            record.id,
            parents.len()
        ))),
    }
}

fn type_tag(record: &ElementRecord) -> Result<PropertyValue> {
    record
        .properties
        .get(TYPE_KEY)
        .cloned()
        .ok_or_else(|| malformed(format!("'{}' has no \"type\" property", record.id)))
}
