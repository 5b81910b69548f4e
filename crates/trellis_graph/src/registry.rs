//! Relationship registry.
//!
//! Every element keeps eight adjacency sets: a parent half and a child half
//! for each of the four element kinds. The sets are readable from anywhere
//! in the crate, but only this module can change them, and it always
//! changes both ends of a relationship in the same call. A parent recording
//! a child without the child recording the parent is therefore impossible.
//!
//! Parent/child follows containment or flow:
//!
//! | Parent | Child |
//! |--------|-------|
//! | Model | Node, Edge |
//! | Node | Connector, Model |
//! | Connector | Edge |
//! | Edge | Model |

use indexmap::IndexSet;

use crate::arena::Arena;
use crate::element::{ElementIndex, ElementKind, Variant};

/// The eight adjacency sets of one element.
#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    parent: [IndexSet<ElementIndex>; 4],
    child: [IndexSet<ElementIndex>; 4],
}

impl Adjacency {
    pub(crate) fn parents(&self, kind: ElementKind) -> &IndexSet<ElementIndex> {
        &self.parent[kind.slot()]
    }

    pub(crate) fn children(&self, kind: ElementKind) -> &IndexSet<ElementIndex> {
        &self.child[kind.slot()]
    }

    /// Every related element, with its kind and whether it is a parent.
    fn relations(&self) -> Vec<(ElementKind, bool, ElementIndex)> {
        let mut out = Vec::new();
        for kind in ElementKind::ALL {
            out.extend(self.parents(kind).iter().map(|&i| (kind, true, i)));
            out.extend(self.children(kind).iter().map(|&i| (kind, false, i)));
        }
        out
    }

    fn insert_parent(&mut self, kind: ElementKind, index: ElementIndex) {
        self.parent[kind.slot()].insert(index);
    }

    fn insert_child(&mut self, kind: ElementKind, index: ElementIndex) {
        self.child[kind.slot()].insert(index);
    }

    fn remove_parent(&mut self, kind: ElementKind, index: ElementIndex) {
        self.parent[kind.slot()].shift_remove(&index);
    }

    fn remove_child(&mut self, kind: ElementKind, index: ElementIndex) {
        self.child[kind.slot()].shift_remove(&index);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The two positional connector slots of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EdgeEnds {
    start: Option<ElementIndex>,
    end: Option<ElementIndex>,
}

impl EdgeEnds {
    pub(crate) fn start(&self) -> Option<ElementIndex> {
        self.start
    }

    pub(crate) fn end(&self) -> Option<ElementIndex> {
        self.end
    }
}

/// Records `child` under `parent` on both sides. Idempotent.
///
/// Returns false if either slot is empty.
pub(crate) fn link(arena: &mut Arena, parent: ElementIndex, child: ElementIndex) -> bool {
    let (Some(parent_kind), Some(child_kind)) = (arena.kind_of(parent), arena.kind_of(child))
    else {
        return false;
    };
    if let Some(element) = arena.get_mut(parent) {
        element.adjacency.insert_child(child_kind, child);
    }
    if let Some(element) = arena.get_mut(child) {
        element.adjacency.insert_parent(parent_kind, parent);
    }
    true
}

/// Removes the `parent` → `child` relationship on whichever sides still exist.
///
/// Unlinking an absent relationship is a no-op.
pub(crate) fn unlink(arena: &mut Arena, parent: ElementIndex, child: ElementIndex) {
    let parent_kind = arena.kind_of(parent);
    let child_kind = arena.kind_of(child);
    if let (Some(kind), Some(element)) = (child_kind, arena.get_mut(parent)) {
        element.adjacency.remove_child(kind, child);
    }
    if let (Some(kind), Some(element)) = (parent_kind, arena.get_mut(child)) {
        element.adjacency.remove_parent(kind, parent);
    }
}

/// Sets the start connector of an edge and links the connector as its parent.
pub(crate) fn attach_start_connector(arena: &mut Arena, edge: ElementIndex, connector: ElementIndex) {
    attach_connector(arena, edge, connector, |ends| &mut ends.start);
}

/// Sets the end connector of an edge and links the connector as its parent.
pub(crate) fn attach_end_connector(arena: &mut Arena, edge: ElementIndex, connector: ElementIndex) {
    attach_connector(arena, edge, connector, |ends| &mut ends.end);
}

fn attach_connector(
    arena: &mut Arena,
    edge: ElementIndex,
    connector: ElementIndex,
    slot: impl Fn(&mut EdgeEnds) -> &mut Option<ElementIndex>,
) {
    let Some(Variant::Edge(ends)) = arena.get_mut(edge).map(|e| &mut e.variant) else {
        return;
    };
    let previous = slot(ends).replace(connector);
    // A connector that still occupies the other slot keeps its link.
    let stale = previous.filter(|&old| ends.start != Some(old) && ends.end != Some(old));
    if let Some(old) = stale {
        unlink(arena, old, edge);
    }
    link(arena, connector, edge);
}

/// Unlinks every relationship of one element, on both sides.
///
/// Used as the last step before an element's slot is freed.
pub(crate) fn detach(arena: &mut Arena, index: ElementIndex) {
    let Some(element) = arena.get(index) else {
        return;
    };
    let kind = element.kind();
    let relations = element.adjacency.relations();
    for (other_kind, is_parent, other) in relations {
        if let Some(neighbour) = arena.get_mut(other) {
            if is_parent {
                neighbour.adjacency.remove_child(kind, index);
            } else {
                neighbour.adjacency.remove_parent(kind, index);
            }
        }
        tracing::trace!(kind = %kind, neighbour = %other_kind, "relationship detached");
    }
    if let Some(element) = arena.get_mut(index) {
        element.adjacency.clear();
    }
}
