//! Deletion cascades.
//!
//! Deleting an element removes its dependent closure and nothing more. The
//! closure is computed up front by [`plan`], a pure function over the arena,
//! and then applied by the graph in one pass. Planning before mutating means
//! an element reachable along two branches of the same cascade (an edge
//! anchored on two connectors of one node, say) is visited once.
//!
//! Per kind, a deleted element:
//!
//! | Kind | Deletes | Unlinks from |
//! |------|---------|--------------|
//! | Model | child nodes, child edges | parent node or edge |
//! | Node | child connectors, child models | parent model |
//! | Connector | child edges | parent node |
//! | Edge | child models | start/end connectors, parent model |

use hashbrown::HashSet;

use crate::arena::Arena;
use crate::element::{Element, ElementIndex, ElementKind};
use crate::registry;

/// The work a single delete performs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CascadePlan {
    /// Relationships `(owner, dependent)` between a surviving owner and a
    /// removed dependent.
    pub(crate) unlink: Vec<(ElementIndex, ElementIndex)>,
    /// Elements to remove, the cascade root first.
    pub(crate) remove: Vec<ElementIndex>,
}

impl CascadePlan {
    pub(crate) fn is_empty(&self) -> bool {
        self.remove.is_empty()
    }
}

/// Elements a deleted element takes down with it.
fn dependents(element: &Element) -> Vec<ElementIndex> {
    let adjacency = &element.adjacency;
    let of = |kinds: &[ElementKind]| -> Vec<ElementIndex> {
        kinds
            .iter()
            .flat_map(|&kind| adjacency.children(kind).iter().copied())
            .collect()
    };
    match element.kind() {
        ElementKind::Model => of(&[ElementKind::Node, ElementKind::Edge]),
        ElementKind::Node => of(&[ElementKind::Connector, ElementKind::Model]),
        ElementKind::Connector => of(&[ElementKind::Edge]),
        ElementKind::Edge => of(&[ElementKind::Model]),
    }
}

/// Elements a deleted element only detaches from.
fn owners(element: &Element) -> Vec<ElementIndex> {
    let adjacency = &element.adjacency;
    match element.kind() {
        ElementKind::Model => adjacency
            .parents(ElementKind::Node)
            .iter()
            .chain(adjacency.parents(ElementKind::Edge))
            .copied()
            .collect(),
        ElementKind::Node => adjacency.parents(ElementKind::Model).iter().copied().collect(),
        ElementKind::Connector => adjacency.parents(ElementKind::Node).iter().copied().collect(),
        ElementKind::Edge => {
            let mut out = element.connector_indices();
            out.dedup();
            out.extend(adjacency.parents(ElementKind::Model).iter().copied());
            out
        }
    }
}

/// Computes the cascade rooted at `root`.
///
/// An empty plan means `root` is not alive.
pub(crate) fn plan(arena: &Arena, root: ElementIndex) -> CascadePlan {
    let mut plan = CascadePlan::default();
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(index) = stack.pop() {
        if !visited.insert(index) {
            continue;
        }
        let Some(element) = arena.get(index) else {
            continue;
        };
        for owner in owners(element) {
            plan.unlink.push((owner, index));
        }
        // Reverse so the walk visits children in adjacency order.
        stack.extend(dependents(element).into_iter().rev());
        plan.remove.push(index);
    }

    plan.unlink.retain(|(owner, _)| !visited.contains(owner));
    plan
}

/// Applies a plan: unlink the boundary, then detach and free every element.
pub(crate) fn apply(arena: &mut Arena, plan: &CascadePlan) {
    for &(owner, dependent) in &plan.unlink {
        registry::unlink(arena, owner, dependent);
    }
    for &index in &plan.remove {
        registry::detach(arena, index);
        if let Some(element) = arena.remove(index) {
            tracing::trace!(id = %element.id, kind = %element.kind(), "element removed");
        }
    }
}
