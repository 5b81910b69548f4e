//! Slot storage for graph elements.
//!
//! Elements live in a `Vec` of slots addressed by [`ElementIndex`]; a hash
//! map resolves external [`ElementId`]s to slots. Freed slots are recycled.

use hashbrown::HashMap;

use crate::element::{Element, ElementIndex, ElementKind};
use crate::id::ElementId;

#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Element>>,
    free: Vec<ElementIndex>,
    index: HashMap<ElementId, ElementIndex>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores an element and returns its slot. The id must not be present.
    pub(crate) fn insert(&mut self, element: Element) -> ElementIndex {
        let id = element.id.clone();
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index.get()] = Some(element);
                index
            }
            None => {
                let index = ElementIndex(self.slots.len() as u32);
                self.slots.push(Some(element));
                index
            }
        };
        self.index.insert(id, index);
        index
    }

    /// Removes an element without touching its relationships.
    ///
    /// Only the cascade machinery calls this, after the element has been
    /// detached from every neighbour.
    pub(crate) fn remove(&mut self, index: ElementIndex) -> Option<Element> {
        let element = self.slots.get_mut(index.get())?.take()?;
        self.index.remove(&element.id);
        self.free.push(index);
        Some(element)
    }

    pub(crate) fn get(&self, index: ElementIndex) -> Option<&Element> {
        self.slots.get(index.get())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: ElementIndex) -> Option<&mut Element> {
        self.slots.get_mut(index.get())?.as_mut()
    }

    pub(crate) fn index_of(&self, id: &ElementId) -> Option<ElementIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn lookup(&self, id: &ElementId) -> Option<(ElementIndex, &Element)> {
        let index = self.index_of(id)?;
        self.get(index).map(|element| (index, element))
    }

    pub(crate) fn kind_of(&self, index: ElementIndex) -> Option<ElementKind> {
        self.get(index).map(Element::kind)
    }

    pub(crate) fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ElementIndex, &Element)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|element| (ElementIndex(i as u32), element))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }
}
