//! Ordered-forest arena.
//!
//! Replaces the classic intrusive parent / first-child / sibling pointer
//! quad with an arena of slots addressed by [`NodeId`], keeping O(1) append
//! and unlink while every link is an `Option<NodeId>` instead of an aliasing
//! pointer. Sibling lists are ordered; a parent's first child never has a
//! previous sibling.

use std::ops::ControlFlow;

use crate::foundation::error::{LumatileError, LumatileResult};

/// Handle to a node in a [`Forest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Links {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Links {
    fn is_detached(&self) -> bool {
        self.parent.is_none() && self.prev.is_none() && self.next.is_none()
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    links: Links,
}

/// Arena holding an ordered forest of `T` nodes.
#[derive(Debug, Default)]
pub struct Forest<T> {
    slots: Vec<Option<Slot<T>>>,
    free: Vec<u32>,
}

impl<T> Forest<T> {
    /// Empty forest.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the forest holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a value as a detached root node.
    pub fn insert(&mut self, value: T) -> NodeId {
        let slot = Slot {
            value,
            links: Links::default(),
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(slot);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(slot));
                NodeId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Remove a node, returning its value.
    ///
    /// The node is unlinked from its sibling list first; any children it
    /// still has become detached roots.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.slot(id)?;
        self.unlink(id);
        let mut child = self.first_child(id);
        while let Some(c) = child {
            let next = self.next_sibling(c);
            if let Some(s) = self.slot_mut(c) {
                s.links.parent = None;
                s.links.prev = None;
                s.links.next = None;
            }
            child = next;
        }
        let slot = self.slots[id.index()].take()?;
        self.free.push(id.0);
        Some(slot.value)
    }

    /// Borrow the value of a node.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slot(id).map(|s| &s.value)
    }

    /// Mutably borrow the value of a node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slot_mut(id).map(|s| &mut s.value)
    }

    /// Parent link of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.links.parent)
    }

    /// First child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.links.first_child)
    }

    /// Next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.links.next)
    }

    /// Previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.links.prev)
    }

    /// Head of the sibling list containing `id`.
    pub fn first_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?;
        let mut cur = id;
        while let Some(prev) = self.prev_sibling(cur) {
            cur = prev;
        }
        Some(cur)
    }

    /// Tail of the sibling list containing `id`.
    pub fn last_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?;
        let mut cur = id;
        while let Some(next) = self.next_sibling(cur) {
            cur = next;
        }
        Some(cur)
    }

    /// The `n`-th sibling after `id` in forward order (`n == 0` is `id`).
    pub fn nth_sibling(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.slot(id)?;
        let mut cur = id;
        for _ in 0..n {
            cur = self.next_sibling(cur)?;
        }
        Some(cur)
    }

    /// Length of the sibling list containing `id`, including `id` itself.
    pub fn sibling_count(&self, id: NodeId) -> usize {
        let Some(first) = self.first_sibling(id) else {
            return 0;
        };
        let mut count = 0;
        let mut cur = Some(first);
        while let Some(c) = cur {
            count += 1;
            cur = self.next_sibling(c);
        }
        count
    }

    /// Attach `new` at the tail of the sibling list containing `node`,
    /// inheriting the tail's parent. `new` must be a detached root.
    pub fn append_sibling(&mut self, node: NodeId, new: NodeId) -> LumatileResult<()> {
        self.check_attachable(node, new)?;
        let last = self
            .last_sibling(node)
            .ok_or_else(|| LumatileError::validation("unknown sibling anchor node"))?;
        let parent = self.parent(last);
        let links = &mut self.slot_mut(new).expect("checked above").links;
        links.prev = Some(last);
        links.parent = parent;
        self.slot_mut(last).expect("checked above").links.next = Some(new);
        Ok(())
    }

    /// Attach `child` under `parent`: it becomes the first child if there is
    /// none, otherwise it is appended at the existing children's tail.
    /// `child` must be a detached root.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> LumatileResult<()> {
        self.check_attachable(parent, child)?;
        match self.first_child(parent) {
            Some(first) => self.append_sibling(first, child),
            None => {
                self.slot_mut(parent).expect("checked above").links.first_child = Some(child);
                self.slot_mut(child).expect("checked above").links.parent = Some(parent);
                Ok(())
            }
        }
    }

    /// Remove `id` from its sibling list, repairing the parent's first-child
    /// pointer when `id` was first. `id` keeps its own children.
    pub fn unlink(&mut self, id: NodeId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        let Links {
            parent, prev, next, ..
        } = slot.links;
        if let Some(p) = prev {
            self.slot_mut(p).expect("linked sibling").links.next = next;
        }
        if let Some(n) = next {
            self.slot_mut(n).expect("linked sibling").links.prev = prev;
        }
        if let Some(par) = parent
            && self.first_child(par) == Some(id)
        {
            self.slot_mut(par).expect("linked parent").links.first_child = next;
        }
        let links = &mut self.slot_mut(id).expect("checked above").links;
        links.parent = None;
        links.prev = None;
        links.next = None;
    }

    /// Zero all four links of `id`. Children of `id` keep their stale parent
    /// reference; use [`Forest::unlink`] for list-preserving removal.
    pub fn clear_links(&mut self, id: NodeId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.links = Links::default();
        }
    }

    /// Visit siblings starting at `start` in forward order. Traversal stops
    /// as soon as the visitor breaks; remaining siblings are not visited.
    pub fn for_each_sibling<F>(&self, start: NodeId, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(NodeId, &T) -> ControlFlow<()>,
    {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let Some(slot) = self.slot(id) else {
                break;
            };
            f(id, &slot.value)?;
            cur = slot.links.next;
        }
        ControlFlow::Continue(())
    }

    /// Iterator over the children of `id` in sibling order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.first_child(id);
        std::iter::from_fn(move || {
            let id = cur?;
            cur = self.next_sibling(id);
            Some(id)
        })
    }

    fn check_attachable(&self, anchor: NodeId, new: NodeId) -> LumatileResult<()> {
        if self.slot(anchor).is_none() {
            return Err(LumatileError::validation("unknown anchor node"));
        }
        let Some(slot) = self.slot(new) else {
            return Err(LumatileError::validation("unknown node to attach"));
        };
        if anchor == new {
            return Err(LumatileError::validation("cannot attach a node to itself"));
        }
        if !slot.links.is_detached() {
            return Err(LumatileError::ownership(
                "node is already linked into a tree",
            ));
        }
        Ok(())
    }

    fn slot(&self, id: NodeId) -> Option<&Slot<T>> {
        self.slots.get(id.index())?.as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<T>> {
        self.slots.get_mut(id.index())?.as_mut()
    }
}
