//! Doubly linked list whose nodes live in a [`SlotArena`].
//!
//! Nodes are linked by [`SlotId`] rather than by pointer, so a handle handed
//! out by `push_front`/`push_back` stays valid until that node is removed.
//! This is what lets the LRU engine keep `key -> SlotId` in its hash index and
//! splice a node to the front in O(1).
//!
//! ```text
//!   head (most recent)                                 tail (least recent)
//!     │                                                        │
//!     ▼                                                        ▼
//!   [id_4] ◄──► [id_1] ◄──► [id_7] ◄──► ... ◄──► [id_2] ◄──► [id_0]
//!
//!   arena: SlotArena<Node<T>>   Node { value, prev, next }
//! ```
//!
//! | Operation                       | Cost |
//! |---------------------------------|------|
//! | `push_front` / `push_back`      | O(1) |
//! | `pop_front` / `pop_back`        | O(1) |
//! | `move_to_front` / `remove`      | O(1) |
//! | `iter`, `position`              | O(n) |

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|id| &self.arena[id].value)
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.map(|id| &self.arena[id].value)
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: None,
        });
        self.attach_front(id);
        id
    }

    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: None,
        });
        self.attach_back(id);
        id
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let id = self.head?;
        self.remove(id)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks and frees the node. Returns `None` for a stale handle.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        if !self.arena.contains(id) {
            return None;
        }
        self.detach(id);
        self.arena.remove(id).map(|node| node.value)
    }

    /// Moves the node to the head. Returns `false` for a stale handle.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head != Some(id) {
            self.detach(id);
            self.attach_front(id);
        }
        true
    }

    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.tail != Some(id) {
            self.detach(id);
            self.attach_back(id);
        }
        true
    }

    /// Distance of `id` from the head (0 = front), walking the links.
    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.iter_ids().position(|candidate| candidate == id)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Front-to-back iterator over values.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.iter_entries().map(|(_, value)| value)
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.iter_entries().map(|(id, _)| id)
    }

    pub fn iter_entries(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = &self.arena[id];
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => self.arena[prev_id].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => self.arena[next_id].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.arena[id];
        node.prev = None;
        node.next = None;
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        {
            let node = &mut self.arena[id];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => self.arena[old_head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn attach_back(&mut self, id: SlotId) {
        let old_tail = self.tail;
        {
            let node = &mut self.arena[id];
            node.next = None;
            node.prev = old_tail;
        }
        match old_tail {
            Some(old_tail) => self.arena[old_tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Walks the list and verifies every back link, the tail pointer and the
    /// node count against the arena.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            ensure_invariant!(
                self.head.is_none() && self.tail.is_none() && self.arena.is_empty(),
                "list has a dangling head/tail with {} nodes",
                self.arena.len()
            );
            return Ok(());
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let Some(node) = self.arena.get(id) else {
                return Err(InvariantError::new(format!(
                    "list links to freed slot {}",
                    id.index()
                )));
            };
            ensure_invariant!(
                node.prev == prev,
                "node {} has a wrong prev link",
                id.index()
            );
            if node.next.is_none() {
                ensure_invariant!(
                    self.tail == Some(id),
                    "tail does not point at the last node"
                );
            }
            count += 1;
            ensure_invariant!(count <= self.arena.len(), "list contains a cycle");
            prev = Some(id);
            current = node.next;
        }

        ensure_invariant!(
            count == self.arena.len(),
            "{} linked nodes but {} allocated",
            count,
            self.arena.len()
        );
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(SlotId, &T)` pairs from front to back.
pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some((id, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &IntrusiveList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn push_and_pop_from_both_ends() {
        let mut list = IntrusiveList::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_front_and_back() {
        let mut list = IntrusiveList::new();
        let a = list.push_back(1);
        let _b = list.push_back(2);
        let c = list.push_back(3);

        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec![3, 1, 2]);
        assert!(list.move_to_back(a));
        assert_eq!(values(&list), vec![3, 2, 1]);
        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec![3, 2, 1]);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_middle_keeps_links() {
        let mut list = IntrusiveList::new();
        let ids: Vec<_> = (0..5).map(|v| list.push_back(v)).collect();
        assert_eq!(list.remove(ids[2]), Some(2));
        assert_eq!(list.remove(ids[2]), None);
        assert!(!list.move_to_front(ids[2]));
        assert_eq!(values(&list), vec![0, 1, 3, 4]);
        assert_eq!(list.position(ids[3]), Some(2));
        assert_eq!(list.position(ids[2]), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn single_node_list() {
        let mut list = IntrusiveList::new();
        let id = list.push_front(9);
        assert_eq!(list.front_id(), Some(id));
        assert_eq!(list.back_id(), Some(id));
        assert!(list.move_to_back(id));
        *list.get_mut(id).unwrap() = 10;
        assert_eq!(list.get(id), Some(&10));
        list.clear();
        assert!(list.front().is_none());
        list.debug_validate_invariants();
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            PushFront(u32),
            PushBack(u32),
            PopFront,
            PopBack,
            MoveToFront(usize),
            Remove(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<u32>().prop_map(Op::PushFront),
                any::<u32>().prop_map(Op::PushBack),
                Just(Op::PopFront),
                Just(Op::PopBack),
                (0usize..32).prop_map(Op::MoveToFront),
                (0usize..32).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn matches_vecdeque_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
                let mut list = IntrusiveList::new();
                let mut model: std::collections::VecDeque<(SlotId, u32)> = Default::default();

                for op in ops {
                    match op {
                        Op::PushFront(v) => {
                            let id = list.push_front(v);
                            model.push_front((id, v));
                        }
                        Op::PushBack(v) => {
                            let id = list.push_back(v);
                            model.push_back((id, v));
                        }
                        Op::PopFront => {
                            prop_assert_eq!(list.pop_front(), model.pop_front().map(|(_, v)| v));
                        }
                        Op::PopBack => {
                            prop_assert_eq!(list.pop_back(), model.pop_back().map(|(_, v)| v));
                        }
                        Op::MoveToFront(i) => {
                            if !model.is_empty() {
                                let entry = model.remove(i % model.len()).unwrap();
                                prop_assert!(list.move_to_front(entry.0));
                                model.push_front(entry);
                            }
                        }
                        Op::Remove(i) => {
                            if !model.is_empty() {
                                let (id, v) = model.remove(i % model.len()).unwrap();
                                prop_assert_eq!(list.remove(id), Some(v));
                            }
                        }
                    }
                    prop_assert!(list.check_invariants().is_ok());
                }

                let expected: Vec<u32> = model.iter().map(|(_, v)| *v).collect();
                prop_assert_eq!(values(&list), expected);
            }
        }
    }
}
