//! Bounded navigation stack
//!
//! A fixed-depth LIFO of node ids. Entries are non-owning indices into the
//! element tree, which outlives the stack. The root entry (index 0) is
//! never removed by the router, only put to sleep.

use crate::tree::NodeId;

/// Maximum navigation depth
pub const STACK_DEPTH: usize = 8;

/// Fixed-capacity LIFO of active screens
#[derive(Debug, Default)]
pub struct NavStack {
    slots: [Option<NodeId>; STACK_DEPTH],
    depth: usize,
}

impl NavStack {
    pub const fn new() -> Self {
        Self {
            slots: [None; STACK_DEPTH],
            depth: 0,
        }
    }

    /// Append a node. Fails without mutating when the stack is full or
    /// `id` is already the top entry.
    pub fn push(&mut self, id: NodeId) -> bool {
        if self.depth >= STACK_DEPTH || self.top() == Some(id) {
            return false;
        }
        self.slots[self.depth] = Some(id);
        self.depth += 1;
        true
    }

    /// Remove the top entry and return the *new* top, or `None` when the
    /// stack was empty.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        self.slots[self.depth] = None;
        self.top()
    }

    pub fn top(&self) -> Option<NodeId> {
        if self.depth > 0 {
            self.slots[self.depth - 1]
        } else {
            None
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.depth > 0 {
            self.slots[0]
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn is_full(&self) -> bool {
        self.depth >= STACK_DEPTH
    }

    pub const fn capacity(&self) -> usize {
        STACK_DEPTH
    }

    pub fn clear(&mut self) {
        self.slots = [None; STACK_DEPTH];
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u16) -> NodeId {
        NodeId::from_raw(n)
    }

    #[test]
    fn test_push_pop_top_root() {
        let mut stack = NavStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.top(), None);
        assert_eq!(stack.root(), None);

        assert!(stack.push(id(0)));
        assert!(stack.push(id(1)));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top(), Some(id(1)));
        assert_eq!(stack.root(), Some(id(0)));

        // pop returns the new top, not the removed entry
        assert_eq!(stack.pop(), Some(id(0)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_is_noop() {
        let mut stack = NavStack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_push_duplicate_top_rejected() {
        let mut stack = NavStack::new();
        assert!(stack.push(id(3)));
        assert!(!stack.push(id(3)));
        assert_eq!(stack.len(), 1);
        // Same id deeper in the stack is allowed
        assert!(stack.push(id(4)));
        assert!(stack.push(id(3)));
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_push_beyond_capacity_mutates_nothing() {
        let mut stack = NavStack::new();
        for n in 0..STACK_DEPTH as u16 {
            assert!(stack.push(id(n)));
        }
        assert!(stack.is_full());
        assert!(!stack.push(id(100)));
        assert_eq!(stack.len(), STACK_DEPTH);
        assert_eq!(stack.top(), Some(id(STACK_DEPTH as u16 - 1)));
    }

    #[test]
    fn test_clear() {
        let mut stack = NavStack::new();
        stack.push(id(0));
        stack.push(id(1));
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.top(), None);
    }

    proptest! {
        #[test]
        fn prop_depth_never_exceeds_capacity(ops in proptest::collection::vec(0u8..3, 0..64)) {
            let mut stack = NavStack::new();
            let mut next = 0u16;
            for op in ops {
                match op {
                    0 => {
                        stack.push(id(next));
                        next = next.wrapping_add(1);
                    }
                    1 => {
                        stack.pop();
                    }
                    _ => {
                        // Re-pushing the current top must never grow the stack
                        if let Some(top) = stack.top() {
                            let before = stack.len();
                            prop_assert!(!stack.push(top));
                            prop_assert_eq!(stack.len(), before);
                        }
                    }
                }
                prop_assert!(stack.len() <= STACK_DEPTH);
            }
        }
    }
}
