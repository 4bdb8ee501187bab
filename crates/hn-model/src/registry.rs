//! Bookkeeping of node IDs assigned anywhere in a model.

use std::collections::HashSet;

use hn_core::{HnError, HnResult, NodeId};

/// The set of node IDs in use across the whole model, plus the running
/// maximum used to hand out fresh IDs.
///
/// Owned by the top-level model and lent to each node-type model during
/// `add`. IDs are never released.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsedIds {
    ids: HashSet<NodeId>,
    max_id: i32,
}

impl UsedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ID. Re-adding an already-present ID is a no-op.
    pub fn add(&mut self, node_id: NodeId) {
        self.ids.insert(node_id);
        if node_id.get() > self.max_id {
            self.max_id = node_id.get();
        }
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.ids.contains(&node_id)
    }

    /// One past the maximum seen. Does not register the ID: callers `add`
    /// it once accepted, and two calls without an intervening `add` return
    /// the same value.
    pub fn new_id(&self) -> NodeId {
        NodeId::new(self.max_id).next()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve a requested ID: `None` yields a fresh ID, an explicit ID
    /// must not already be in use. Does not register the result.
    pub fn resolve(&self, requested: Option<NodeId>) -> HnResult<NodeId> {
        match requested {
            None => Ok(self.new_id()),
            Some(node_id) if self.contains(node_id) => Err(HnError::IdInUse { node_id }),
            Some(node_id) => Ok(node_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_registry_starts_at_one() {
        let registry = UsedIds::new();
        assert!(registry.is_empty());
        assert_eq!(registry.new_id(), NodeId::new(1));
    }

    #[test]
    fn new_id_is_idempotent_without_add() {
        let mut registry = UsedIds::new();
        registry.add(NodeId::new(6));
        assert_eq!(registry.new_id(), NodeId::new(7));
        assert_eq!(registry.new_id(), NodeId::new(7));
        registry.add(registry.new_id());
        assert_eq!(registry.new_id(), NodeId::new(8));
    }

    #[test]
    fn re_adding_is_a_no_op() {
        let mut registry = UsedIds::new();
        registry.add(NodeId::new(3));
        registry.add(NodeId::new(3));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(NodeId::new(3)));
    }

    #[test]
    fn resolve_rejects_ids_in_use() {
        let mut registry = UsedIds::new();
        registry.add(NodeId::new(2));
        let err = registry.resolve(Some(NodeId::new(2))).unwrap_err();
        assert!(matches!(err, HnError::IdInUse { node_id } if node_id == NodeId::new(2)));
        assert_eq!(registry.resolve(Some(NodeId::new(5))).unwrap(), NodeId::new(5));
        assert_eq!(registry.resolve(None).unwrap(), NodeId::new(3));
    }

    proptest! {
        #[test]
        fn new_id_never_collides(ids in proptest::collection::vec(0i32..10_000, 0..50)) {
            let mut registry = UsedIds::new();
            for id in ids {
                registry.add(NodeId::new(id));
            }
            prop_assert!(!registry.contains(registry.new_id()));
        }
    }
}
