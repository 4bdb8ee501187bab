use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a single network node, globally unique across the model.
///
/// Backed by `i32` rather than an unsigned type: project files can carry
/// negative IDs and validation must be able to report the offending values
/// instead of failing at parse time. Non-negativity is a model-level rule.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i32);

impl NodeId {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    /// The ID directly after this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display_is_bare_integer() {
        assert_eq!(NodeId::new(7).to_string(), "7");
        assert_eq!(NodeId::new(-1).to_string(), "-1");
    }

    #[test]
    fn node_id_orders_numerically() {
        let mut ids = vec![NodeId::new(3), NodeId::new(-1), NodeId::new(0)];
        ids.sort();
        assert_eq!(ids, vec![NodeId::new(-1), NodeId::new(0), NodeId::new(3)]);
    }

    #[test]
    fn node_id_serializes_transparently() {
        let json = serde_json::to_string(&NodeId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: NodeId = serde_json::from_str("-5").unwrap();
        assert_eq!(back, NodeId::new(-5));
        assert!(!back.is_non_negative());
    }

    #[test]
    fn next_increments() {
        assert_eq!(NodeId::new(0).next(), NodeId::new(1));
        assert_eq!(NodeId::new(41).next(), NodeId::new(42));
    }
}
