//! Search tree node representation.
//!
//! Each node stands for the position reached by playing `mv` from its
//! parent. Its statistics belong to `mover`, the side that played `mv`.

use hex_core::{Move, Side};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Parent node index (NONE for root). Only read when climbing for
    /// backup; the parent never owns anything through it.
    pub parent: NodeId,

    /// Move that led here from the parent (None for a fresh root)
    pub mv: Option<Move>,

    /// Side that played `mv`
    pub mover: Side,

    /// Number of simulations that passed through this node
    pub visits: u32,

    /// Sum of rewards for `mover`, always within 0..=visits
    pub reward: f64,

    /// Children keyed by move, in the order they were created
    pub children: Vec<(Move, NodeId)>,

    /// Selection value from the last time the parent compared its children
    pub value: Option<f64>,
}

impl SearchNode {
    /// Create a root for a position where `to_play` moves next.
    pub fn new_root(to_play: Side) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            mover: to_play.opponent(),
            visits: 0,
            reward: 0.0,
            children: Vec::new(),
            value: None,
        }
    }

    /// Create a child reached by `mover` playing `mv`.
    pub fn new_child(parent: NodeId, mv: Move, mover: Side) -> Self {
        Self {
            parent,
            mv: Some(mv),
            mover,
            visits: 0,
            reward: 0.0,
            children: Vec::new(),
            value: None,
        }
    }

    /// Side to move in this node's position.
    #[inline]
    pub fn next_to_move(&self) -> Side {
        self.mover.opponent()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean reward for `mover`, 0.0 if never visited.
    #[inline]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }

    /// UCT value of this node as seen from its parent.
    ///
    /// `None` for a root. An unvisited node is worth +inf when exploring
    /// (so every child is tried once before any is exploited) and exactly
    /// 0.0 when `exploration` is zero. Otherwise
    /// `reward/visits + exploration * sqrt(2 ln(parent_visits + 1) / visits)`.
    pub fn selection_value(&self, parent_visits: u32, exploration: f64) -> Option<f64> {
        if self.is_root() {
            return None;
        }
        if self.visits == 0 {
            return Some(if exploration == 0.0 { 0.0 } else { f64::INFINITY });
        }
        let n = self.visits as f64;
        let explore = (2.0 * (parent_visits as f64 + 1.0).ln() / n).sqrt();
        Some(self.reward / n + exploration * explore)
    }

    /// Recompute and cache the selection value.
    pub fn update_value(&mut self, parent_visits: u32, exploration: f64) -> Option<f64> {
        self.value = self.selection_value(parent_visits, exploration);
        self.value
    }

    /// Child reached by `mv`, if it was ever created.
    pub fn child(&self, mv: Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = SearchNode::new_root(Side::Red);

        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(node.mv, None);
        assert_eq!(node.mover, Side::Blue);
        assert_eq!(node.next_to_move(), Side::Red);
        assert_eq!(node.visits, 0);
        assert_eq!(node.selection_value(10, 0.5), None);
    }

    #[test]
    fn test_mean_reward() {
        let mut node = SearchNode::new_child(NodeId(0), Move::place(0, 0), Side::Red);
        assert_eq!(node.mean_reward(), 0.0);

        node.visits = 4;
        node.reward = 3.0;
        assert!((node.mean_reward() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_unvisited_value() {
        let node = SearchNode::new_child(NodeId(0), Move::place(1, 1), Side::Red);
        assert_eq!(node.selection_value(5, 0.5), Some(f64::INFINITY));
        assert_eq!(node.selection_value(5, 0.0), Some(0.0));
    }

    #[test]
    fn test_uct_value() {
        let mut node = SearchNode::new_child(NodeId(0), Move::place(1, 1), Side::Red);
        node.visits = 10;
        node.reward = 6.0;

        // 0.6 + 0.5 * sqrt(2 ln(101) / 10)
        let expected = 0.6 + 0.5 * (2.0 * 101f64.ln() / 10.0).sqrt();
        let value = node.selection_value(100, 0.5).unwrap();
        assert!((value - expected).abs() < 1e-12);

        // No exploration term
        assert!((node.selection_value(100, 0.0).unwrap() - 0.6).abs() < 1e-12);

        // Cached copy
        assert_eq!(node.update_value(100, 0.5), Some(value));
        assert_eq!(node.value, Some(value));
    }

    #[test]
    fn test_child_lookup() {
        let mut node = SearchNode::new_root(Side::Red);
        node.children.push((Move::place(2, 3), NodeId(1)));
        node.children.push((Move::Swap, NodeId(2)));

        assert_eq!(node.child(Move::place(2, 3)), Some(NodeId(1)));
        assert_eq!(node.child(Move::Swap), Some(NodeId(2)));
        assert_eq!(node.child(Move::place(3, 2)), None);
        assert!(!node.is_leaf());
    }
}
