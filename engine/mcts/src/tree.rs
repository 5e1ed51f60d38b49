//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous Vec and reference each other by `NodeId`.
//! Parent links are plain indices used to climb during backup; ownership
//! only flows from a node to its children. When a real move is committed
//! the arena is rebuilt from the surviving subtree, so discarded siblings
//! are freed at that point.

use std::collections::VecDeque;

use hex_core::{Move, Side};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::node::{NodeId, SearchNode};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree {
    /// Arena storing all nodes
    nodes: Vec<SearchNode>,

    /// Root node index (always 0 after construction or promotion)
    root: NodeId,
}

impl SearchTree {
    /// Create a tree whose root position has `to_play` to move.
    pub fn new(to_play: Side) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(to_play)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child for `mv` under `parent` and return its ID.
    ///
    /// If the parent already has a child for `mv` that child is returned
    /// unchanged, so keys stay unique.
    pub fn add_child(&mut self, parent: NodeId, mv: Move) -> NodeId {
        if let Some(existing) = self.get(parent).child(mv) {
            return existing;
        }
        let mover = self.get(parent).next_to_move();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new_child(parent, mv, mover));
        self.get_mut(parent).children.push((mv, id));
        id
    }

    /// Pick the child with the highest selection value, ties broken
    /// uniformly at random. Refreshes every child's cached value.
    pub fn select_child<R: Rng + ?Sized>(
        &mut self,
        node_id: NodeId,
        exploration: f64,
        rng: &mut R,
    ) -> Option<NodeId> {
        let parent_visits = self.get(node_id).visits;
        let children: Vec<NodeId> = self.get(node_id).children.iter().map(|(_, id)| *id).collect();

        let mut best_value = f64::NEG_INFINITY;
        let mut best: Vec<NodeId> = Vec::new();
        for child_id in children {
            let value = self
                .get_mut(child_id)
                .update_value(parent_visits, exploration)
                .unwrap_or(f64::NEG_INFINITY);
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(child_id);
            } else if value == best_value {
                best.push(child_id);
            }
        }

        best.choose(rng).copied()
    }

    /// Record one simulation from `leaf` up to the root.
    ///
    /// `reward` is the result for the leaf's mover. Consecutive levels
    /// belong to alternating sides, so it becomes `1 - reward` at each step.
    pub fn backup(&mut self, leaf: NodeId, reward: f64) {
        let mut current_id = leaf;
        let mut current_reward = reward;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visits += 1;
            node.reward += current_reward;

            current_reward = 1.0 - current_reward;
            current_id = node.parent;
        }
    }

    /// The root child with the most visits, ties broken uniformly at random.
    pub fn most_visited_child<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(Move, NodeId)> {
        let root = self.get(self.root);
        let max_visits = root
            .children
            .iter()
            .map(|(_, id)| self.get(*id).visits)
            .max()?;
        let best: Vec<(Move, NodeId)> = root
            .children
            .iter()
            .filter(|(_, id)| self.get(*id).visits == max_visits)
            .copied()
            .collect();
        best.choose(rng).copied()
    }

    /// Make the root's child for `mv` the new root, creating a fresh one if
    /// the move was never explored. Everything outside its subtree is freed.
    pub fn promote_move(&mut self, mv: Move) -> NodeId {
        let child = self.add_child(self.root, mv);
        self.promote(child);
        self.root
    }

    /// Make `new_root` the root and compact the arena to its subtree.
    fn promote(&mut self, new_root: NodeId) {
        // Breadth-first order of the surviving nodes fixes their new IDs
        let mut order = Vec::new();
        let mut remap = vec![NodeId::NONE; self.nodes.len()];
        let mut queue = VecDeque::from([new_root]);
        while let Some(id) = queue.pop_front() {
            remap[id.0 as usize] = NodeId(order.len() as u32);
            order.push(id);
            queue.extend(self.get(id).children.iter().map(|(_, child)| *child));
        }

        let mut slots: Vec<Option<SearchNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old_id in order {
            let Some(mut node) = slots[old_id.0 as usize].take() else {
                continue;
            };
            node.parent = if old_id == new_root {
                NodeId::NONE
            } else {
                remap[node.parent.0 as usize]
            };
            for (_, child) in node.children.iter_mut() {
                *child = remap[child.0 as usize];
            }
            if old_id == new_root {
                node.value = None;
            }
            nodes.push(node);
        }

        // Dropping the slots here releases the pruned siblings
        drop(slots);
        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_children: root.children.len(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_children: usize,
    pub max_depth: u32,
}
