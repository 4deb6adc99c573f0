//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and reference each other by NodeId
//! indices, which keeps traversal cache-friendly and sidesteps
//! ownership cycles.

use xq_core::POLICY_SIZE;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    root: NodeId,
}

impl MctsTree {
    pub fn new() -> MctsTree {
        MctsTree {
            nodes: vec![MctsNode::new_root()],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a child under `parent_id` and return its id.
    pub fn add_child(&mut self, parent_id: NodeId, move_idx: u16, prior: f32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MctsNode::new_child(parent_id, move_idx, prior));
        self.get_mut(parent_id).children.push((move_idx, id));
        id
    }

    /// Select the child maximizing the PUCT score. Ties keep the first
    /// candidate so selection is deterministic for a given tree.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let child_visits: u32 = node
            .children
            .iter()
            .map(|&(_, id)| self.get(id).visit_count)
            .sum();
        let parent_sqrt = (1.0 + child_visits as f32).sqrt();

        let mut best: Option<(f32, NodeId)> = None;
        for &(_, id) in &node.children {
            let score = self.get(id).puct_score(parent_sqrt, c_puct);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Backpropagate a leaf value to the root, negating at each level
    /// for the alternating perspective.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let mut current_id = leaf_id;
        let mut current_value = value;
        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += current_value;
            current_value = -current_value;
            current_id = node.parent;
        }
    }

    /// Root child with the highest visit count; ties keep the first.
    pub fn best_move_index(&self) -> Option<u16> {
        let root = self.get(self.root);
        let mut best: Option<(u32, u16)> = None;
        for &(move_idx, id) in &root.children {
            let visits = self.get(id).visit_count;
            match best {
                Some((best_visits, _)) if visits <= best_visits => {}
                _ => best = Some((visits, move_idx)),
            }
        }
        best.map(|(_, move_idx)| move_idx)
    }

    /// Dense visit distribution over the flat move space.
    ///
    /// Near-zero temperature collapses to a one-hot on the most visited
    /// move; otherwise visit counts are raised to `1/temperature` and
    /// normalized. All-zero visit counts produce an all-zero vector.
    pub fn action_probs(&self, temperature: f64) -> Vec<f32> {
        let root = self.get(self.root);
        let mut probs = vec![0.0f32; POLICY_SIZE];
        if root.children.is_empty() {
            return probs;
        }

        if temperature < 1e-6 {
            if let Some(move_idx) = self.best_move_index() {
                probs[move_idx as usize] = 1.0;
            }
            return probs;
        }

        let weights: Vec<f64> = root
            .children
            .iter()
            .map(|&(_, id)| {
                let v = self.get(id).visit_count as f64;
                if (temperature - 1.0).abs() < f64::EPSILON {
                    v
                } else {
                    v.powf(1.0 / temperature)
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            for (&(move_idx, _), &w) in root.children.iter().zip(weights.iter()) {
                probs[move_idx as usize] = (w / total) as f32;
            }
        }
        probs
    }
}

impl Default for MctsTree {
    fn default() -> Self {
        MctsTree::new()
    }
}
