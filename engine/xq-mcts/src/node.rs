//! MCTS tree node representation.
//!
//! Each node represents the position reached by playing a move from its
//! parent. Nodes store visit statistics used for PUCT selection and
//! policy extraction; they deliberately carry no game state.

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

/// A node in the MCTS tree.
///
/// `value_sum` accumulates values from this node's own perspective
/// (the player to move at this node); parents negate when selecting.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Flat move index (from * 90 + to) that led here from the parent
    pub move_idx: u16,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Sum of backpropagated values; Q = value_sum / visit_count
    pub value_sum: f32,

    /// Prior probability of the leading move under the parent's policy
    pub prior: f32,

    /// Whether the position here is terminal
    pub is_terminal: bool,

    /// Adjudicated value from this node's perspective (valid when terminal)
    pub terminal_value: f32,

    /// Children as (move index, node) pairs; empty until expanded
    pub children: Vec<(u16, NodeId)>,
}

impl MctsNode {
    pub fn new_root() -> MctsNode {
        MctsNode {
            parent: NodeId::NONE,
            move_idx: 0,
            visit_count: 0,
            value_sum: 0.0,
            prior: 1.0,
            is_terminal: false,
            terminal_value: 0.0,
            children: Vec::new(),
        }
    }

    pub fn new_child(parent: NodeId, move_idx: u16, prior: f32) -> MctsNode {
        MctsNode {
            parent,
            move_idx,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            is_terminal: false,
            terminal_value: 0.0,
            children: Vec::new(),
        }
    }

    /// Mean value Q, zero when unvisited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// PUCT score as seen from the parent:
    /// `-Q + c_puct * P * sqrt(1 + N_parent) / (1 + N)`.
    ///
    /// Q is negated because this node stores value from the opponent's
    /// perspective relative to the selecting parent. Takes the
    /// pre-computed parent sqrt so comparisons across siblings share it.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let q = -self.mean_value();
        let u = c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        q + u
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.is_expanded()
    }
}
