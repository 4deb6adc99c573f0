//! PUCT Monte Carlo tree search for self-play and evaluation.
//!
//! The tree is arena-allocated; nodes carry visit statistics and a
//! flat move index, never game state. Each simulation replays moves on
//! a clone of the root position, so memory stays proportional to the
//! number of tree nodes rather than the number of positions.
//!
//! Priors come from a [`PolicyValue`] implementation over the 8100-entry
//! from/to move space; [`UniformPolicy`] serves as the modelless
//! baseline. Root priors can be mixed with Dirichlet noise for
//! self-play exploration.

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod tree;

pub use config::MctsConfig;
pub use node::{MctsNode, NodeId};
pub use policy::{PolicyError, PolicyEval, PolicyValue, UniformPolicy};
pub use search::{MctsSearch, SearchError, SearchResult};
pub use tree::MctsTree;
