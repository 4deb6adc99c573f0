//! Classical alpha-beta search over [`xq_core::GameState`].
//!
//! The searcher is a fail-soft negamax with a shared transposition
//! table, MVV/LVA capture ordering, killer moves, a history heuristic,
//! and optional quiescence at the horizon. Scores are centipawn-scale
//! integers from the side-to-move's point of view; mate scores are
//! offset by distance from the root so faster mates rank higher.

pub mod alphabeta;
pub mod evaluator;
pub mod table;

pub use alphabeta::{search, search_with, SearchOutcome, MATE_SCORE, MAX_PLY, SCORE_INF};
pub use evaluator::{piece_value, Evaluator, MaterialEvaluator};
pub use table::{Bound, TranspositionTable, TtEntry};
