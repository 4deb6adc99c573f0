//! Xiangqi (Chinese chess) rules engine.
//!
//! This crate provides the game core consumed by the search crates:
//! - `board`: piece codes, square indexing, and movement geometry
//! - `moves`: packed 32-bit move encoding
//! - `zobrist`: seedable incremental position hashing
//! - `state`: [`GameState`] with apply/undo, per-ply history, and
//!   result adjudication (checkmate, stalemate, repetition)
//! - `movegen`: pseudo-legal and legal move generation, including the
//!   perpetual-check and perpetual-chase prohibitions
//! - `encode`: tensor planes, legal-move masks, and flat move indices
//!   for neural-network consumers
//!
//! # Example
//!
//! ```rust
//! use xq_core::GameState;
//!
//! let mut state = GameState::starting_position();
//! let moves = state.legal_moves();
//! assert_eq!(moves.len(), 44);
//!
//! state.apply_move(moves[0]);
//! state.undo_move();
//! assert_eq!(state.hash(), state.recompute_hash());
//! ```

pub mod board;
pub mod encode;
pub mod error;
pub mod movegen;
pub mod moves;
pub mod state;
pub mod zobrist;

pub use board::{Color, PieceType, FILES, NUM_SQUARES, RANKS};
pub use encode::{move_index, NUM_PLANES, POLICY_SIZE};
pub use error::RulesError;
pub use moves::Move;
pub use state::{GameResult, GameState};
pub use zobrist::Zobrist;
