//! Static evaluation.

use xq_core::board::{piece_color, piece_type};
use xq_core::{Color, GameState, PieceType};

/// Static evaluators score positions in centipawns from RED's point of
/// view; the search negates for BLACK. Implementations must be cheap:
/// they run at every quiescence leaf.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, state: &GameState) -> i32;
}

/// Centipawn material weight of a piece type.
#[inline]
pub fn piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::Pawn => 100,
        PieceType::Cannon => 450,
        PieceType::Knight => 450,
        PieceType::Bishop => 250,
        PieceType::Advisor => 250,
        PieceType::Rook => 900,
        PieceType::King => 10_000,
    }
}

/// Pure material count. The baseline evaluator, and the fallback when
/// no learned model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, state: &GameState) -> i32 {
        let mut score = 0;
        for &code in state.board() {
            if code == 0 {
                continue;
            }
            let value = piece_value(piece_type(code).unwrap_or(PieceType::Pawn));
            match piece_color(code) {
                Some(Color::Red) => score += value,
                Some(Color::Black) => score -= value,
                None => {}
            }
        }
        score
    }
}
