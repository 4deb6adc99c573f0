//! Tensor encodings for policy-driven search.
//!
//! The policy space is a flat from/to grid: index `from * 90 + to`,
//! 8100 entries. Board planes are 15 stacked 90-float bitmaps: seven
//! RED piece types, seven BLACK piece types, then a side-to-move plane
//! that is all ones when RED is to move.

use crate::board::{piece_color, piece_type, Color, NUM_PIECE_TYPES, NUM_SQUARES};
use crate::state::GameState;

/// Size of the flat move-policy vector (90 * 90).
pub const POLICY_SIZE: usize = NUM_SQUARES * NUM_SQUARES;

/// Number of board planes: 7 per color plus side to move.
pub const NUM_PLANES: usize = 2 * NUM_PIECE_TYPES + 1;

/// Flat policy index for a from/to square pair.
#[inline]
pub fn move_index(from_sq: usize, to_sq: usize) -> usize {
    from_sq * NUM_SQUARES + to_sq
}

impl GameState {
    /// 0/1 mask over the policy space with ones at legal move indices.
    pub fn legal_move_mask(&mut self) -> Vec<f32> {
        let mut mask = vec![0.0; POLICY_SIZE];
        for mv in self.legal_moves() {
            mask[mv.index()] = 1.0;
        }
        mask
    }

    /// Stacked board planes, plane-major: `planes[p * 90 + sq]`.
    pub fn to_planes(&self) -> Vec<f32> {
        let mut planes = vec![0.0; NUM_PLANES * NUM_SQUARES];
        for sq in 0..NUM_SQUARES {
            let code = self.piece_at(sq);
            if code == 0 {
                continue;
            }
            let pt = piece_type(code).expect("nonzero code has a type");
            let plane = match piece_color(code).expect("nonzero code has a color") {
                Color::Red => pt.id() as usize - 1,
                Color::Black => NUM_PIECE_TYPES + pt.id() as usize - 1,
            };
            planes[plane * NUM_SQUARES + sq] = 1.0;
        }
        if self.side_to_move() == Color::Red {
            let side = 2 * NUM_PIECE_TYPES * NUM_SQUARES;
            planes[side..side + NUM_SQUARES].fill(1.0);
        }
        planes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{index_of, PieceType};
    use crate::moves::Move;

    #[test]
    fn test_mask_matches_legal_moves() {
        let mut state = GameState::starting_position();
        let mask = state.legal_move_mask();
        assert_eq!(mask.len(), POLICY_SIZE);
        let ones = mask.iter().filter(|&&v| v == 1.0).count();
        assert_eq!(ones, state.legal_moves().len());
        for mv in state.legal_moves() {
            assert_eq!(mask[mv.index()], 1.0);
        }
        // A move no piece can make stays masked out.
        assert_eq!(mask[move_index(0, 89)], 0.0);
    }

    #[test]
    fn test_planes_shape_and_contents() {
        let state = GameState::starting_position();
        let planes = state.to_planes();
        assert_eq!(planes.len(), NUM_PLANES * NUM_SQUARES);

        // Red rook plane (type 6 -> plane 5) has the two corner rooks.
        let rook_plane = (PieceType::Rook.id() as usize - 1) * NUM_SQUARES;
        assert_eq!(planes[rook_plane + index_of(0, 0)], 1.0);
        assert_eq!(planes[rook_plane + index_of(8, 0)], 1.0);
        assert_eq!(planes[rook_plane + index_of(4, 0)], 0.0);

        // Black king plane.
        let bk_plane = (NUM_PIECE_TYPES + PieceType::King.id() as usize - 1) * NUM_SQUARES;
        assert_eq!(planes[bk_plane + index_of(4, 9)], 1.0);

        // Side-to-move plane is all ones for RED.
        let side = 2 * NUM_PIECE_TYPES * NUM_SQUARES;
        assert!(planes[side..side + NUM_SQUARES].iter().all(|&v| v == 1.0));

        // One bit per piece across the piece planes.
        let bits: f32 = planes[..side].iter().sum();
        assert_eq!(bits, 32.0);
    }

    #[test]
    fn test_side_plane_flips() {
        let mut state = GameState::starting_position();
        let mv = Move::new(index_of(0, 3), index_of(0, 4), PieceType::Pawn, None);
        state.apply_move(mv);
        let planes = state.to_planes();
        let side = 2 * NUM_PIECE_TYPES * NUM_SQUARES;
        assert!(planes[side..side + NUM_SQUARES].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_move_index_round_trip() {
        let mv = Move::new(17, 26, PieceType::Pawn, None);
        assert_eq!(mv.index(), move_index(17, 26));
        assert_eq!(move_index(89, 89), POLICY_SIZE - 1);
    }
}
