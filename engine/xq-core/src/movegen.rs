//! Move generation and attack detection.
//!
//! Pseudo-legal generation enforces piece movement rules only; the
//! legality filter additionally rejects moves that leave the mover's
//! king attacked (which covers the king-facing rule) and moves forbidden
//! by the perpetual-check and perpetual-chase prohibitions. Filtering
//! works by applying each candidate on the state itself and undoing it,
//! so `legal_moves` takes `&mut self`.

use crate::board::{
    across_river, file_of, in_bounds, in_palace, index_of, piece_color, piece_type, rank_of,
    Color, PieceType, ADVISOR_DELTAS, BISHOP_DELTAS, KNIGHT_DELTAS, NUM_SQUARES, ORTHO_DELTAS,
};
use crate::moves::Move;
use crate::state::GameState;

impl GameState {
    /// All moves obeying piece movement rules for the side to move,
    /// before check and repetition filtering.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let color = self.side_to_move();
        let mut out = Vec::with_capacity(64);
        for sq in 0..NUM_SQUARES {
            let code = self.piece_at(sq);
            if code == 0 || piece_color(code) != Some(color) {
                continue;
            }
            let pt = piece_type(code).expect("nonzero code has a type");
            self.gen_piece_moves(sq, pt, color, &mut out);
        }
        out
    }

    /// Fully legal moves for the side to move. Each candidate is applied
    /// and undone; survivors carry an accurate check flag.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let mover = self.side_to_move();
        let pseudo = self.pseudo_legal_moves();
        let mut legal = Vec::with_capacity(pseudo.len());
        for mv in pseudo {
            self.apply_move(mv);
            let gives_check = self.is_in_check(self.side_to_move());
            let ok = !self.is_in_check(mover)
                && !self.long_check_forbidden()
                && !self.long_chase_forbidden_strict()
                && !self.long_chase_forbidden();
            self.undo_move();
            if ok {
                legal.push(mv.with_check_flag(gives_check));
            }
        }
        legal
    }

    /// Whether `color`'s king is attacked. A captured king is never in
    /// check.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(ksq) => self.square_attacked_by(ksq, color.opponent()),
            None => false,
        }
    }

    /// Squares holding enemy pieces that the piece on `from_sq` could
    /// capture right now. Feeds chase-pair detection.
    pub(crate) fn capture_targets(
        &self,
        from_sq: usize,
        pt: PieceType,
        color: Color,
    ) -> Vec<usize> {
        let mut moves = Vec::with_capacity(16);
        self.gen_piece_moves(from_sq, pt, color, &mut moves);
        moves
            .into_iter()
            .filter(|mv| mv.is_capture())
            .map(|mv| mv.to_sq())
            .collect()
    }

    fn gen_piece_moves(&self, from_sq: usize, pt: PieceType, color: Color, out: &mut Vec<Move>) {
        match pt {
            PieceType::Rook => self.gen_rook(from_sq, color, out),
            PieceType::Cannon => self.gen_cannon(from_sq, color, out),
            PieceType::Knight => self.gen_knight(from_sq, color, out),
            PieceType::Bishop => self.gen_bishop(from_sq, color, out),
            PieceType::Advisor => self.gen_advisor(from_sq, color, out),
            PieceType::King => self.gen_king(from_sq, color, out),
            PieceType::Pawn => self.gen_pawn(from_sq, color, out),
        }
    }

    /// Push a move to (file, rank) if the destination is empty or holds
    /// an enemy piece. Returns the occupant code for slider loops.
    fn push_if_landable(
        &self,
        from_sq: usize,
        pt: PieceType,
        color: Color,
        file: i32,
        rank: i32,
        out: &mut Vec<Move>,
    ) -> i8 {
        let to_sq = index_of(file as usize, rank as usize);
        let occ = self.piece_at(to_sq);
        if occ == 0 {
            out.push(Move::new(from_sq, to_sq, pt, None));
        } else if piece_color(occ) != Some(color) {
            out.push(Move::new(from_sq, to_sq, pt, piece_type(occ)));
        }
        occ
    }

    fn gen_rook(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for delta in ORTHO_DELTAS {
            let (mut f, mut r) = (f0 + delta.df, r0 + delta.dr);
            while in_bounds(f, r) {
                let occ = self.push_if_landable(from_sq, PieceType::Rook, color, f, r, out);
                if occ != 0 {
                    break;
                }
                f += delta.df;
                r += delta.dr;
            }
        }
    }

    fn gen_cannon(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for delta in ORTHO_DELTAS {
            let (mut f, mut r) = (f0 + delta.df, r0 + delta.dr);
            // Quiet slides up to the screen.
            while in_bounds(f, r) && self.piece_at(index_of(f as usize, r as usize)) == 0 {
                out.push(Move::new(
                    from_sq,
                    index_of(f as usize, r as usize),
                    PieceType::Cannon,
                    None,
                ));
                f += delta.df;
                r += delta.dr;
            }
            // Skip the screen, then capture the next occupied square.
            f += delta.df;
            r += delta.dr;
            while in_bounds(f, r) {
                let to_sq = index_of(f as usize, r as usize);
                let occ = self.piece_at(to_sq);
                if occ != 0 {
                    if piece_color(occ) != Some(color) {
                        out.push(Move::new(from_sq, to_sq, PieceType::Cannon, piece_type(occ)));
                    }
                    break;
                }
                f += delta.df;
                r += delta.dr;
            }
        }
    }

    fn gen_knight(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for (target, leg) in KNIGHT_DELTAS {
            let (f, r) = (f0 + target.df, r0 + target.dr);
            if !in_bounds(f, r) {
                continue;
            }
            let leg_sq = index_of((f0 + leg.df) as usize, (r0 + leg.dr) as usize);
            if self.piece_at(leg_sq) != 0 {
                continue;
            }
            self.push_if_landable(from_sq, PieceType::Knight, color, f, r, out);
        }
    }

    fn gen_bishop(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for (target, eye) in BISHOP_DELTAS {
            let (f, r) = (f0 + target.df, r0 + target.dr);
            if !in_bounds(f, r) || across_river(color, r as usize) {
                continue;
            }
            let eye_sq = index_of((f0 + eye.df) as usize, (r0 + eye.dr) as usize);
            if self.piece_at(eye_sq) != 0 {
                continue;
            }
            self.push_if_landable(from_sq, PieceType::Bishop, color, f, r, out);
        }
    }

    fn gen_advisor(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for delta in ADVISOR_DELTAS {
            let (f, r) = (f0 + delta.df, r0 + delta.dr);
            if in_palace(color, f, r) {
                self.push_if_landable(from_sq, PieceType::Advisor, color, f, r, out);
            }
        }
    }

    fn gen_king(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        for delta in ORTHO_DELTAS {
            let (f, r) = (f0 + delta.df, r0 + delta.dr);
            if in_palace(color, f, r) {
                self.push_if_landable(from_sq, PieceType::King, color, f, r, out);
            }
        }
    }

    fn gen_pawn(&self, from_sq: usize, color: Color, out: &mut Vec<Move>) {
        let (f0, r0) = (file_of(from_sq) as i32, rank_of(from_sq) as i32);
        let forward = color.sign() as i32;
        if in_bounds(f0, r0 + forward) {
            self.push_if_landable(from_sq, PieceType::Pawn, color, f0, r0 + forward, out);
        }
        // Sideways steps unlock after crossing the river.
        if across_river(color, r0 as usize) {
            for df in [-1, 1] {
                if in_bounds(f0 + df, r0) {
                    self.push_if_landable(from_sq, PieceType::Pawn, color, f0 + df, r0, out);
                }
            }
        }
    }

    /// Whether any piece of `attacker` attacks `sq`.
    ///
    /// An attacker king found along an orthogonal ray counts as an
    /// attack; queried on a king square this implements the facing rule.
    fn square_attacked_by(&self, sq: usize, attacker: Color) -> bool {
        let (f0, r0) = (file_of(sq) as i32, rank_of(sq) as i32);
        let is_attacker = |code: i8, pt: PieceType| -> bool {
            piece_color(code) == Some(attacker) && piece_type(code) == Some(pt)
        };

        // Rook or king along open orthogonal rays, cannon over one screen.
        for delta in ORTHO_DELTAS {
            let (mut f, mut r) = (f0 + delta.df, r0 + delta.dr);
            let mut screen_seen = false;
            while in_bounds(f, r) {
                let occ = self.piece_at(index_of(f as usize, r as usize));
                if occ != 0 {
                    if !screen_seen {
                        if is_attacker(occ, PieceType::Rook) || is_attacker(occ, PieceType::King) {
                            return true;
                        }
                        screen_seen = true;
                    } else {
                        if is_attacker(occ, PieceType::Cannon) {
                            return true;
                        }
                        break;
                    }
                }
                f += delta.df;
                r += delta.dr;
            }
        }

        // Knight origins, with the leg checked from the origin square.
        for (target, leg) in KNIGHT_DELTAS {
            let (of, or) = (f0 - target.df, r0 - target.dr);
            if !in_bounds(of, or) {
                continue;
            }
            let origin = index_of(of as usize, or as usize);
            if !is_attacker(self.piece_at(origin), PieceType::Knight) {
                continue;
            }
            let leg_sq = index_of((of + leg.df) as usize, (or + leg.dr) as usize);
            if self.piece_at(leg_sq) == 0 {
                return true;
            }
        }

        // Pawn one step ahead of its own forward direction, or beside
        // the square once across the river.
        let forward = attacker.sign() as i32;
        if in_bounds(f0, r0 - forward) {
            let origin = index_of(f0 as usize, (r0 - forward) as usize);
            if is_attacker(self.piece_at(origin), PieceType::Pawn) {
                return true;
            }
        }
        for df in [-1, 1] {
            if !in_bounds(f0 + df, r0) {
                continue;
            }
            let origin = index_of((f0 + df) as usize, r0 as usize);
            if is_attacker(self.piece_at(origin), PieceType::Pawn)
                && across_river(attacker, r0 as usize)
            {
                return true;
            }
        }

        // Advisor and bishop, for completeness on non-king squares.
        for delta in ADVISOR_DELTAS {
            let (of, or) = (f0 - delta.df, r0 - delta.dr);
            if in_bounds(of, or)
                && in_palace(attacker, f0, r0)
                && is_attacker(self.piece_at(index_of(of as usize, or as usize)), PieceType::Advisor)
            {
                return true;
            }
        }
        for (target, eye) in BISHOP_DELTAS {
            let (of, or) = (f0 - target.df, r0 - target.dr);
            if !in_bounds(of, or) || across_river(attacker, r0 as usize) {
                continue;
            }
            let origin = index_of(of as usize, or as usize);
            if !is_attacker(self.piece_at(origin), PieceType::Bishop) {
                continue;
            }
            let eye_sq = index_of((of + eye.df) as usize, (or + eye.dr) as usize);
            if self.piece_at(eye_sq) == 0 {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::make_piece;
    use crate::state::GameState;

    fn board_with(pieces: &[(usize, usize, PieceType, Color)]) -> [i8; NUM_SQUARES] {
        let mut board = [0i8; NUM_SQUARES];
        for &(file, rank, pt, color) in pieces {
            board[index_of(file, rank)] = make_piece(color, pt);
        }
        board
    }

    fn moves_from(state: &mut GameState, file: usize, rank: usize) -> Vec<Move> {
        let from = index_of(file, rank);
        state
            .legal_moves()
            .into_iter()
            .filter(|m| m.from_sq() == from)
            .collect()
    }

    #[test]
    fn test_starting_position_has_44_moves() {
        let mut state = GameState::starting_position();
        assert_eq!(state.legal_moves().len(), 44);
    }

    #[test]
    fn test_cannon_screen_capture() {
        // Cannon e2, screen pawn e4, black rook e6: capture over the
        // screen only; e4 and e6 are not quiet destinations.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (5, 9, PieceType::King, Color::Black),
                (3, 2, PieceType::Cannon, Color::Red),
                (3, 4, PieceType::Pawn, Color::Red),
                (3, 6, PieceType::Rook, Color::Black),
            ]),
            Color::Red,
        );
        let cannon_moves = moves_from(&mut state, 3, 2);
        let captures: Vec<_> = cannon_moves.iter().filter(|m| m.is_capture()).collect();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].to_sq(), index_of(3, 6));
        assert!(!cannon_moves.iter().any(|m| m.to_sq() == index_of(3, 4)));
        // Quiet slide stops short of the screen.
        assert!(cannon_moves.iter().any(|m| m.to_sq() == index_of(3, 3)));
        assert!(!cannon_moves.iter().any(|m| m.to_sq() == index_of(3, 5)));
    }

    #[test]
    fn test_knight_leg_blocking() {
        let free = board_with(&[
            (3, 0, PieceType::King, Color::Red),
            (4, 9, PieceType::King, Color::Black),
            (4, 4, PieceType::Knight, Color::Red),
        ]);
        let mut state = GameState::from_board(free, Color::Red);
        assert_eq!(moves_from(&mut state, 4, 4).len(), 8);

        // A piece on the upward leg removes both upward jumps.
        let mut blocked = free;
        blocked[index_of(4, 5)] = make_piece(Color::Red, PieceType::Pawn);
        let mut state = GameState::from_board(blocked, Color::Red);
        let knight_moves = moves_from(&mut state, 4, 4);
        assert_eq!(knight_moves.len(), 6);
        assert!(!knight_moves.iter().any(|m| m.to_sq() == index_of(3, 6)));
        assert!(!knight_moves.iter().any(|m| m.to_sq() == index_of(5, 6)));
    }

    #[test]
    fn test_bishop_eye_and_river() {
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::King, Color::Black),
                (2, 0, PieceType::Bishop, Color::Red),
            ]),
            Color::Red,
        );
        let moves = moves_from(&mut state, 2, 0);
        assert_eq!(moves.len(), 2);

        // Blocking one eye removes that diagonal.
        let mut blocked = *state.board();
        blocked[index_of(3, 1)] = make_piece(Color::Red, PieceType::Pawn);
        let mut state = GameState::from_board(blocked, Color::Red);
        let moves = moves_from(&mut state, 2, 0);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to_sq(), index_of(0, 2));

        // A bishop on rank 4 may not cross to rank 6.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::King, Color::Black),
                (2, 4, PieceType::Bishop, Color::Red),
            ]),
            Color::Red,
        );
        let moves = moves_from(&mut state, 2, 4);
        assert!(moves.iter().all(|m| rank_of(m.to_sq()) <= 4));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_pawn_sideways_after_river() {
        // Red pawn on its own side: forward only.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::King, Color::Black),
                (2, 4, PieceType::Pawn, Color::Red),
            ]),
            Color::Red,
        );
        assert_eq!(moves_from(&mut state, 2, 4).len(), 1);

        // Across the river: forward and both sideways.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::King, Color::Black),
                (2, 5, PieceType::Pawn, Color::Red),
            ]),
            Color::Red,
        );
        assert_eq!(moves_from(&mut state, 2, 5).len(), 3);

        // On the last rank only sideways remains.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::King, Color::Black),
                (7, 9, PieceType::Pawn, Color::Red),
            ]),
            Color::Red,
        );
        assert_eq!(moves_from(&mut state, 7, 9).len(), 2);
    }

    #[test]
    fn test_king_facing_rule() {
        // Kings on the e file with nothing between: red may not step
        // back onto the file, and the sideways step stays available.
        let mut state = GameState::from_board(
            board_with(&[
                (3, 0, PieceType::King, Color::Red),
                (3, 9, PieceType::Advisor, Color::Black),
                (4, 9, PieceType::King, Color::Black),
            ]),
            Color::Red,
        );
        let king_moves = moves_from(&mut state, 3, 0);
        assert!(!king_moves.iter().any(|m| m.to_sq() == index_of(4, 0)));
        assert!(king_moves.iter().any(|m| m.to_sq() == index_of(3, 1)));
    }

    #[test]
    fn test_check_evasion_only() {
        // Black king in check from a red rook: black must resolve it.
        let mut state = GameState::from_board(
            board_with(&[
                (3, 0, PieceType::King, Color::Red),
                (4, 9, PieceType::King, Color::Black),
                (4, 5, PieceType::Rook, Color::Red),
                (0, 9, PieceType::Rook, Color::Black),
            ]),
            Color::Black,
        );
        assert!(state.is_in_check(Color::Black));
        let moves = state.legal_moves();
        assert!(!moves.is_empty());
        for mv in moves {
            state.apply_move(mv);
            assert!(!state.is_in_check(Color::Black));
            state.undo_move();
        }
    }

    #[test]
    fn test_back_rank_mate() {
        // Doubled red rooks on the a file pin the black king to its back
        // rank and cover the escape rank: checkmate.
        let mut state = GameState::from_board(
            board_with(&[
                (3, 0, PieceType::King, Color::Red),
                (4, 9, PieceType::King, Color::Black),
                (0, 9, PieceType::Rook, Color::Red),
                (0, 8, PieceType::Rook, Color::Red),
            ]),
            Color::Black,
        );
        assert!(state.is_in_check(Color::Black));
        assert!(state.is_checkmate());
        assert_eq!(state.result(), Some(crate::state::GameResult::RedWin));
    }

    #[test]
    fn test_pseudo_legal_includes_self_check() {
        // Moving the pinned rook is pseudo-legal but not legal.
        let mut state = GameState::from_board(
            board_with(&[
                (4, 0, PieceType::King, Color::Red),
                (4, 4, PieceType::Rook, Color::Red),
                (4, 7, PieceType::Rook, Color::Black),
                (4, 9, PieceType::King, Color::Black),
            ]),
            Color::Red,
        );
        let from = index_of(4, 4);
        let pseudo: Vec<_> = state
            .pseudo_legal_moves()
            .into_iter()
            .filter(|m| m.from_sq() == from)
            .collect();
        let legal = moves_from(&mut state, 4, 4);
        assert!(pseudo.iter().any(|m| file_of(m.to_sq()) != 4));
        assert!(legal.iter().all(|m| file_of(m.to_sq()) == 4));
    }

    #[test]
    fn test_capture_targets_startpos() {
        let state = GameState::starting_position();
        // The b-file cannon screens over the opposing cannon and
        // targets the knight behind it; nothing else is in reach.
        let targets = state.capture_targets(index_of(1, 2), PieceType::Cannon, Color::Red);
        assert_eq!(targets, vec![index_of(1, 9)]);
        // The a-file rook is boxed in by its own pawn and knight.
        let none = state.capture_targets(index_of(0, 0), PieceType::Rook, Color::Red);
        assert!(none.is_empty());
    }
}
