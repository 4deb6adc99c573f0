//! Game state with incremental apply/undo.
//!
//! [`GameState`] owns the board, side to move, Zobrist hash, an undo
//! stack, and four per-ply history sequences that grow and shrink in
//! lockstep with it: position hashes, gave-check flags, capture flags,
//! and chase pairs. A stable per-square piece-identity array (assigned
//! once at setup, RED positive / BLACK negative) supports the strict
//! perpetual-chase rule, and cached king squares give O(1) check
//! lookups.
//!
//! The state is designed to be mutated in place by search: `apply_move`
//! followed by `undo_move` restores every field exactly, with the hash
//! restored verbatim from the undo record rather than recomputed.

use std::sync::Arc;

use crate::board::{
    self, make_piece, piece_color, piece_type, Color, PieceType, FILES, NUM_SQUARES,
};
use crate::error::RulesError;
use crate::moves::Move;
use crate::zobrist::Zobrist;

/// Stable piece identity: RED pieces get ids 1..=16, BLACK -1..=-16,
/// zero for empty squares. Identities travel with pieces across moves
/// and are used only for chase-cycle detection.
pub type PieceId = i16;

/// A chase record for one ply: (chaser identity, threatened identity).
pub type ChasePair = (PieceId, PieceId);

/// Final game outcome. Ongoing games are represented by `None` at the
/// [`GameState::result`] call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    RedWin,
    BlackWin,
    Draw,
}

/// Everything needed to reverse one `apply_move` with no recomputation.
#[derive(Debug, Clone)]
struct Undo {
    from_sq: usize,
    to_sq: usize,
    captured: i8,
    prev_from_id: PieceId,
    prev_to_id: PieceId,
    prev_hash: u64,
    prev_side: Color,
    prev_red_king: Option<usize>,
    prev_black_king: Option<usize>,
}

/// Board state, histories, and incremental apply/undo.
#[derive(Debug, Clone)]
pub struct GameState {
    board: [i8; NUM_SQUARES],
    side_to_move: Color,
    zobrist: Arc<Zobrist>,
    hash: u64,
    undo_stack: Vec<Undo>,
    // Per-ply histories, including the initial position at index 0.
    history: Vec<u64>,
    history_gives_check: Vec<bool>,
    history_capture: Vec<bool>,
    history_chase_pair: Vec<Option<ChasePair>>,
    ids: [PieceId; NUM_SQUARES],
    red_king: Option<usize>,
    black_king: Option<usize>,
}

impl GameState {
    /// Empty board, RED to move.
    pub fn new() -> GameState {
        GameState::from_board([0; NUM_SQUARES], Color::Red)
    }

    /// The standard Xiangqi starting layout, RED to move.
    pub fn starting_position() -> GameState {
        let mut board = [0i8; NUM_SQUARES];
        let mut place = |file: usize, rank: usize, pt: PieceType, color: Color| {
            board[board::index_of(file, rank)] = make_piece(color, pt);
        };
        for (color, back, cannon_rank, pawn_rank) in
            [(Color::Red, 0, 2, 3), (Color::Black, 9, 7, 6)]
        {
            place(0, back, PieceType::Rook, color);
            place(8, back, PieceType::Rook, color);
            place(1, back, PieceType::Knight, color);
            place(7, back, PieceType::Knight, color);
            place(2, back, PieceType::Bishop, color);
            place(6, back, PieceType::Bishop, color);
            place(3, back, PieceType::Advisor, color);
            place(5, back, PieceType::Advisor, color);
            place(4, back, PieceType::King, color);
            place(1, cannon_rank, PieceType::Cannon, color);
            place(7, cannon_rank, PieceType::Cannon, color);
            for file in (0..FILES).step_by(2) {
                place(file, pawn_rank, PieceType::Pawn, color);
            }
        }
        GameState::from_board(board, Color::Red)
    }

    /// Build a state from an arbitrary board layout using the default
    /// Zobrist table. Identities, hash, and king caches are derived.
    pub fn from_board(board: [i8; NUM_SQUARES], side_to_move: Color) -> GameState {
        GameState::from_board_with_zobrist(board, side_to_move, Arc::new(Zobrist::new()))
    }

    /// Build a state from a board layout and a shared Zobrist table.
    pub fn from_board_with_zobrist(
        board: [i8; NUM_SQUARES],
        side_to_move: Color,
        zobrist: Arc<Zobrist>,
    ) -> GameState {
        let mut state = GameState {
            board,
            side_to_move,
            zobrist,
            hash: 0,
            undo_stack: Vec::new(),
            history: Vec::new(),
            history_gives_check: Vec::new(),
            history_capture: Vec::new(),
            history_chase_pair: Vec::new(),
            ids: [0; NUM_SQUARES],
            red_king: None,
            black_king: None,
        };
        state.init_derived();
        state
    }

    /// Assign piece identities, compute the initial hash, and locate the
    /// kings. Histories restart at the current position.
    fn init_derived(&mut self) {
        let mut hash = 0u64;
        let mut next_red: PieceId = 1;
        let mut next_black: PieceId = -1;
        self.ids = [0; NUM_SQUARES];
        self.red_king = None;
        self.black_king = None;
        for sq in 0..NUM_SQUARES {
            let code = self.board[sq];
            if code == 0 {
                continue;
            }
            let color = piece_color(code).expect("nonzero code has a color");
            let pt = piece_type(code).expect("nonzero code has a type");
            hash ^= self.zobrist.piece_key(color, pt, sq);
            match color {
                Color::Red => {
                    self.ids[sq] = next_red;
                    next_red += 1;
                }
                Color::Black => {
                    self.ids[sq] = next_black;
                    next_black -= 1;
                }
            }
            if pt == PieceType::King {
                match color {
                    Color::Red => self.red_king = Some(sq),
                    Color::Black => self.black_king = Some(sq),
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= self.zobrist.side_key();
        }
        self.hash = hash;
        self.undo_stack.clear();
        self.history = vec![self.hash];
        self.history_gives_check = vec![false];
        self.history_capture = vec![false];
        self.history_chase_pair = vec![None];
    }

    #[inline]
    pub fn piece_at(&self, sq: usize) -> i8 {
        self.board[sq]
    }

    #[inline]
    pub fn board(&self) -> &[i8; NUM_SQUARES] {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Cached king square, `None` once that king has been captured.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<usize> {
        match color {
            Color::Red => self.red_king,
            Color::Black => self.black_king,
        }
    }

    /// Stable identity of the piece on `sq`, zero if empty.
    #[inline]
    pub fn piece_id(&self, sq: usize) -> PieceId {
        self.ids[sq]
    }

    /// Position hashes per ply, index 0 being the setup position.
    #[inline]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Number of plies played since setup.
    #[inline]
    pub fn ply(&self) -> usize {
        self.undo_stack.len()
    }

    /// The Zobrist table this state hashes with.
    #[inline]
    pub fn zobrist(&self) -> &Arc<Zobrist> {
        &self.zobrist
    }

    /// Recompute the hash from scratch. `hash()` must always agree with
    /// this; tests lean on that equivalence.
    pub fn recompute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for sq in 0..NUM_SQUARES {
            let code = self.board[sq];
            if code == 0 {
                continue;
            }
            let color = piece_color(code).expect("nonzero code has a color");
            let pt = piece_type(code).expect("nonzero code has a type");
            hash ^= self.zobrist.piece_key(color, pt, sq);
        }
        if self.side_to_move == Color::Black {
            hash ^= self.zobrist.side_key();
        }
        hash
    }

    /// Validated entry point for externally supplied moves: rejects
    /// anything not in the current legal-move set before mutating.
    pub fn try_move(&mut self, mv: Move) -> Result<(), RulesError> {
        let matched = self
            .legal_moves()
            .into_iter()
            .find(|m| m.from_sq() == mv.from_sq() && m.to_sq() == mv.to_sq());
        match matched {
            Some(m) => {
                self.apply_move(m);
                Ok(())
            }
            None => Err(RulesError::IllegalMove {
                from: mv.from_sq(),
                to: mv.to_sq(),
            }),
        }
    }

    /// Apply a move produced by this state's own move generation.
    ///
    /// This is the fast path used inside search; passing a move that did
    /// not come from [`GameState::legal_moves`] (or
    /// [`GameState::pseudo_legal_moves`] during legality filtering) on
    /// the exact current position is a contract violation. External
    /// callers should use [`GameState::try_move`].
    pub fn apply_move(&mut self, mv: Move) {
        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();
        let moving = self.board[from_sq];
        let captured = self.board[to_sq];
        debug_assert!(moving != 0, "apply_move from an empty square");
        debug_assert_eq!(
            piece_color(moving),
            Some(self.side_to_move),
            "apply_move with the wrong side's piece"
        );

        self.undo_stack.push(Undo {
            from_sq,
            to_sq,
            captured,
            prev_from_id: self.ids[from_sq],
            prev_to_id: self.ids[to_sq],
            prev_hash: self.hash,
            prev_side: self.side_to_move,
            prev_red_king: self.red_king,
            prev_black_king: self.black_king,
        });

        let moving_color = piece_color(moving).expect("moving piece has a color");
        let moving_type = piece_type(moving).expect("moving piece has a type");

        self.hash ^= self.zobrist.piece_key(moving_color, moving_type, from_sq);
        if captured != 0 {
            let cap_color = piece_color(captured).expect("captured piece has a color");
            let cap_type = piece_type(captured).expect("captured piece has a type");
            self.hash ^= self.zobrist.piece_key(cap_color, cap_type, to_sq);
            // A captured king drops out of the cache; the game is over
            // and is_in_check must report false for the missing king.
            if cap_type == PieceType::King {
                match cap_color {
                    Color::Red => self.red_king = None,
                    Color::Black => self.black_king = None,
                }
            }
        }

        self.board[to_sq] = moving;
        self.board[from_sq] = 0;
        self.ids[to_sq] = self.ids[from_sq];
        self.ids[from_sq] = 0;
        self.hash ^= self.zobrist.piece_key(moving_color, moving_type, to_sq);

        if moving_type == PieceType::King {
            match moving_color {
                Color::Red => self.red_king = Some(to_sq),
                Color::Black => self.black_king = Some(to_sq),
            }
        }

        self.side_to_move = self.side_to_move.opponent();
        self.hash ^= self.zobrist.side_key();

        let gave_check = self.is_in_check(self.side_to_move);
        self.history.push(self.hash);
        self.history_gives_check.push(gave_check);
        self.history_capture.push(captured != 0);

        // Chase pair: after a quiet move, record (chaser, target) iff
        // the moved piece now threatens exactly one enemy piece.
        let chase_pair = if !gave_check && captured == 0 {
            let moved_id = self.ids[to_sq];
            let targets = self.capture_targets(to_sq, moving_type, moving_color);
            let mut unique: Option<PieceId> = None;
            let mut count = 0usize;
            for tsq in targets {
                let pid = self.ids[tsq];
                if pid != 0 && (pid > 0) != (moved_id > 0) {
                    count += 1;
                    unique = Some(pid);
                }
            }
            if count == 1 {
                unique.map(|target| (moved_id, target))
            } else {
                None
            }
        } else {
            None
        };
        self.history_chase_pair.push(chase_pair);
    }

    /// Reverse the most recent `apply_move` exactly.
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied: an underflow here means the
    /// caller's bookkeeping has desynchronized from the state, which is
    /// unrecoverable.
    pub fn undo_move(&mut self) {
        let prev = self
            .undo_stack
            .pop()
            .expect("undo_move called with no prior move");
        let moving = self.board[prev.to_sq];
        self.board[prev.from_sq] = moving;
        self.board[prev.to_sq] = prev.captured;
        self.ids[prev.from_sq] = prev.prev_from_id;
        self.ids[prev.to_sq] = prev.prev_to_id;
        self.red_king = prev.prev_red_king;
        self.black_king = prev.prev_black_king;
        self.side_to_move = prev.prev_side;
        self.hash = prev.prev_hash;
        self.history.pop();
        self.history_gives_check.pop();
        self.history_capture.pop();
        self.history_chase_pair.pop();
    }

    /// Whether the current position has occurred at least three times
    /// (exact hash match, which includes the side to move).
    pub fn threefold_repetition(&self) -> bool {
        let cur = self.hash;
        self.history.iter().filter(|&&h| h == cur).count() >= 3
    }

    /// Checkmate test for the side to move.
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check(self.side_to_move) && self.legal_moves().is_empty()
    }

    /// Stalemate test for the side to move.
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.side_to_move) && self.legal_moves().is_empty()
    }

    /// Adjudicate the position: a missing king loses immediately,
    /// checkmate decides the winner, stalemate and threefold repetition
    /// draw. `None` means the game is ongoing.
    pub fn result(&mut self) -> Option<GameResult> {
        if self.red_king.is_none() {
            return Some(GameResult::BlackWin);
        }
        if self.black_king.is_none() {
            return Some(GameResult::RedWin);
        }
        if self.legal_moves().is_empty() {
            if self.is_in_check(self.side_to_move) {
                return Some(match self.side_to_move {
                    Color::Red => GameResult::BlackWin,
                    Color::Black => GameResult::RedWin,
                });
            }
            return Some(GameResult::Draw);
        }
        if self.threefold_repetition() {
            return Some(GameResult::Draw);
        }
        None
    }

    /// Most recent occurrence of the current hash before `end`.
    fn prev_occurrence(&self, end: usize) -> Option<usize> {
        let cur = self.history[end];
        (0..end).rev().find(|&i| self.history[i] == cur)
    }

    /// Indices of the repeating cycle ending at `end` with period
    /// `step`, walking back to the start of the history.
    fn cycle_indices(end: usize, step: usize) -> impl Iterator<Item = usize> {
        (0..=end / step).map(move |k| end - k * step)
    }

    /// Perpetual-check prohibition: called right after applying a
    /// candidate move. Forbidden when the move gave check and the
    /// position repeats with a fixed period whose every cycle step was a
    /// non-capture checking move. An approximation of the official
    /// rule; see the crate documentation.
    pub(crate) fn long_check_forbidden(&self) -> bool {
        let end = self.history.len() - 1;
        if end == 0 || !self.history_gives_check[end] {
            return false;
        }
        let Some(prev) = self.prev_occurrence(end) else {
            return false;
        };
        let step = end - prev;
        if end / step + 1 < 3 {
            return false;
        }
        Self::cycle_indices(end, step)
            .all(|i| self.history_gives_check[i] && !self.history_capture[i])
    }

    /// Loose perpetual-chase prohibition: a repeating quiet cycle
    /// (period >= 2, no captures, no checks at any cycle step) re-entered
    /// for the third time is forbidden.
    pub(crate) fn long_chase_forbidden(&self) -> bool {
        let end = self.history.len() - 1;
        if end == 0 || self.history_capture[end] || self.history_gives_check[end] {
            return false;
        }
        let Some(prev) = self.prev_occurrence(end) else {
            return false;
        };
        let step = end - prev;
        if step < 2 || end / step + 1 < 3 {
            return false;
        }
        Self::cycle_indices(end, step)
            .all(|i| !self.history_capture[i] && !self.history_gives_check[i])
    }

    /// Strict perpetual-chase prohibition: in addition to the loose
    /// conditions, every cycle step must carry the identical
    /// (chaser, target) identity pair.
    pub(crate) fn long_chase_forbidden_strict(&self) -> bool {
        let end = self.history.len() - 1;
        if end == 0 {
            return false;
        }
        let Some(pair) = self.history_chase_pair[end] else {
            return false;
        };
        let Some(prev) = self.prev_occurrence(end) else {
            return false;
        };
        let step = end - prev;
        if step < 2 || end / step + 1 < 3 {
            return false;
        }
        Self::cycle_indices(end, step).all(|i| {
            !self.history_capture[i]
                && !self.history_gives_check[i]
                && self.history_chase_pair[i] == Some(pair)
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
