//! Fail-soft negamax with transposition table and quiescence.

use tracing::debug;

use xq_core::{Color, GameState, Move, PieceType, POLICY_SIZE};

use crate::evaluator::{piece_value, Evaluator, MaterialEvaluator};
use crate::table::{Bound, TranspositionTable, TtEntry};

/// Base mate score; actual mate scores are `MATE_SCORE - ply` so that
/// shorter mates compare higher.
pub const MATE_SCORE: i32 = 9_999_999;
/// Sentinel beyond any reachable score.
pub const SCORE_INF: i32 = 10_000_000;
/// Hard recursion ceiling, counting quiescence plies.
pub const MAX_PLY: usize = 128;

/// Result of one search call.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub best: Option<Move>,
    pub score: i32,
    pub nodes: u64,
}

/// Killer moves and history counters, reset per search call.
struct Heuristics {
    killers: Vec<[Option<Move>; 2]>,
    history: Vec<u32>,
}

impl Heuristics {
    fn new() -> Heuristics {
        Heuristics {
            killers: vec![[None; 2]; MAX_PLY],
            history: vec![0; POLICY_SIZE],
        }
    }

    fn is_killer(&self, mv: Move, ply: usize) -> bool {
        self.killers[ply].contains(&Some(mv))
    }

    fn record_cutoff(&mut self, mv: Move, ply: usize, depth: u32) {
        if mv.is_capture() {
            return;
        }
        let slots = &mut self.killers[ply];
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
        self.history[mv.index()] += depth * depth;
    }
}

struct Searcher<'a, E: Evaluator> {
    tt: &'a mut TranspositionTable,
    evaluator: &'a E,
    use_quiescence: bool,
    heur: Heuristics,
    nodes: u64,
}

impl<E: Evaluator> Searcher<'_, E> {
    /// Static score from the side-to-move's point of view.
    fn eval(&self, state: &GameState) -> i32 {
        let red_pov = self.evaluator.evaluate(state);
        match state.side_to_move() {
            Color::Red => red_pov,
            Color::Black => -red_pov,
        }
    }

    /// Sort moves in place: TT best, then captures by MVV/LVA, then
    /// killers, then history counters.
    fn order(&self, moves: &mut [Move], ply: usize, tt_best: Option<Move>) {
        moves.sort_by_key(|&mv| {
            if tt_best == Some(mv) {
                (0u8, 0i32, 0i32)
            } else if mv.is_capture() {
                let victim = piece_value(mv.captured_type().unwrap_or(PieceType::Pawn));
                (1, -victim, piece_value(mv.moving_type()))
            } else if self.heur.is_killer(mv, ply) {
                (2, 0, 0)
            } else {
                (3, -(self.heur.history[mv.index()] as i32), 0)
            }
        });
    }

    fn negamax(
        &mut self,
        state: &mut GameState,
        depth: u32,
        ply: usize,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        let side = state.side_to_move();
        if state.king_square(side).is_none() {
            return -(MATE_SCORE - ply as i32);
        }
        if state.king_square(side.opponent()).is_none() {
            return MATE_SCORE - ply as i32;
        }
        if ply > 0 && state.threefold_repetition() {
            return 0;
        }

        let hash = state.hash();
        let mut tt_best = None;
        if let Some(entry) = self.tt.get(hash) {
            tt_best = entry.best;
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower => alpha = alpha.max(entry.score),
                    Bound::Upper => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
        }

        if ply >= MAX_PLY {
            return self.eval(state);
        }
        if depth == 0 {
            return if self.use_quiescence {
                self.qsearch(state, ply, alpha, beta)
            } else {
                self.eval(state)
            };
        }

        let mut moves = state.legal_moves();
        if moves.is_empty() {
            return if state.is_in_check(side) {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
        }
        self.order(&mut moves, ply, tt_best);

        let alpha_orig = alpha;
        let mut best_score = -SCORE_INF;
        let mut best_move = None;
        for mv in moves {
            state.apply_move(mv);
            let score = -self.negamax(state, depth - 1, ply + 1, -beta, -alpha);
            state.undo_move();
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                self.heur.record_cutoff(mv, ply, depth);
                break;
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.put(
            hash,
            TtEntry {
                depth,
                bound,
                score: best_score,
                best: best_move,
            },
        );
        best_score
    }

    /// Captures-only extension past the horizon, anchored by stand-pat.
    fn qsearch(&mut self, state: &mut GameState, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        let side = state.side_to_move();
        if state.king_square(side).is_none() {
            return -(MATE_SCORE - ply as i32);
        }
        if state.king_square(side.opponent()).is_none() {
            return MATE_SCORE - ply as i32;
        }

        let stand = self.eval(state);
        if stand >= beta || ply >= MAX_PLY {
            return stand;
        }
        alpha = alpha.max(stand);

        let mut captures: Vec<Move> = state
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.is_capture())
            .collect();
        captures.sort_by_key(|mv| {
            let victim = piece_value(mv.captured_type().unwrap_or(PieceType::Pawn));
            (-victim, piece_value(mv.moving_type()))
        });

        let mut best = stand;
        for mv in captures {
            state.apply_move(mv);
            let score = -self.qsearch(state, ply + 1, -beta, -alpha);
            state.undo_move();
            if score > best {
                best = score;
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

/// Search with an explicit evaluator. Returns the best root move (or
/// `None` on terminal positions), the side-to-move score, and the node
/// count.
pub fn search_with<E: Evaluator>(
    state: &mut GameState,
    depth: u32,
    tt: &mut TranspositionTable,
    use_quiescence: bool,
    evaluator: &E,
) -> SearchOutcome {
    let root_hash = state.hash();
    let mut searcher = Searcher {
        tt,
        evaluator,
        use_quiescence,
        heur: Heuristics::new(),
        nodes: 0,
    };
    let score = searcher.negamax(state, depth, 0, -SCORE_INF, SCORE_INF);
    let best = searcher.tt.get(root_hash).and_then(|entry| entry.best);
    debug!(depth, score, nodes = searcher.nodes, "search complete");
    SearchOutcome {
        best,
        score,
        nodes: searcher.nodes,
    }
}

/// Search with the material evaluator.
pub fn search(
    state: &mut GameState,
    depth: u32,
    tt: &mut TranspositionTable,
    use_quiescence: bool,
) -> SearchOutcome {
    search_with(state, depth, tt, use_quiescence, &MaterialEvaluator)
}
