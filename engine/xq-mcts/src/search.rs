//! Search driver: selection, expansion, and backup.

use std::time::Instant;

use rand::distributions::{Distribution, WeightedIndex};
use rand_chacha::ChaCha20Rng;
use rand_distr::Gamma;
use thiserror::Error;
use tracing::trace;

use xq_core::board::piece_type;
use xq_core::{GameState, Move, PieceType, NUM_SQUARES};

use crate::config::MctsConfig;
use crate::node::NodeId;
use crate::policy::{PolicyError, PolicyValue};
use crate::tree::MctsTree;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("no legal moves in the root position")]
    NoLegalMoves,
}

/// Outcome of one search: the chosen move, the visit distribution over
/// the flat move space, the root's mean value, and how many simulations
/// actually ran before the budget expired.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub move_index: u16,
    pub policy: Vec<f32>,
    pub value: f32,
    pub simulations: u32,
}

/// One search instance over a policy source. The tree is rebuilt per
/// `run` call; simulations replay moves on clones of the root position.
pub struct MctsSearch<'a, P: PolicyValue> {
    policy: &'a P,
    config: MctsConfig,
}

impl<'a, P: PolicyValue> MctsSearch<'a, P> {
    pub fn new(policy: &'a P, config: MctsConfig) -> MctsSearch<'a, P> {
        MctsSearch { policy, config }
    }

    pub fn run(
        &self,
        root: &GameState,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult, SearchError> {
        let mut tree = MctsTree::new();
        let mut root_state = root.clone();
        let legal = root_state.legal_moves();
        if legal.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        let eval = self.policy.evaluate(&root_state)?;
        let mut priors = masked_priors(&eval.priors, &legal);
        if self.config.dirichlet_alpha > 0.0 && self.config.dirichlet_frac > 0.0 {
            mix_dirichlet(
                &mut priors,
                self.config.dirichlet_alpha,
                self.config.dirichlet_frac,
                rng,
            );
        }
        let root_id = tree.root();
        for (mv, &prior) in legal.iter().zip(priors.iter()) {
            tree.add_child(root_id, mv.index() as u16, prior);
        }

        let deadline = self.config.time_limit.map(|limit| Instant::now() + limit);
        let mut simulations = 0u32;
        while simulations < self.config.num_simulations {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }

            let mut state = root.clone();
            let mut node_id = root_id;
            while tree.get(node_id).is_expanded() && !tree.get(node_id).is_terminal {
                let Some(child) = tree.select_child(node_id, self.config.c_puct as f32) else {
                    break;
                };
                let mv = move_from_index(&state, tree.get(child).move_idx);
                state.apply_move(mv);
                node_id = child;
            }

            let value = self.evaluate_leaf(&mut tree, node_id, &mut state)?;
            tree.backpropagate(node_id, value);
            simulations += 1;
        }

        let policy = tree.action_probs(self.config.temperature);
        let move_index = self.pick_move(&tree, &policy, rng);
        let value = tree.get(root_id).mean_value();
        trace!(simulations, nodes = tree.len(), value, "search finished");
        Ok(SearchResult {
            move_index,
            policy,
            value,
            simulations,
        })
    }

    /// Adjudicate or expand the leaf; returns the value to back up,
    /// from the leaf's own perspective.
    fn evaluate_leaf(
        &self,
        tree: &mut MctsTree,
        node_id: NodeId,
        state: &mut GameState,
    ) -> Result<f32, SearchError> {
        if tree.get(node_id).is_terminal {
            return Ok(tree.get(node_id).terminal_value);
        }
        let side = state.side_to_move();
        if state.king_square(side).is_none() {
            return Ok(mark_terminal(tree, node_id, -1.0));
        }
        if state.king_square(side.opponent()).is_none() {
            return Ok(mark_terminal(tree, node_id, 1.0));
        }
        let legal = state.legal_moves();
        if legal.is_empty() {
            let value = if state.is_in_check(side) { -1.0 } else { 0.0 };
            return Ok(mark_terminal(tree, node_id, value));
        }
        if state.threefold_repetition() {
            return Ok(mark_terminal(tree, node_id, 0.0));
        }

        let eval = self.policy.evaluate(state)?;
        let priors = masked_priors(&eval.priors, &legal);
        for (mv, &prior) in legal.iter().zip(priors.iter()) {
            tree.add_child(node_id, mv.index() as u16, prior);
        }
        Ok(eval.value)
    }

    /// Sample from the visit distribution, or take the most visited
    /// move at near-zero temperature (and as the degenerate fallback).
    fn pick_move(&self, tree: &MctsTree, policy: &[f32], rng: &mut ChaCha20Rng) -> u16 {
        if self.config.temperature >= 1e-6 {
            if let Ok(dist) = WeightedIndex::new(policy.iter().copied()) {
                return dist.sample(rng) as u16;
            }
        }
        tree.best_move_index().unwrap_or(0)
    }
}

fn mark_terminal(tree: &mut MctsTree, node_id: NodeId, value: f32) -> f32 {
    let node = tree.get_mut(node_id);
    node.is_terminal = true;
    node.terminal_value = value;
    value
}

/// Rebuild a full move from a flat index against the position it will
/// be applied to. Indices stored in the tree always come from that
/// position's own legal move list.
fn move_from_index(state: &GameState, move_idx: u16) -> Move {
    let from_sq = move_idx as usize / NUM_SQUARES;
    let to_sq = move_idx as usize % NUM_SQUARES;
    let moving = piece_type(state.piece_at(from_sq)).unwrap_or(PieceType::Pawn);
    let captured = piece_type(state.piece_at(to_sq));
    Move::new(from_sq, to_sq, moving, captured)
}

/// Gather priors at the legal move indices and renormalize. A policy
/// that puts no mass on any legal move falls back to uniform.
fn masked_priors(priors: &[f32], legal: &[Move]) -> Vec<f32> {
    let mut masked: Vec<f32> = legal
        .iter()
        .map(|mv| priors.get(mv.index()).copied().unwrap_or(0.0).max(0.0))
        .collect();
    let total: f32 = masked.iter().sum();
    if total > 0.0 {
        for p in &mut masked {
            *p /= total;
        }
    } else {
        masked.fill(1.0 / legal.len() as f32);
    }
    masked
}

/// Blend Dirichlet noise into root priors:
/// `p = (1 - frac) * p + frac * noise`.
fn mix_dirichlet(priors: &mut [f32], alpha: f64, frac: f64, rng: &mut ChaCha20Rng) {
    let Ok(gamma) = Gamma::new(alpha, 1.0) else {
        return;
    };
    let mut noise: Vec<f64> = priors.iter().map(|_| gamma.sample(rng)).collect();
    let total: f64 = noise.iter().sum();
    if total <= 0.0 {
        return;
    }
    for n in &mut noise {
        *n /= total;
    }
    for (p, n) in priors.iter_mut().zip(noise.iter()) {
        *p = ((1.0 - frac) * *p as f64 + frac * n) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use xq_core::board::{index_of, make_piece};
    use xq_core::{Color, GameState, NUM_SQUARES, POLICY_SIZE};

    use crate::policy::{PolicyEval, UniformPolicy};

    fn board_with(pieces: &[(usize, usize, PieceType, Color)]) -> [i8; NUM_SQUARES] {
        let mut board = [0i8; NUM_SQUARES];
        for &(file, rank, pt, color) in pieces {
            board[index_of(file, rank)] = make_piece(color, pt);
        }
        board
    }

    fn test_config() -> MctsConfig {
        MctsConfig::default()
            .with_simulations(200)
            .with_temperature(0.0)
    }

    struct ZeroPolicy;
    impl PolicyValue for ZeroPolicy {
        fn evaluate(&self, _state: &GameState) -> Result<PolicyEval, PolicyError> {
            Ok(PolicyEval {
                priors: vec![0.0; POLICY_SIZE],
                value: 0.0,
            })
        }
    }

    #[test]
    fn test_finds_mate_in_one() {
        let mut state = GameState::from_board(
            board_with(&[
                (3, 0, PieceType::King, Color::Red),
                (4, 9, PieceType::King, Color::Black),
                (0, 8, PieceType::Rook, Color::Red),
                (8, 8, PieceType::Rook, Color::Red),
            ]),
            Color::Red,
        );
        let mut config = test_config();
        config.dirichlet_alpha = 0.0;
        let search = MctsSearch::new(&UniformPolicy, config);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let result = search.run(&state, &mut rng).unwrap();

        assert_eq!(result.simulations, 200);
        assert!(result.value > 0.5);
        let mv = move_from_index(&state, result.move_index);
        state.apply_move(mv);
        assert!(state.is_checkmate());
    }

    #[test]
    fn test_policy_mass_stays_on_legal_moves() {
        let mut state = GameState::starting_position();
        let config = MctsConfig::default()
            .with_simulations(50)
            .with_temperature(1.0);
        let search = MctsSearch::new(&UniformPolicy, config);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let result = search.run(&state, &mut rng).unwrap();

        let total: f32 = result.policy.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);

        let legal: Vec<usize> = state.legal_moves().iter().map(|mv| mv.index()).collect();
        for (idx, &p) in result.policy.iter().enumerate() {
            if p > 0.0 {
                assert!(legal.contains(&idx));
            }
        }
        assert!(legal.contains(&(result.move_index as usize)));
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        // Back-rank mate, black to move.
        let state = GameState::from_board(
            board_with(&[
                (3, 0, PieceType::King, Color::Red),
                (4, 9, PieceType::King, Color::Black),
                (0, 9, PieceType::Rook, Color::Red),
                (0, 8, PieceType::Rook, Color::Red),
            ]),
            Color::Black,
        );
        let search = MctsSearch::new(&UniformPolicy, test_config());
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            search.run(&state, &mut rng),
            Err(SearchError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_expired_time_limit_runs_no_simulations() {
        let state = GameState::starting_position();
        let config = test_config().with_time_limit(std::time::Duration::ZERO);
        let search = MctsSearch::new(&UniformPolicy, config);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let result = search.run(&state, &mut rng).unwrap();
        assert_eq!(result.simulations, 0);
        // Still picks some legal root move.
        let legal: Vec<usize> = GameState::starting_position()
            .legal_moves()
            .iter()
            .map(|mv| mv.index())
            .collect();
        assert!(legal.contains(&(result.move_index as usize)));
    }

    #[test]
    fn test_zero_policy_falls_back_to_uniform() {
        let state = GameState::starting_position();
        let config = MctsConfig::default()
            .with_simulations(30)
            .with_temperature(1.0);
        let search = MctsSearch::new(&ZeroPolicy, config);
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let result = search.run(&state, &mut rng).unwrap();
        assert_eq!(result.simulations, 30);
        let total: f32 = result.policy.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_search_is_deterministic_per_seed() {
        let state = GameState::starting_position();
        let config = MctsConfig::default()
            .with_simulations(40)
            .with_temperature(1.0);
        let search = MctsSearch::new(&UniformPolicy, config);

        let mut rng_a = ChaCha20Rng::seed_from_u64(11);
        let mut rng_b = ChaCha20Rng::seed_from_u64(11);
        let a = search.run(&state, &mut rng_a).unwrap();
        let b = search.run(&state, &mut rng_b).unwrap();
        assert_eq!(a.move_index, b.move_index);
        assert_eq!(a.policy, b.policy);
    }

    #[test]
    fn test_dirichlet_noise_keeps_distribution() {
        let mut priors = vec![0.25f32; 4];
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        mix_dirichlet(&mut priors, 0.3, 0.25, &mut rng);
        let total: f32 = priors.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        // Noise actually perturbs the priors.
        assert!(priors.iter().any(|&p| (p - 0.25).abs() > 1e-4));
    }

    #[test]
    fn test_masked_priors_renormalize() {
        let mut state = GameState::starting_position();
        let legal = state.legal_moves();
        let mut priors = vec![0.0f32; POLICY_SIZE];
        priors[legal[0].index()] = 0.2;
        priors[legal[1].index()] = 0.6;
        let masked = masked_priors(&priors, &legal);
        assert!((masked[0] - 0.25).abs() < 1e-6);
        assert!((masked[1] - 0.75).abs() < 1e-6);
        assert!(masked[2..].iter().all(|&p| p == 0.0));
    }
}
