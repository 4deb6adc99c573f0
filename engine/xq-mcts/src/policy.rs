//! Policy/value evaluation interface.

use thiserror::Error;

use xq_core::{GameState, POLICY_SIZE};

/// Errors surfaced by policy evaluation.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("prior vector has length {got}, expected {expected}")]
    BadPriorLength { expected: usize, got: usize },

    #[error("policy evaluation failed: {0}")]
    Eval(String),
}

/// One evaluation: move priors over the flat 8100-entry move space and
/// a scalar value in [-1, 1] from the side-to-move's perspective.
#[derive(Debug, Clone)]
pub struct PolicyEval {
    pub priors: Vec<f32>,
    pub value: f32,
}

impl PolicyEval {
    /// Validate the prior vector length.
    pub fn checked(priors: Vec<f32>, value: f32) -> Result<PolicyEval, PolicyError> {
        if priors.len() != POLICY_SIZE {
            return Err(PolicyError::BadPriorLength {
                expected: POLICY_SIZE,
                got: priors.len(),
            });
        }
        Ok(PolicyEval { priors, value })
    }
}

/// Source of priors and values for tree search. Implemented by model
/// wrappers; [`UniformPolicy`] is the modelless baseline.
pub trait PolicyValue: Send + Sync {
    fn evaluate(&self, state: &GameState) -> Result<PolicyEval, PolicyError>;
}

/// Uniform priors and a neutral value. The search masks and
/// renormalizes over legal moves, so this degrades PUCT into visit-count
/// driven exploration.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPolicy;

impl PolicyValue for UniformPolicy {
    fn evaluate(&self, _state: &GameState) -> Result<PolicyEval, PolicyError> {
        Ok(PolicyEval {
            priors: vec![1.0 / POLICY_SIZE as f32; POLICY_SIZE],
            value: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_policy_shape() {
        let state = GameState::starting_position();
        let eval = UniformPolicy.evaluate(&state).unwrap();
        assert_eq!(eval.priors.len(), POLICY_SIZE);
        assert!(eval.value.abs() < 1e-6);
        let total: f32 = eval.priors.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_checked_rejects_wrong_length() {
        let err = PolicyEval::checked(vec![0.0; 10], 0.0).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::BadPriorLength { expected, got: 10 } if expected == POLICY_SIZE
        ));
    }
}
