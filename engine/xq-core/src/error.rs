//! Error types for the rules engine.

use thiserror::Error;

/// Errors surfaced by the rules engine. Both variants indicate caller
/// bugs and are rejected before any state mutation; terminal conditions
/// (checkmate, stalemate, missing king) are results, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("move {from}->{to} is not legal in the current position")]
    IllegalMove { from: usize, to: usize },

    #[error("malformed move encoding {code:#010x}: {reason}")]
    MalformedMove { code: u32, reason: &'static str },
}
