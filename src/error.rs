//! Error types for the orchard simulation.
//!
//! Rule-table problems and bad generation arguments surface as
//! [`LSystemError`]; the yield model adds [`YieldError`]; everything a
//! simulation run can fail with is collected in [`OrchardError`].

use thiserror::Error;

/// Failures raised by the rule table validator and the rewriting engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LSystemError {
    #[error("axiom symbol '{symbol}' has no associated rule")]
    MissingAxiomRule { symbol: char },

    #[error("constant '{symbol}' has no associated rule")]
    MissingConstantRule { symbol: char },

    #[error("variable '{symbol}' has no associated rule")]
    MissingVariableRule { symbol: char },

    #[error("rule for '{rule}' produces '{symbol}', which has no rule of its own")]
    UnresolvedProductionSymbol { rule: char, symbol: char },

    #[error("invalid generation parameter: {reason}")]
    InvalidGenerationParameter { reason: String },
}

/// Failures raised while turning a structure string into a fruit count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YieldError {
    #[error("structure contains no '{branch_symbol}' branch tips")]
    NoBranchesPresent { branch_symbol: char },

    #[error(transparent)]
    Generation(#[from] LSystemError),
}

/// Top-level error for orchard setup and simulation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchardError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid {species} profile: {reason}")]
    InvalidProfile { species: String, reason: String },

    #[error(transparent)]
    LSystem(#[from] LSystemError),

    #[error(transparent)]
    Yield(#[from] YieldError),
}

pub type Result<T> = std::result::Result<T, OrchardError>;
