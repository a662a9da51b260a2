//! L-system string rewriting
//!
//! A tree's topology at age `n` is the axiom rewritten `n` times, each round
//! replacing every symbol by its rule and concatenating the results in order.

mod rules;

pub use rules::{check, validate, RuleSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LSystemError;

/// Rewrite `axiom` for `generations` rounds.
///
/// The rule table is validated (and identity rules for constants filled in)
/// before every round, so edits a caller makes to `rules` between calls are
/// always re-checked.
pub fn generate(
    axiom: &str,
    rules: &mut RuleSet,
    constants: &[char],
    variables: &[char],
    generations: i32,
) -> Result<String, LSystemError> {
    if axiom.is_empty() {
        return Err(LSystemError::InvalidGenerationParameter {
            reason: "axiom must not be empty".to_string(),
        });
    }
    if generations < 0 {
        return Err(LSystemError::InvalidGenerationParameter {
            reason: format!("generations must be non-negative, got {generations}"),
        });
    }

    validate(rules, constants, variables, Some(axiom))?;
    if generations == 0 {
        return Ok(axiom.to_string());
    }

    let mut current = rewrite(axiom, rules);
    debug!(generation = 1, length = current.len(), "rewrote axiom");

    for generation in 2..=generations {
        validate(rules, constants, variables, None)?;
        current = rewrite(&current, rules);
        debug!(generation, length = current.len(), "rewrote structure");
    }

    Ok(current)
}

// Callers validate first; a symbol without a rule is kept as is.
fn rewrite(current: &str, rules: &RuleSet) -> String {
    let capacity = current
        .chars()
        .map(|c| rules.get(c).map_or(c.len_utf8(), str::len))
        .sum();
    let mut next = String::with_capacity(capacity);
    for c in current.chars() {
        match rules.get(c) {
            Some(replacement) => next.push_str(replacement),
            None => next.push(c),
        }
    }
    next
}

/// Axiom, alphabet and rule table of one L-system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub axiom: String,
    pub constants: Vec<char>,
    pub variables: Vec<char>,
    pub rules: RuleSet,
}

impl Grammar {
    /// Generate on a working copy of the rule table; `self` is left untouched.
    pub fn generate(&self, generations: i32) -> Result<String, LSystemError> {
        let mut rules = self.rules.clone();
        generate(
            &self.axiom,
            &mut rules,
            &self.constants,
            &self.variables,
            generations,
        )
    }

    pub fn validate(&self) -> Result<(), LSystemError> {
        if self.axiom.is_empty() {
            return Err(LSystemError::InvalidGenerationParameter {
                reason: "axiom must not be empty".to_string(),
            });
        }
        let mut rules = self.rules.clone();
        validate(&mut rules, &self.constants, &self.variables, Some(&self.axiom))
    }

    /// Whether `symbol` is one of the grammar's variables.
    pub fn is_variable(&self, symbol: char) -> bool {
        self.variables.contains(&symbol)
    }
}
