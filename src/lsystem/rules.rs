use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LSystemError;

/// Symbol → replacement table of an L-system.
///
/// Keys are kept ordered so validation reports the same offending symbol on
/// every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(BTreeMap<char, String>);

impl RuleSet {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (char, &'a str)>) -> Self {
        pairs
            .into_iter()
            .map(|(symbol, replacement)| (symbol, replacement.to_string()))
            .collect()
    }

    pub fn insert(&mut self, symbol: char, replacement: impl Into<String>) -> Option<String> {
        self.0.insert(symbol, replacement.into())
    }

    pub fn remove(&mut self, symbol: char) -> Option<String> {
        self.0.remove(&symbol)
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.0.get(&symbol).map(String::as_str)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.0.iter().map(|(symbol, replacement)| (*symbol, replacement.as_str()))
    }

    /// Give every constant without a rule the identity rule. Returns how many
    /// rules were inserted.
    pub fn fill_constant_identities(&mut self, constants: &[char]) -> usize {
        let mut inserted = 0;
        for &constant in constants {
            if !self.0.contains_key(&constant) {
                self.0.insert(constant, constant.to_string());
                inserted += 1;
            }
        }
        inserted
    }
}

impl FromIterator<(char, String)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (char, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Fill identity rules for constants, then check the table.
///
/// Running it again on the result is a no-op that yields the same outcome.
pub fn validate(
    rules: &mut RuleSet,
    constants: &[char],
    variables: &[char],
    axiom: Option<&str>,
) -> Result<(), LSystemError> {
    rules.fill_constant_identities(constants);
    check(rules, constants, variables, axiom)
}

/// Check a rule table without modifying it.
pub fn check(
    rules: &RuleSet,
    constants: &[char],
    variables: &[char],
    axiom: Option<&str>,
) -> Result<(), LSystemError> {
    if let Some(axiom) = axiom {
        if let Some(symbol) = axiom.chars().find(|c| !rules.contains(*c)) {
            return Err(LSystemError::MissingAxiomRule { symbol });
        }
    }

    if let Some(&symbol) = constants.iter().find(|c| !rules.contains(**c)) {
        return Err(LSystemError::MissingConstantRule { symbol });
    }

    if let Some(&symbol) = variables.iter().find(|v| !rules.contains(**v)) {
        return Err(LSystemError::MissingVariableRule { symbol });
    }

    for (rule, replacement) in rules.iter() {
        if let Some(symbol) = replacement.chars().find(|c| !rules.contains(*c)) {
            return Err(LSystemError::UnresolvedProductionSymbol { rule, symbol });
        }
    }

    Ok(())
}
