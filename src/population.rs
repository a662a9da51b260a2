//! Tree batches for one (species, age) pair.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::{LSystemError, YieldError};
use crate::species::SpeciesParams;
use crate::yield_model::yield_for_tree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRecord {
    id: usize,
    structure: Arc<str>,
    fruits: Option<u64>,
}

impl TreeRecord {
    pub fn new(id: usize, structure: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            structure: structure.into(),
            fruits: None,
        }
    }

    pub fn with_fruits(mut self, fruits: u64) -> Self {
        self.fruits = Some(fruits);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn fruits(&self) -> Option<u64> {
        self.fruits
    }
}

impl fmt::Display for TreeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree {} ({} symbols", self.id, self.structure.len())?;
        match self.fruits {
            Some(fruits) => write!(f, ", {fruits} fruits)"),
            None => write!(f, ", yield not computed)"),
        }
    }
}

/// Generate `population_size` trees of `age` years.
///
/// Every call builds a fresh batch; ids run `0..population_size` in order.
/// The structure depends only on the grammar and the age, so it is rewritten
/// once and shared by the batch, while each tree draws its own harvest.
pub fn generate_population<R: Rng + ?Sized>(
    params: &SpeciesParams,
    population_size: usize,
    age: u32,
    rng: &mut R,
) -> Result<Vec<TreeRecord>, YieldError> {
    if population_size == 0 {
        return Ok(Vec::new());
    }

    let generations =
        i32::try_from(age).map_err(|_| LSystemError::InvalidGenerationParameter {
            reason: format!("age {age} exceeds the supported generation count"),
        })?;
    let structure: Arc<str> = params.grammar.generate(generations)?.into();

    let mut batch = Vec::with_capacity(population_size);
    for id in 0..population_size {
        let fruits = yield_for_tree(age, &structure, params, rng)?;
        batch.push(TreeRecord::new(id, Arc::clone(&structure)).with_fruits(fruits));
    }

    debug!(
        species = %params.species,
        age,
        trees = batch.len(),
        structure_len = structure.len(),
        "generated population"
    );
    Ok(batch)
}
