//! Fruit yield of a single tree
//!
//! A mature tree draws a base harvest from its species' yield range. Once
//! the disease onset year is reached, a share of the branch tips is treated
//! as affected and their average share of the harvest is removed.

use rand::Rng;
use serde::Serialize;

use crate::error::YieldError;
use crate::species::SpeciesParams;

/// Every intermediate value of one yield computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YieldBreakdown {
    pub matured: bool,
    pub base_harvest: u32,
    pub branch_count: usize,
    pub average_per_branch: i64,
    pub affected_units: i64,
    pub fruit: u64,
}

impl YieldBreakdown {
    fn immature() -> Self {
        Self {
            matured: false,
            base_harvest: 0,
            branch_count: 0,
            average_per_branch: 0,
            affected_units: 0,
            fruit: 0,
        }
    }
}

pub fn count_branches(structure: &str, branch_symbol: char) -> usize {
    structure.chars().filter(|&c| c == branch_symbol).count()
}

/// Fruit count of a tree of `age` years with the given structure.
pub fn yield_for_tree<R: Rng + ?Sized>(
    age: u32,
    structure: &str,
    params: &SpeciesParams,
    rng: &mut R,
) -> Result<u64, YieldError> {
    yield_breakdown(age, structure, params, rng).map(|breakdown| breakdown.fruit)
}

/// Like [`yield_for_tree`], keeping the intermediate values.
///
/// Halves round to even. A structure without branch tips fails with
/// [`YieldError::NoBranchesPresent`]; disease losses larger than the base
/// harvest floor the result at zero.
pub fn yield_breakdown<R: Rng + ?Sized>(
    age: u32,
    structure: &str,
    params: &SpeciesParams,
    rng: &mut R,
) -> Result<YieldBreakdown, YieldError> {
    if (age as f64) < params.maturation_threshold {
        return Ok(YieldBreakdown::immature());
    }

    let base_harvest = params.yield_range.sample(rng);
    let branch_count = count_branches(structure, params.branch_symbol);
    if branch_count == 0 {
        return Err(YieldError::NoBranchesPresent {
            branch_symbol: params.branch_symbol,
        });
    }
    let average_per_branch =
        (base_harvest as f64 / branch_count as f64).round_ties_even() as i64;

    let mut harvest = base_harvest as i64;
    let mut affected_units = 0;
    if age >= params.disease_onset_year {
        affected_units =
            (branch_count as f64 / (11.0 - params.disease_severity)).round_ties_even() as i64;
        harvest = (harvest - affected_units * average_per_branch).max(0);
    }

    Ok(YieldBreakdown {
        matured: true,
        base_harvest,
        branch_count,
        average_per_branch,
        affected_units,
        fruit: harvest as u64,
    })
}
