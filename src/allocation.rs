//! Random land partition across species and the tree counts it supports.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OrchardError, Result};
use crate::rng::RngExt;
use crate::species::{PerSpecies, SeedDensity, Species};

/// Trees added to every species' count so each has a few trees.
pub const BASE_TREE_FLOOR: u64 = 2;

/// Largest site accepted; keeps tree counts small enough to tabulate.
pub const MAX_SIZE_ACRES: f64 = 10_000.0;

fn default_size_acres() -> f64 {
    5.0
}

fn default_germination() -> PerSpecies<f64> {
    PerSpecies::new(0.7, 0.7, 0.7)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrchardSite {
    #[serde(default = "default_size_acres")]
    pub size_acres: f64,
    /// Probability that a sown seed grows into a tree, per species.
    #[serde(default = "default_germination")]
    pub germination: PerSpecies<f64>,
}

impl Default for OrchardSite {
    fn default() -> Self {
        Self {
            size_acres: default_size_acres(),
            germination: default_germination(),
        }
    }
}

impl OrchardSite {
    pub fn validate(&self) -> Result<()> {
        if !self.size_acres.is_finite() || self.size_acres <= 0.0 {
            return Err(OrchardError::InvalidParameter(format!(
                "orchard size must be a positive number of acres, got {}",
                self.size_acres
            )));
        }
        if self.size_acres > MAX_SIZE_ACRES {
            return Err(OrchardError::InvalidParameter(format!(
                "orchard size of {} acres exceeds the maximum of {MAX_SIZE_ACRES}",
                self.size_acres
            )));
        }
        for (species, &probability) in self.germination.iter() {
            if !(0.0..=1.0).contains(&probability) {
                return Err(OrchardError::InvalidParameter(format!(
                    "{species} germination probability {probability} must lie in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Land split and realized tree counts for one orchard run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchardAllocation {
    pub land_percent: PerSpecies<u32>,
    pub acreage: PerSpecies<f64>,
    pub seed_density: PerSpecies<f64>,
    pub tree_counts: PerSpecies<usize>,
}

impl OrchardAllocation {
    pub fn tree_count(&self, species: Species) -> usize {
        self.tree_counts[species]
    }

    pub fn total_trees(&self) -> usize {
        self.tree_counts.iter().map(|(_, count)| count).sum()
    }
}

/// Partition the site's acreage and derive each species' tree count.
///
/// Apple takes `[2, 100]` percent, pear `[1, remaining]` and plum the rest.
/// When apple takes everything, pear and plum both get zero.
pub fn allocate<R: Rng + ?Sized>(
    site: &OrchardSite,
    seed_density: &PerSpecies<SeedDensity>,
    rng: &mut R,
) -> Result<OrchardAllocation> {
    site.validate()?;

    let apple_percent = rng.uniform_inclusive(2, 100);
    let remaining = 100 - apple_percent;
    let pear_percent = if remaining > 0 {
        rng.uniform_inclusive(1, remaining)
    } else {
        0
    };
    let plum_percent = 100 - (apple_percent + pear_percent);
    let land_percent = PerSpecies::new(apple_percent, pear_percent, plum_percent);

    let acreage = PerSpecies::from_fn(|species| {
        site.size_acres * land_percent[species] as f64 / 100.0
    });
    let density = PerSpecies::from_fn(|species| seed_density[species].sample(rng));
    let tree_counts = PerSpecies::from_fn(|species| {
        let base = ((acreage[species] * density[species]).round_ties_even() as u64)
            .saturating_add(BASE_TREE_FLOOR);
        (site.germination[species] * base as f64).round_ties_even() as usize
    });

    debug!(
        apple = apple_percent,
        pear = pear_percent,
        plum = plum_percent,
        trees = ?tree_counts,
        "allocated orchard land"
    );

    Ok(OrchardAllocation {
        land_percent,
        acreage,
        seed_density: density,
        tree_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesProfile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn preset_densities() -> PerSpecies<SeedDensity> {
        PerSpecies::from_fn(|species| SpeciesProfile::preset(species).seed_density)
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let site = OrchardSite::default();
        let densities = preset_densities();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..500 {
            let allocation = allocate(&site, &densities, &mut rng).unwrap();
            let p = allocation.land_percent;
            assert_eq!(p.apple + p.pear + p.plum, 100);
            assert!((2..=100).contains(&p.apple));
            if p.apple < 100 {
                assert!((1..=100 - p.apple).contains(&p.pear));
            } else {
                assert_eq!(p.pear, 0);
            }
        }
    }

    #[test]
    fn fixed_density_and_certain_germination() {
        let site = OrchardSite {
            size_acres: 100.0,
            germination: PerSpecies::new(1.0, 1.0, 1.0),
        };
        let densities = PerSpecies::new(
            SeedDensity::Fixed { per_acre: 1.0 },
            SeedDensity::Fixed { per_acre: 1.0 },
            SeedDensity::Fixed { per_acre: 1.0 },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let allocation = allocate(&site, &densities, &mut rng).unwrap();
        for species in Species::ALL {
            assert_eq!(
                allocation.tree_count(species),
                allocation.land_percent[species] as usize + 2
            );
        }
        assert_eq!(allocation.total_trees(), 106);
    }

    #[test]
    fn zero_germination_yields_no_trees() {
        let site = OrchardSite {
            size_acres: 5.0,
            germination: PerSpecies::new(0.0, 0.0, 0.0),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let allocation = allocate(&site, &preset_densities(), &mut rng).unwrap();
        assert_eq!(allocation.total_trees(), 0);
    }

    #[test]
    fn sampled_densities_respect_profiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let allocation = allocate(&OrchardSite::default(), &preset_densities(), &mut rng).unwrap();
        assert!((1.5..1.8).contains(&allocation.seed_density.apple));
        assert_eq!(allocation.seed_density.pear, 1.09);
        assert!((0.70..1.09).contains(&allocation.seed_density.plum));
    }

    #[test]
    fn rejects_invalid_site() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let densities = preset_densities();
        let negative = OrchardSite {
            size_acres: -1.0,
            ..OrchardSite::default()
        };
        assert!(allocate(&negative, &densities, &mut rng).is_err());

        let bad_probability = OrchardSite {
            germination: PerSpecies::new(0.7, 1.5, 0.7),
            ..OrchardSite::default()
        };
        assert!(matches!(
            allocate(&bad_probability, &densities, &mut rng),
            Err(OrchardError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_oversized_site() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let huge = OrchardSite {
            size_acres: 1e30,
            ..OrchardSite::default()
        };
        assert!(matches!(
            allocate(&huge, &preset_densities(), &mut rng),
            Err(OrchardError::InvalidParameter(_))
        ));

        let largest = OrchardSite {
            size_acres: MAX_SIZE_ACRES,
            germination: PerSpecies::new(1.0, 1.0, 1.0),
        };
        let allocation = allocate(&largest, &preset_densities(), &mut rng).unwrap();
        assert!(allocation.total_trees() <= 18_006);
    }
}
