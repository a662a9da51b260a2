use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::{
    allocation::{allocate, OrchardAllocation, OrchardSite},
    error::{OrchardError, Result},
    population::{generate_population, TreeRecord},
    render::{Drawing, TurtleRenderer},
    report::{OrchardReport, SpeciesSummary, YieldTable},
    rng::RngManager,
    species::{PerSpecies, Species, SpeciesParams, SpeciesProfile},
};

/// Longest horizon accepted; plum structures pass a few million symbols
/// around year 13 and grow threefold per year after that.
pub const MAX_HORIZON_YEARS: u32 = 16;

const ALLOCATION_STREAM: &str = "allocation";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    /// Years simulated; the timeline is `0..horizon_years`.
    pub horizon_years: u32,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    site: OrchardSite,
    profiles: PerSpecies<SpeciesProfile>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            site: OrchardSite::default(),
            profiles: PerSpecies::from_fn(SpeciesProfile::preset),
        }
    }

    pub fn with_site(mut self, site: OrchardSite) -> Self {
        self.site = site;
        self
    }

    pub fn with_profile(mut self, species: Species, profile: SpeciesProfile) -> Self {
        self.profiles[species] = profile;
        self
    }

    /// Validate the inputs, sample every species once and allocate the land.
    pub fn build(self) -> Result<Engine> {
        if self.settings.horizon_years > MAX_HORIZON_YEARS {
            return Err(OrchardError::InvalidParameter(format!(
                "horizon of {} years exceeds the maximum of {MAX_HORIZON_YEARS}",
                self.settings.horizon_years
            )));
        }
        for (species, profile) in self.profiles.iter() {
            profile.validate(species)?;
        }

        let mut rng = RngManager::new(self.settings.seed);
        let species = PerSpecies::from_fn(|species| {
            self.profiles[species].sample(species, &mut rng.stream(species.name()))
        });
        let densities = PerSpecies::from_fn(|species| self.profiles[species].seed_density);
        let allocation = allocate(&self.site, &densities, &mut rng.stream(ALLOCATION_STREAM))?;

        info!(
            scenario = %self.settings.scenario_name,
            seed = self.settings.seed,
            trees = allocation.total_trees(),
            "orchard planted"
        );

        Ok(Engine {
            rng,
            settings: self.settings,
            species,
            allocation,
        })
    }
}

/// Summary handed to the hook after each simulated year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    pub year: u32,
    pub fruit: PerSpecies<u64>,
    pub duration_ms: f64,
}

impl YearSummary {
    pub fn total_fruit(&self) -> u64 {
        self.fruit.iter().map(|(_, fruit)| fruit).sum()
    }
}

pub struct Engine {
    rng: RngManager,
    settings: EngineSettings,
    species: PerSpecies<SpeciesParams>,
    allocation: OrchardAllocation,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn allocation(&self) -> &OrchardAllocation {
        &self.allocation
    }

    pub fn species(&self, species: Species) -> &SpeciesParams {
        &self.species[species]
    }

    /// A fresh batch of this orchard's trees for `species` at `age`.
    pub fn generate_population(&mut self, species: Species, age: u32) -> Result<Vec<TreeRecord>> {
        let params = &self.species[species];
        let count = self.allocation.tree_count(species);
        let batch = generate_population(params, count, age, &mut self.rng.stream(species.name()))?;
        Ok(batch)
    }

    /// Draw one tree of `species` at `age`; ages past the horizon limit are rejected.
    pub fn render_tree<R: Rng + ?Sized>(
        &self,
        species: Species,
        age: u32,
        rng: &mut R,
    ) -> Result<Drawing> {
        if age > MAX_HORIZON_YEARS {
            return Err(OrchardError::InvalidParameter(format!(
                "render age of {age} years exceeds the maximum of {MAX_HORIZON_YEARS}"
            )));
        }
        let params = &self.species[species];
        let structure = params.grammar.generate(age as i32)?;
        Ok(TurtleRenderer::new(params).render(&structure, rng))
    }

    pub fn run(&mut self) -> Result<OrchardReport> {
        self.run_with_hook(|_| {})
    }

    pub fn run_with_hook<F>(&mut self, mut hook: F) -> Result<OrchardReport>
    where
        F: FnMut(&YearSummary),
    {
        let mut tables = PerSpecies::from_fn(|species| {
            YieldTable::new(species, self.allocation.tree_count(species))
        });

        for year in 0..self.settings.horizon_years {
            let start = Instant::now();
            let mut fruit = PerSpecies::new(0, 0, 0);
            for species in Species::ALL {
                let batch = self.generate_population(species, year)?;
                tables[species].record_year(year, &batch)?;
                fruit[species] = tables[species].year_total(year).unwrap_or(0);
                debug!(%species, year, fruit = fruit[species], "harvested");
            }

            let summary = YearSummary {
                year,
                fruit,
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            };
            info!(
                year,
                apple = fruit.apple,
                pear = fruit.pear,
                plum = fruit.plum,
                "year simulated"
            );
            hook(&summary);
        }

        let PerSpecies { apple, pear, plum } = tables;
        Ok(OrchardReport {
            scenario: self.settings.scenario_name.clone(),
            seed: self.settings.seed,
            horizon_years: self.settings.horizon_years,
            allocation: self.allocation.clone(),
            species: Species::ALL
                .into_iter()
                .map(|species| SpeciesSummary::from(&self.species[species]))
                .collect(),
            tables: vec![apple, pear, plum],
        })
    }
}
