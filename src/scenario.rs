use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::{
    allocation::OrchardSite,
    config::LoggingConfig,
    engine::{EngineBuilder, EngineSettings, MAX_HORIZON_YEARS},
    lsystem::RuleSet,
    species::{Interval, SeedDensity, Species, SpeciesProfile, YieldRange},
};

fn default_seed() -> u64 {
    7
}

fn default_horizon_years() -> u32 {
    14
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
    #[serde(default)]
    pub orchard: OrchardSite,
    #[serde(default)]
    pub species: SpeciesOverrides,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesOverrides {
    #[serde(default)]
    pub apple: ProfileOverride,
    #[serde(default)]
    pub pear: ProfileOverride,
    #[serde(default)]
    pub plum: ProfileOverride,
}

impl SpeciesOverrides {
    pub fn get(&self, species: Species) -> &ProfileOverride {
        match species {
            Species::Apple => &self.apple,
            Species::Pear => &self.pear,
            Species::Plum => &self.plum,
        }
    }
}

/// Partial replacement of a species preset; omitted fields keep the preset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverride {
    pub rules: Option<RuleSet>,
    pub maturation_years: Option<Interval>,
    pub disease_onset_year: Option<u32>,
    pub disease_severity: Option<f64>,
    pub yield_range: Option<YieldRange>,
    pub seed_density: Option<SeedDensity>,
    pub form_angle_deg: Option<Interval>,
}

impl ProfileOverride {
    pub fn apply(&self, profile: &mut SpeciesProfile) {
        if let Some(rules) = &self.rules {
            profile.grammar.rules = rules.clone();
        }
        if let Some(years) = self.maturation_years {
            profile.maturation_years = years;
        }
        if let Some(year) = self.disease_onset_year {
            profile.disease_onset_year = year;
        }
        if let Some(severity) = self.disease_severity {
            profile.disease_severity = severity;
        }
        if let Some(range) = self.yield_range {
            profile.yield_range = range;
        }
        if let Some(density) = self.seed_density {
            profile.seed_density = density;
        }
        if let Some(angle) = self.form_angle_deg {
            profile.form_angle_deg = angle;
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// The original five-acre orchard with 70% germination for every species.
    pub fn small_orchard() -> Self {
        Self {
            name: "small_orchard".to_string(),
            description: Some("Five acres of apple, pear and plum trees".to_string()),
            seed: default_seed(),
            horizon_years: default_horizon_years(),
            orchard: OrchardSite::default(),
            species: SpeciesOverrides::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.name.trim().is_empty(), "scenario name must not be empty");
        ensure!(
            self.horizon_years <= MAX_HORIZON_YEARS,
            "horizon of {} years exceeds the maximum of {MAX_HORIZON_YEARS}",
            self.horizon_years
        );
        self.orchard.validate()?;
        for species in Species::ALL {
            self.profile(species).validate(species)?;
        }
        Ok(())
    }

    /// Preset for `species` with this scenario's overrides applied.
    pub fn profile(&self, species: Species) -> SpeciesProfile {
        let mut profile = SpeciesProfile::preset(species);
        self.species.get(species).apply(&mut profile);
        profile
    }

    pub fn horizon(&self, override_years: Option<u32>) -> u32 {
        override_years.unwrap_or(self.horizon_years)
    }

    pub fn engine_builder(&self, seed: Option<u64>, years: Option<u32>) -> EngineBuilder {
        let settings = EngineSettings {
            scenario_name: self.name.clone(),
            seed: seed.unwrap_or(self.seed),
            horizon_years: self.horizon(years),
        };
        Species::ALL.into_iter().fold(
            EngineBuilder::new(settings).with_site(self.orchard),
            |builder, species| builder.with_profile(species, self.profile(species)),
        )
    }
}
