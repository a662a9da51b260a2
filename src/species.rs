//! Species presets and per-run parameter sampling
//!
//! A [`SpeciesProfile`] carries the ranges a species is described by; the
//! engine samples each profile once per run into a [`SpeciesParams`] record
//! that the shared generation and yield functions consume.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{OrchardError, Result};
use crate::lsystem::{Grammar, RuleSet};
use crate::rng::RngExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Apple,
    Pear,
    Plum,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Apple, Species::Pear, Species::Plum];

    pub fn name(self) -> &'static str {
        match self {
            Species::Apple => "apple",
            Species::Pear => "pear",
            Species::Plum => "plum",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Species {
    type Err = OrchardError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apple" | "apples" => Ok(Species::Apple),
            "pear" | "pears" => Ok(Species::Pear),
            "plum" | "plums" => Ok(Species::Plum),
            other => Err(OrchardError::InvalidParameter(format!(
                "unknown species '{other}'"
            ))),
        }
    }
}

/// One value per species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSpecies<T> {
    pub apple: T,
    pub pear: T,
    pub plum: T,
}

impl<T> PerSpecies<T> {
    pub fn new(apple: T, pear: T, plum: T) -> Self {
        Self { apple, pear, plum }
    }

    pub fn from_fn(mut f: impl FnMut(Species) -> T) -> Self {
        Self {
            apple: f(Species::Apple),
            pear: f(Species::Pear),
            plum: f(Species::Plum),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, &T)> {
        Species::ALL.into_iter().map(move |species| (species, &self[species]))
    }
}

impl<T> Index<Species> for PerSpecies<T> {
    type Output = T;

    fn index(&self, species: Species) -> &T {
        match species {
            Species::Apple => &self.apple,
            Species::Pear => &self.pear,
            Species::Plum => &self.plum,
        }
    }
}

impl<T> IndexMut<Species> for PerSpecies<T> {
    fn index_mut(&mut self, species: Species) -> &mut T {
        match species {
            Species::Apple => &mut self.apple,
            Species::Pear => &mut self.pear,
            Species::Plum => &mut self.plum,
        }
    }
}

/// Half-open float range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.uniform_f64(self.min, self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Inclusive fruit-per-harvest bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRange {
    pub min: u32,
    pub max: u32,
}

impl YieldRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.uniform_inclusive(self.min, self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Seeds sown per acre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedDensity {
    Uniform { min: f64, max: f64 },
    Fixed { per_acre: f64 },
}

impl SeedDensity {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            SeedDensity::Uniform { min, max } => rng.uniform_f64(min, max),
            SeedDensity::Fixed { per_acre } => per_acre,
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            SeedDensity::Uniform { min, max } => {
                min.is_finite() && max.is_finite() && 0.0 <= min && min <= max
            }
            SeedDensity::Fixed { per_acre } => per_acre.is_finite() && per_acre >= 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub stem: String,
    pub tip: String,
}

/// Stroke length ranges used by the turtle renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeLengths {
    pub trunk: Interval,
    pub stem: Interval,
    pub tip: Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub grammar: Grammar,
    pub branch_symbol: char,
    pub maturation_years: Interval,
    pub disease_onset_year: u32,
    pub disease_severity: f64,
    pub yield_range: YieldRange,
    pub seed_density: SeedDensity,
    pub form_angle_deg: Interval,
    pub palette: Palette,
    pub strokes: StrokeLengths,
}

fn fruit_tree_grammar(tip_rule: &str) -> Grammar {
    Grammar {
        axiom: "0".to_string(),
        constants: vec!['[', ']'],
        variables: vec!['0', '1'],
        rules: RuleSet::from_pairs([('1', "11"), ('0', tip_rule)]),
    }
}

impl SpeciesProfile {
    pub fn preset(species: Species) -> Self {
        match species {
            Species::Apple => Self::apple(),
            Species::Pear => Self::pear(),
            Species::Plum => Self::plum(),
        }
    }

    pub fn apple() -> Self {
        Self {
            grammar: fruit_tree_grammar("1[0]0"),
            branch_symbol: '0',
            maturation_years: Interval::new(4.0, 5.0),
            disease_onset_year: 9,
            disease_severity: 6.0,
            yield_range: YieldRange::new(80, 150),
            seed_density: SeedDensity::Uniform { min: 1.5, max: 1.8 },
            form_angle_deg: Interval::new(30.0, 45.0),
            palette: Palette {
                stem: "brown".to_string(),
                tip: "red".to_string(),
            },
            strokes: StrokeLengths {
                trunk: Interval::new(10.0, 90.0),
                stem: Interval::new(5.0, 60.0),
                tip: Interval::new(20.0, 140.0),
            },
        }
    }

    pub fn pear() -> Self {
        Self {
            grammar: fruit_tree_grammar("1[0]10"),
            branch_symbol: '0',
            maturation_years: Interval::new(4.0, 6.0),
            disease_onset_year: 9,
            disease_severity: 4.0,
            yield_range: YieldRange::new(237, 474),
            seed_density: SeedDensity::Fixed { per_acre: 1.09 },
            form_angle_deg: Interval::new(30.0, 35.0),
            palette: Palette {
                stem: "brown".to_string(),
                tip: "green".to_string(),
            },
            strokes: StrokeLengths {
                trunk: Interval::new(50.0, 130.0),
                stem: Interval::new(5.0, 60.0),
                tip: Interval::new(20.0, 140.0),
            },
        }
    }

    pub fn plum() -> Self {
        Self {
            grammar: fruit_tree_grammar("1[0][0]0"),
            branch_symbol: '0',
            maturation_years: Interval::new(3.0, 5.0),
            disease_onset_year: 9,
            disease_severity: 5.0,
            yield_range: YieldRange::new(302, 604),
            seed_density: SeedDensity::Uniform {
                min: 0.70,
                max: 1.09,
            },
            form_angle_deg: Interval::new(20.0, 30.0),
            palette: Palette {
                stem: "brown".to_string(),
                tip: "purple".to_string(),
            },
            strokes: StrokeLengths {
                trunk: Interval::new(30.0, 100.0),
                stem: Interval::new(10.0, 70.0),
                tip: Interval::new(10.0, 100.0),
            },
        }
    }

    pub fn validate(&self, species: Species) -> Result<()> {
        let invalid = |reason: String| OrchardError::InvalidProfile {
            species: species.to_string(),
            reason,
        };

        self.grammar.validate()?;
        if !self.grammar.is_variable(self.branch_symbol) {
            return Err(invalid(format!(
                "branch symbol '{}' is not a grammar variable",
                self.branch_symbol
            )));
        }
        if !self.maturation_years.is_valid() || self.maturation_years.min < 0.0 {
            return Err(invalid(format!(
                "maturation range {:?} is not a valid non-negative interval",
                self.maturation_years
            )));
        }
        if !(1.0..=10.0).contains(&self.disease_severity) {
            return Err(invalid(format!(
                "disease severity {} must lie in [1, 10]",
                self.disease_severity
            )));
        }
        if self.yield_range.min > self.yield_range.max {
            return Err(invalid(format!(
                "yield range {}..={} is empty",
                self.yield_range.min, self.yield_range.max
            )));
        }
        if !self.seed_density.is_valid() {
            return Err(invalid(format!(
                "seed density {:?} is not a valid non-negative range",
                self.seed_density
            )));
        }
        if !self.form_angle_deg.is_valid() {
            return Err(invalid(format!(
                "form angle {:?} is not a valid interval",
                self.form_angle_deg
            )));
        }
        Ok(())
    }

    /// Draw the per-run values (maturation threshold, form angle).
    pub fn sample<R: Rng + ?Sized>(&self, species: Species, rng: &mut R) -> SpeciesParams {
        SpeciesParams {
            species,
            grammar: self.grammar.clone(),
            branch_symbol: self.branch_symbol,
            maturation_threshold: self.maturation_years.sample(rng),
            disease_onset_year: self.disease_onset_year,
            disease_severity: self.disease_severity,
            yield_range: self.yield_range,
            form_angle_deg: self.form_angle_deg.sample(rng).floor(),
            palette: self.palette.clone(),
            strokes: self.strokes,
        }
    }
}

/// Parameters of one species for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub species: Species,
    pub grammar: Grammar,
    pub branch_symbol: char,
    pub maturation_threshold: f64,
    pub disease_onset_year: u32,
    pub disease_severity: f64,
    pub yield_range: YieldRange,
    pub form_angle_deg: f64,
    pub palette: Palette,
    pub strokes: StrokeLengths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn presets_validate() {
        for species in Species::ALL {
            SpeciesProfile::preset(species)
                .validate(species)
                .unwrap_or_else(|err| panic!("{species} preset invalid: {err}"));
        }
    }

    #[test]
    fn sampled_values_stay_in_profile_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for species in Species::ALL {
            let profile = SpeciesProfile::preset(species);
            for _ in 0..50 {
                let params = profile.sample(species, &mut rng);
                assert!(params.maturation_threshold >= profile.maturation_years.min);
                assert!(params.maturation_threshold < profile.maturation_years.max);
                assert!(params.form_angle_deg >= profile.form_angle_deg.min);
                assert!(params.form_angle_deg < profile.form_angle_deg.max);
                assert_eq!(params.form_angle_deg.fract(), 0.0);
            }
        }
    }

    #[test]
    fn rejects_out_of_range_severity() {
        let mut profile = SpeciesProfile::apple();
        profile.disease_severity = 11.0;
        let err = profile.validate(Species::Apple).unwrap_err();
        assert!(matches!(err, OrchardError::InvalidProfile { .. }));
    }

    #[test]
    fn rejects_branch_symbol_outside_variables() {
        let mut profile = SpeciesProfile::plum();
        profile.branch_symbol = '[';
        assert!(profile.validate(Species::Plum).is_err());
    }

    #[test]
    fn rejects_broken_grammar() {
        let mut profile = SpeciesProfile::pear();
        profile.grammar.rules.remove('1');
        assert!(matches!(
            profile.validate(Species::Pear),
            Err(OrchardError::LSystem(_))
        ));
    }

    #[test]
    fn parses_species_names() {
        assert_eq!("Apple".parse::<Species>().unwrap(), Species::Apple);
        assert_eq!("plums".parse::<Species>().unwrap(), Species::Plum);
        assert!("cherry".parse::<Species>().is_err());
    }

    #[test]
    fn per_species_indexing() {
        let mut counts = PerSpecies::new(1, 2, 3);
        counts[Species::Pear] += 10;
        assert_eq!(counts[Species::Pear], 12);
        let collected: Vec<_> = counts.iter().map(|(s, v)| (s, *v)).collect();
        assert_eq!(
            collected,
            vec![(Species::Apple, 1), (Species::Pear, 12), (Species::Plum, 3)]
        );
    }
}
