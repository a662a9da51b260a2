//! Orchard growth and fruit yield simulation driven by L-system tree structures.

pub mod allocation;
pub mod config;
pub mod engine;
pub mod error;
pub mod lsystem;
pub mod population;
pub mod render;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod species;
pub mod yield_model;

pub use engine::{Engine, EngineBuilder, EngineSettings, YearSummary};
pub use error::{LSystemError, OrchardError, YieldError};
pub use report::{OrchardReport, YieldTable};
pub use scenario::{Scenario, ScenarioLoader};
pub use species::{Species, SpeciesParams, SpeciesProfile};
