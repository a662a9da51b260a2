use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use orchard::{config::init_logging, scenario::ScenarioLoader, Scenario, Species};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Orchard growth and yield simulator")]
struct Cli {
    /// Path to a scenario YAML file (built-in small orchard when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the number of simulated years
    #[arg(long)]
    years: Option<u32>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print an SVG drawing of one tree of this species instead of the report
    #[arg(long)]
    render: Option<String>,

    /// Age of the rendered tree in years
    #[arg(long, default_value_t = 4)]
    render_age: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::small_orchard(),
    };
    init_logging(&scenario.logging);

    let mut engine = scenario
        .engine_builder(cli.seed, cli.years)
        .build()
        .context("Failed to set up the orchard")?;

    if let Some(name) = &cli.render {
        let species: Species = name.parse()?;
        let mut rng = ChaCha8Rng::seed_from_u64(engine.settings().seed);
        let drawing = engine
            .render_tree(species, cli.render_age, &mut rng)
            .context("Failed to render tree")?;
        print!("{}", drawing.to_svg());
        return Ok(());
    }

    let report = engine.run().context("Simulation failed")?;
    match cli.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
