use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use neolithic::{
    engine::{EngineBuilder, EngineSettings},
    group::Strategy,
    scenario::ScenarioLoader,
    systems::{
        BookkeepingSystem, ConversionSystem, DiffusionSystem, GrowthSystem, ImmigrationSystem,
        MovementSystem,
    },
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Forager and farmer dispersal runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/river_valley.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. `info` or `neolithic=debug` (RUST_LOG wins when set)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the final summary and tick history as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| scenario.logging.level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut world = scenario.build_world()?;
    let ticks = scenario.ticks(cli.ticks);

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_system(ImmigrationSystem::new(scenario.immigration.clone()))
        .with_system(GrowthSystem::new())
        .with_system(ConversionSystem::new())
        .with_system(DiffusionSystem::new())
        .with_system(MovementSystem::new())
        .with_system(BookkeepingSystem::new())
        .build();

    engine.run(&mut world, ticks)?;

    if cli.json {
        let summary = world.summary(&scenario.name);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Scenario '{}' completed for {} ticks. Total population: {:.1}",
        scenario.name,
        ticks,
        world.total_population()
    );
    for strategy in Strategy::ALL {
        println!(
            "  {:<12} groups: {:>5}  population: {:>10.1}",
            strategy.as_str(),
            world.group_count(strategy),
            world.population(strategy)
        );
    }
    Ok(())
}
