//! Strata simulator binary

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_common::{format_units, VERSION};
use strata_sim::{Scenario, SimConfig, Simulation};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Strata simulator v{}", VERSION);

    // Load configuration
    let config = SimConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let scenario = match &config.scenario_path {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::reference()?,
    };

    let sim = Simulation::new(&config);
    if config.reward_reserve > 0 {
        info!("Seeding reward reserve with {}", format_units(config.reward_reserve));
    }
    sim.seed_reserve(config.reward_reserve).await?;

    let report = sim.run(&scenario).await;
    info!(
        "Scenario {} finished: {} steps, {} rejected",
        report.scenario,
        report.steps.len(),
        report.rejected
    );

    // Report goes to stdout, logs to stderr
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
