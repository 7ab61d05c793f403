//! Skirmish binary.
//!
//! Plays a headless battle between two brain-driven armies, with a thief
//! roaming the town around them, and logs what happens.
//!
//! # Examples
//!
//! ```bash
//! # Built-in scenario, verbose decisions
//! RUST_LOG=npc_ai=debug cargo run -p skirmish
//!
//! # Custom content, fixed seed
//! SKIRMISH_LEVEL=my.ron SKIRMISH_CONFIG=tuning.toml SKIRMISH_SEED=3 cargo run -p skirmish
//! ```

use anyhow::Result;
use skirmish::{Skirmish, SkirmishConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SkirmishConfig::from_env();
    tracing::info!("Starting skirmish");
    tracing::info!("Rounds: {}, seed: {}", config.rounds, config.seed);

    let mut skirmish = Skirmish::from_config(&config)?;
    let report = skirmish.run(config.rounds)?;

    tracing::info!(
        "Skirmish over after {} turns: {} moves, {} hits, {} kills, {} casts, {} pickups, {} trades, {} errors",
        skirmish.world().turn(),
        report.moves,
        report.hits,
        report.kills,
        report.casts,
        report.pickups,
        report.trades,
        report.errors
    );
    for actor in skirmish.world().actors() {
        let state = if actor.is_alive() { "standing" } else { "fallen" };
        tracing::info!(
            "{} {} (faction {}): {state}, {} gold",
            actor.id,
            actor.name,
            actor.faction.0,
            actor.gold
        );
    }
    Ok(())
}
