//! Skirmish client binary.
//!
//! ```bash
//! SKIRMISH_DATA_DIR=data SKIRMISH_SCHEDULER=action_points cargo run -p skirmish
//! ```

use anyhow::Result;
use skirmish::ClientConfig;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _guard = skirmish::logging::setup_logging(config.log_file.as_deref())?;

    tracing::info!("Starting skirmish");
    let report = skirmish::run(&config)?;

    let (rounds, ticks) = (report.rounds, report.ticks);
    match report.outcome.and_then(|outcome| outcome.winner) {
        Some(team) => println!("{team} win after {rounds} rounds ({ticks} ticks)"),
        None => println!("no winner after {rounds} rounds ({ticks} ticks)"),
    }
    Ok(())
}
