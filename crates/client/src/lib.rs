//! Headless skirmish client.
//!
//! The composition root: reads the environment, loads content from a data
//! directory, builds the roster into an [`game_core::Engine`] with every
//! system on the bus, and runs the match while printing its feed.

mod builder;
pub mod config;
pub mod feed;
pub mod logging;

pub use builder::MatchBuilder;
pub use config::ClientConfig;

use anyhow::{Context, Result};
use game_content::ContentFactory;
use game_core::RunReport;

/// Loads content for `config` and runs one match to completion, printing the feed.
pub fn run(config: &ClientConfig) -> Result<RunReport> {
    let factory = ContentFactory::new(&config.data_dir);
    let game_config = config.apply_to(factory.load_config()?);
    let content = factory.load_data_manager()?;
    let roster = factory
        .load_roster(&config.roster)
        .with_context(|| format!("Failed to load roster {}", config.roster.display()))?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        combatants = roster.len(),
        scheduler = %game_config.scheduler,
        "building match"
    );
    let mut engine = MatchBuilder::new()
        .config(game_config)
        .content(content)
        .roster(roster)
        .feed(|line| println!("{line}"))
        .build()?;

    Ok(engine.run())
}
