//! Client configuration read from the process environment.
use std::env;
use std::path::PathBuf;

use game_core::{GameConfig, SchedulerMode};

/// Where content comes from and how the run is logged.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    /// Roster file, relative to `data_dir` unless absolute.
    pub roster: PathBuf,
    pub seed: Option<u64>,
    pub scheduler: Option<SchedulerMode>,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            roster: PathBuf::from("roster.ron"),
            seed: None,
            scheduler: None,
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SKIRMISH_DATA_DIR` - Content directory (default: `data`)
    /// - `SKIRMISH_ROSTER` - Roster file inside the content directory (default: `roster.ron`)
    /// - `SKIRMISH_SEED` - Overrides `rng_seed` from `config.toml`
    /// - `SKIRMISH_SCHEDULER` - `round_robin` or `action_points`
    /// - `SKIRMISH_LOG_FILE` - Log file path; `default` picks the platform cache directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("SKIRMISH_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(roster) = read_env::<PathBuf>("SKIRMISH_ROSTER") {
            config.roster = roster;
        }
        config.seed = read_env::<u64>("SKIRMISH_SEED");
        config.scheduler = read_env::<SchedulerMode>("SKIRMISH_SCHEDULER");
        if env::var("SKIRMISH_SCHEDULER").is_ok() && config.scheduler.is_none() {
            tracing::warn!("ignoring unknown SKIRMISH_SCHEDULER value");
        }
        config.log_file = env::var("SKIRMISH_LOG_FILE").ok().map(|value| {
            if value == "default" {
                crate::logging::default_log_file()
            } else {
                PathBuf::from(value)
            }
        });

        config
    }

    /// Applies the environment overrides on top of the loaded game configuration.
    pub fn apply_to(&self, mut game: GameConfig) -> GameConfig {
        if let Some(seed) = self.seed {
            game.rng_seed = seed;
        }
        if let Some(scheduler) = self.scheduler {
            game.scheduler = scheduler;
        }
        game
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
