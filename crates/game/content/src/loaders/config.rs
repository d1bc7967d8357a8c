//! Game configuration loader.

use std::path::Path;

use anyhow::Context;
use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        toml::from_str(content).context("Failed to parse config TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::SchedulerMode;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            scheduler = "action_points"
            rng_seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.scheduler, SchedulerMode::ActionPoints);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.max_rounds, GameConfig::DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn unknown_scheduler_is_an_error() {
        assert!(ConfigLoader::parse(r#"scheduler = "initiative""#).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = ConfigLoader::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/config.toml"));
    }
}
