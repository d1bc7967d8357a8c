//! Content factory for building the data manager from a data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use game_core::{GameConfig, ItemDefinition, SpellDefinition, StatusEffectDefinition};
use serde::de::DeserializeOwned;

use crate::characters::{CharacterTemplate, PassiveDefinition, RosterEntry};
use crate::loaders::{Catalog, ConfigLoader, LoadResult, read_file};
use crate::manager::DataManager;

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── spells.ron
/// ├── status_effects.ron
/// ├── items.ron
/// ├── passives.ron
/// ├── characters.ron
/// └── roster.ron
/// ```
///
/// Every catalog except `spells.ron` and `characters.ron` may be absent.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or defaults if the file is absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_spells(&self) -> LoadResult<Catalog<SpellDefinition>> {
        Catalog::load(&self.data_dir.join("spells.ron"))
    }

    pub fn load_status_effects(&self) -> LoadResult<Catalog<StatusEffectDefinition>> {
        self.load_optional("status_effects.ron")
    }

    pub fn load_items(&self) -> LoadResult<Catalog<ItemDefinition>> {
        self.load_optional("items.ron")
    }

    pub fn load_passives(&self) -> LoadResult<Catalog<PassiveDefinition>> {
        self.load_optional("passives.ron")
    }

    pub fn load_characters(&self) -> LoadResult<Catalog<CharacterTemplate>> {
        Catalog::load(&self.data_dir.join("characters.ron"))
    }

    /// Load every catalog into one [`DataManager`].
    pub fn load_data_manager(&self) -> LoadResult<DataManager> {
        let data = DataManager {
            spells: self.load_spells()?.into_map(),
            status_effects: self.load_status_effects()?.into_map(),
            items: self.load_items()?.into_map(),
            passives: self.load_passives()?.into_map(),
            characters: self.load_characters()?.into_map(),
        };
        for (kind, id) in data.dangling_references() {
            tracing::warn!(%kind, id, "content references an unknown id");
        }
        tracing::info!(
            spells = data.spells.len(),
            status_effects = data.status_effects.len(),
            items = data.items.len(),
            characters = data.characters.len(),
            "content loaded"
        );
        Ok(data)
    }

    /// Load a roster file. Relative paths are resolved against the data directory.
    pub fn load_roster(&self, roster: impl AsRef<Path>) -> LoadResult<Vec<RosterEntry>> {
        let path = self.data_dir.join(roster);
        let content = read_file(&path)?;
        ron::from_str(&content)
            .with_context(|| format!("Failed to parse roster {}", path.display()))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load_optional<T: DeserializeOwned>(&self, file: &str) -> LoadResult<Catalog<T>> {
        let path = self.data_dir.join(file);
        if path.exists() {
            Catalog::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "optional catalog absent");
            Ok(Catalog::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::ContentOracle;
    use game_core::SchedulerMode;
    use game_core::state::Team;

    fn write(dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config.toml", "scheduler = \"action_points\"\nmax_rounds = 12\n");
        write(
            dir.path(),
            "spells.ron",
            r#"{
                "zap": (name: "Zap", effects: [damage(amount: 10.0, damage_type: lightning)]),
                "zap@v2": (effects: [damage(amount: 14.0, damage_type: lightning)]),
            }"#,
        );
        write(
            dir.path(),
            "passives.ron",
            r#"{ "barbs": thorns((percentage: 0.25)) }"#,
        );
        write(
            dir.path(),
            "characters.ron",
            r#"{
                "adept": (
                    name: "Adept",
                    max_hp: 80.0,
                    speed: 50.0,
                    mana: Some(40.0),
                    passives: ["barbs"],
                    spells: ["zap@v2"],
                ),
            }"#,
        );
        write(
            dir.path(),
            "roster.ron",
            r#"[
                (character: "adept", team: heroes),
                (character: "adept", team: monsters, name: Some("Rival")),
            ]"#,
        );
        dir
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_a_data_directory() {
        let dir = fixture();
        let factory = ContentFactory::new(dir.path());

        let config = factory.load_config().unwrap();
        assert_eq!(config.scheduler, SchedulerMode::ActionPoints);
        assert_eq!(config.max_rounds, 12);

        let data = factory.load_data_manager().unwrap();
        assert!(data.items.is_empty());
        assert!(data.dangling_references().is_empty());
        assert_eq!(data.spell("zap@v2").unwrap().name, "Zap");

        let roster = factory.load_roster("roster.ron").unwrap();
        assert_eq!(roster[1].team, Team::Monsters);
        let plans = data.plan_roster(&roster).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].name, "Rival");
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn missing_spell_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_data_manager().unwrap_err();
        assert!(format!("{err:#}").contains("spells.ron"));
    }
}
