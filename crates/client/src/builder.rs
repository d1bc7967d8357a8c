//! Match builder with dependency injection pattern.

use anyhow::{Context, Result};
use game_content::{DataManager, RosterEntry};
use game_core::state::{Component, Controller};
use game_core::{Engine, GameConfig};

/// Builder for a ready-to-run [`Engine`].
///
/// Content and roster are required. Without a configuration the defaults
/// apply; without a feed the match runs silently.
#[derive(Default)]
pub struct MatchBuilder {
    config: Option<GameConfig>,
    content: Option<DataManager>,
    roster: Option<Vec<RosterEntry>>,
    feed: Option<Box<dyn Fn(String)>>,
}

impl MatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the content (required).
    pub fn content(mut self, content: DataManager) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the roster (required).
    pub fn roster(mut self, roster: Vec<RosterEntry>) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Route the match feed to `sink`.
    pub fn feed(mut self, sink: impl Fn(String) + 'static) -> Self {
        self.feed = Some(Box::new(sink));
        self
    }

    /// Spawns the roster and wires every system onto the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if content or roster is missing, or if the roster
    /// names a character or passive the content does not define.
    pub fn build(self) -> Result<Engine> {
        let content = self
            .content
            .context("Content is required. Use .content() to set it.")?;
        let roster = self
            .roster
            .context("Roster is required. Use .roster() to set it.")?;
        if roster.is_empty() {
            anyhow::bail!("Roster is empty");
        }

        let plans = content
            .plan_roster(&roster)
            .context("Failed to build the roster")?;

        let mut engine = Engine::new(self.config.unwrap_or_default()).with_content(content);
        for plan in plans {
            let components = headless(&plan.name, plan.components);
            let id = engine.spawn(plan.name, components);
            tracing::debug!(entity = %id, "spawned");
        }
        if let Some(sink) = self.feed {
            crate::feed::install(engine.bus_mut(), sink);
        }
        engine.install_default_systems();
        Ok(engine)
    }
}

/// Nothing answers a player's action requests here, so the AI takes over.
fn headless(name: &str, components: Vec<Component>) -> Vec<Component> {
    components
        .into_iter()
        .map(|component| match component {
            Component::Controller(Controller::Player) => {
                tracing::warn!(%name, "headless client has no player input, AI takes over");
                Component::Controller(Controller::Ai)
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use super::*;
    use game_content::CharacterTemplate;
    use game_core::env::SpellEffect;
    use game_core::state::{Controller, DamageType, Team};
    use game_core::SpellDefinition;

    fn content() -> DataManager {
        let mut data = DataManager::new();
        data.spells.insert(
            "strike".into(),
            SpellDefinition::new(
                "Strike",
                vec![SpellEffect::Damage {
                    amount: 30.0,
                    damage_type: DamageType::Physical,
                    lifesteal_ratio: 0.0,
                }],
            ),
        );
        data.characters.insert(
            "brawler".into(),
            CharacterTemplate {
                name: "Brawler".into(),
                max_hp: 60.0,
                speed: 20.0,
                mana: None,
                energy: None,
                ultimate_charge: None,
                shield: 0.0,
                crit: None,
                resistances: Vec::new(),
                passives: Vec::new(),
                spells: vec!["strike".into()],
                weapon: None,
                items: BTreeMap::new(),
                controller: Controller::Ai,
            },
        );
        data
    }

    fn entry(team: Team, name: &str) -> RosterEntry {
        RosterEntry {
            character: "brawler".into(),
            team,
            name: Some(name.into()),
        }
    }

    #[test]
    fn build_requires_content_and_roster() {
        let err = MatchBuilder::new().roster(vec![]).build().unwrap_err();
        assert!(err.to_string().contains("Content is required"));

        let err = MatchBuilder::new().content(content()).build().unwrap_err();
        assert!(err.to_string().contains("Roster is required"));
    }

    #[test]
    fn built_match_runs_to_a_winner_and_feeds_lines() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let mut engine = MatchBuilder::new()
            .content(content())
            .roster(vec![entry(Team::Heroes, "Ada"), entry(Team::Monsters, "Grub")])
            .feed(move |line| sink.borrow_mut().push(line))
            .build()
            .unwrap();

        let report = engine.run();

        // Ada is first on the speed tie and lands the killing blow in round 2.
        assert_eq!(report.outcome.and_then(|o| o.winner), Some(Team::Heroes));
        let lines = lines.borrow();
        assert!(lines.iter().any(|l| l.starts_with("   Strike on Grub: health -30")));
        assert_eq!(lines.last().map(String::as_str), Some("== heroes win in round 2 =="));
    }

    #[test]
    fn player_characters_are_driven_by_the_ai() {
        let mut data = content();
        if let Some(brawler) = data.characters.get_mut("brawler") {
            brawler.controller = Controller::Player;
        }
        let mut engine = MatchBuilder::new()
            .content(data)
            .roster(vec![entry(Team::Heroes, "Ada"), entry(Team::Monsters, "Grub")])
            .build()
            .unwrap();

        let controllers: Vec<Controller> = engine
            .world()
            .living_ids()
            .into_iter()
            .filter_map(|id| engine.world().entity(id))
            .filter_map(|entity| entity.get_component::<Controller>().copied())
            .collect();
        assert_eq!(controllers, vec![Controller::Ai, Controller::Ai]);

        let report = engine.run();
        assert_eq!(report.outcome.and_then(|o| o.winner), Some(Team::Heroes));
    }

    #[test]
    fn unknown_character_fails_the_build() {
        let roster = vec![RosterEntry {
            character: "dragon".into(),
            team: Team::Monsters,
            name: None,
        }];
        let err = MatchBuilder::new()
            .content(content())
            .roster(roster)
            .build()
            .unwrap_err();
        assert!(format!("{err:#}").contains("dragon"));
    }
}
