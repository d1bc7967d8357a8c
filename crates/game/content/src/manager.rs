//! Read-only content store handed to the engine as its [`ContentOracle`].

use std::collections::BTreeMap;

use game_core::error::{CombatError, DataKind};
use game_core::env::SpellEffect;
use game_core::state::{AttackTriggerPassive, Component, PassiveEffect, Position};
use game_core::{ContentOracle, ItemDefinition, SpellDefinition, StatusEffectDefinition};

use crate::characters::{CharacterTemplate, PassiveDefinition, RosterEntry};

/// Every definition the match may look up, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct DataManager {
    pub spells: BTreeMap<String, SpellDefinition>,
    pub status_effects: BTreeMap<String, StatusEffectDefinition>,
    pub items: BTreeMap<String, ItemDefinition>,
    pub passives: BTreeMap<String, PassiveDefinition>,
    pub characters: BTreeMap<String, CharacterTemplate>,
}

/// A combatant ready for `Engine::spawn`.
#[derive(Clone, Debug)]
pub struct SpawnPlan {
    pub name: String,
    pub components: Vec<Component>,
}

impl DataManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passive(&self, id: &str) -> Option<&PassiveDefinition> {
        self.passives.get(id)
    }

    pub fn character(&self, id: &str) -> Option<&CharacterTemplate> {
        self.characters.get(id)
    }

    /// Builds one spawn plan per roster entry. Positions follow roster order,
    /// starting at 1.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::MissingData` for an unknown character or passive id.
    pub fn plan_roster(&self, roster: &[RosterEntry]) -> Result<Vec<SpawnPlan>, CombatError> {
        roster
            .iter()
            .zip(1u32..)
            .map(|(entry, slot)| {
                let template = self
                    .character(&entry.character)
                    .ok_or_else(|| CombatError::missing(DataKind::Character, &entry.character))?;
                let components = template.components(entry.team, Position(slot), &self.passives)?;
                Ok(SpawnPlan {
                    name: entry.name.clone().unwrap_or_else(|| template.name.clone()),
                    components,
                })
            })
            .collect()
    }

    /// Ids referenced by spells, items and characters that resolve to nothing.
    pub fn dangling_references(&self) -> Vec<(DataKind, String)> {
        let mut missing = Vec::new();
        for template in self.characters.values() {
            for spell in &template.spells {
                if !self.spells.contains_key(spell) {
                    missing.push((DataKind::Spell, spell.clone()));
                }
            }
            for passive in &template.passives {
                if !self.passives.contains_key(passive) {
                    missing.push((DataKind::Passive, passive.clone()));
                }
            }
            for item in template.items.keys() {
                if !self.items.contains_key(item) {
                    missing.push((DataKind::Item, item.clone()));
                }
            }
        }
        let mut effect_ids = Vec::new();
        for spell in self.spells.values() {
            collect_status_ids(&spell.effects, &mut effect_ids);
            effect_ids.extend(spell.interactions.iter().map(|i| &i.target_has_effect));
        }
        for item in self.items.values() {
            collect_status_ids(&item.effects, &mut effect_ids);
        }
        for passive in self.passives.values() {
            if let PassiveDefinition::AttackTrigger(AttackTriggerPassive {
                effect: PassiveEffect::ApplyStatus { effect_id },
                ..
            }) = passive
            {
                effect_ids.push(effect_id);
            }
        }
        for id in effect_ids {
            if !self.status_effects.contains_key(id) {
                missing.push((DataKind::StatusEffect, id.clone()));
            }
        }
        missing.sort();
        missing.dedup();
        missing
    }
}

fn collect_status_ids<'a>(effects: &'a [SpellEffect], out: &mut Vec<&'a String>) {
    for effect in effects {
        match effect {
            SpellEffect::ApplyStatusEffect { effect_id, .. } => out.push(effect_id),
            SpellEffect::Multi(inner) => collect_status_ids(inner, out),
            _ => {}
        }
    }
}

impl ContentOracle for DataManager {
    fn spell(&self, id: &str) -> Option<SpellDefinition> {
        self.spells.get(id).cloned()
    }

    fn status_effect(&self, id: &str) -> Option<StatusEffectDefinition> {
        self.status_effects.get(id).cloned()
    }

    fn item(&self, id: &str) -> Option<ItemDefinition> {
        self.items.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::state::{Controller, Team};

    fn knight() -> CharacterTemplate {
        CharacterTemplate {
            name: "Knight".into(),
            max_hp: 100.0,
            speed: 30.0,
            mana: None,
            energy: None,
            ultimate_charge: None,
            shield: 0.0,
            crit: None,
            resistances: Vec::new(),
            passives: Vec::new(),
            spells: vec!["slash".into()],
            weapon: None,
            items: BTreeMap::new(),
            controller: Controller::Ai,
        }
    }

    #[test]
    fn roster_positions_follow_order_and_names_can_be_overridden() {
        let mut data = DataManager::new();
        data.characters.insert("knight".into(), knight());
        let roster = [
            RosterEntry {
                character: "knight".into(),
                team: Team::Heroes,
                name: None,
            },
            RosterEntry {
                character: "knight".into(),
                team: Team::Monsters,
                name: Some("Black Knight".into()),
            },
        ];

        let plans = data.plan_roster(&roster).unwrap();

        assert_eq!(plans[0].name, "Knight");
        assert_eq!(plans[1].name, "Black Knight");
        assert!(plans[1].components.contains(&Component::Position(Position(2))));
        assert!(plans[1].components.contains(&Component::Team(Team::Monsters)));
    }

    #[test]
    fn unknown_character_is_missing_data() {
        let roster = [RosterEntry {
            character: "lich".into(),
            team: Team::Monsters,
            name: None,
        }];
        let err = DataManager::new().plan_roster(&roster).unwrap_err();
        assert_eq!(err, CombatError::missing(DataKind::Character, "lich"));
    }

    #[test]
    fn dangling_spell_reference_is_reported() {
        let mut data = DataManager::new();
        data.characters.insert("knight".into(), knight());
        assert_eq!(
            data.dangling_references(),
            vec![(DataKind::Spell, "slash".to_string())]
        );
        assert!(data.spell("slash").is_none());
    }
}
