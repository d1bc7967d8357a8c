//! Character and passive templates, and the factory that turns them into
//! component lists for [`game_core::Engine::spawn`].

use std::collections::BTreeMap;

use game_core::error::{CombatError, DataKind};
use game_core::state::{
    AttackTriggerPassive, Component, Controller, CounterStrike, Crit, Energy, Equipment,
    GrievousWounds, Health, HealthThresholdPassive, Inventory, Mana, OverhealToShield, Position,
    Resistance, Shield, Speed, SpellList, Team, Thorns, UltimateCharge, Weapon,
};

/// A passive ability a character template can list by id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PassiveDefinition {
    AttackTrigger(AttackTriggerPassive),
    HealthThreshold(HealthThresholdPassive),
    Thorns(Thorns),
    CounterStrike(CounterStrike),
    OverhealToShield(OverhealToShield),
    GrievousWounds(GrievousWounds),
}

impl From<PassiveDefinition> for Component {
    fn from(passive: PassiveDefinition) -> Self {
        match passive {
            PassiveDefinition::AttackTrigger(p) => p.into(),
            PassiveDefinition::HealthThreshold(p) => p.into(),
            PassiveDefinition::Thorns(p) => p.into(),
            PassiveDefinition::CounterStrike(p) => p.into(),
            PassiveDefinition::OverhealToShield(p) => p.into(),
            PassiveDefinition::GrievousWounds(p) => p.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyTemplate {
    pub max: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub recovery_per_turn: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponTemplate {
    pub name: String,
    pub durability: u32,
}

/// Starting stats and kit of a combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterTemplate {
    pub name: String,
    pub max_hp: f64,
    pub speed: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub energy: Option<EnergyTemplate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ultimate_charge: Option<f64>,
    /// Shield the character starts the match with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit: Option<Crit>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resistances: Vec<Resistance>,
    /// Passive ids, resolved against the passive catalog.
    #[cfg_attr(feature = "serde", serde(default))]
    pub passives: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<WeaponTemplate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: BTreeMap<String, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub controller: Controller,
}

impl CharacterTemplate {
    /// Components for one combatant built from this template.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::MissingData` for a passive id missing from `passives`.
    pub fn components(
        &self,
        team: Team,
        position: Position,
        passives: &BTreeMap<String, PassiveDefinition>,
    ) -> Result<Vec<Component>, CombatError> {
        let mut components = vec![
            Component::from(Health::new(self.max_hp)),
            Component::from(Speed::new(self.speed)),
            Component::from(team),
            Component::from(position),
            Component::from(self.controller),
        ];
        if let Some(max) = self.mana {
            components.push(Mana::new(max).into());
        }
        if let Some(energy) = &self.energy {
            components.push(Energy::new(energy.max, energy.recovery_per_turn).into());
        }
        if let Some(max) = self.ultimate_charge {
            components.push(UltimateCharge::new(max).into());
        }
        if self.shield > 0.0 {
            components.push(Shield::new(self.shield).into());
        }
        if let Some(crit) = &self.crit {
            components.push(crit.clone().into());
        }
        components.extend(self.resistances.iter().cloned().map(Component::from));
        for id in &self.passives {
            let passive = passives
                .get(id)
                .cloned()
                .ok_or_else(|| CombatError::missing(DataKind::Passive, id.as_str()))?;
            components.push(passive.into());
        }
        if !self.spells.is_empty() {
            components.push(SpellList::new(self.spells.iter().cloned()).into());
        }
        if let Some(weapon) = &self.weapon {
            let weapon = Weapon::new(weapon.name.clone(), weapon.durability);
            components.push(Equipment::with_main_hand(weapon).into());
        }
        if !self.items.is_empty() {
            let inventory = self
                .items
                .iter()
                .fold(Inventory::default(), |bag, (id, count)| bag.with_item(id.clone(), *count));
            components.push(inventory.into());
        }
        Ok(components)
    }
}

/// One roster slot: which template fights for which side.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterEntry {
    pub character: String,
    pub team: Team,
    /// Display name override; defaults to the template's name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}
