//! Payload records carried by [`GameEvent`](super::GameEvent) variants.

use bitflags::bitflags;

use crate::config::GameConfig;
use crate::state::{DamageType, EntityId, ResourceKind, StatKind};

/// Where a damage or heal request comes from.
///
/// Reflections and passives never spawn reflections, and only direct hits
/// fire attack-triggered passives. That keeps re-entrant cascades finite.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// A spell, item or interaction aimed at the target.
    #[default]
    Direct,
    /// Thorns or counter-strike bouncing damage back.
    Reflected,
    /// Spawned by a passive (attack trigger, lifesteal, interaction).
    Passive,
    /// A status-effect tick.
    DamageOverTime,
}

impl Provenance {
    /// Thorns and counter-strike answer direct hits and periodic ticks.
    pub const fn can_provoke_reflection(self) -> bool {
        matches!(self, Self::Direct | Self::DamageOverTime)
    }

    /// Attack-triggered passives only fire on direct hits.
    pub const fn can_trigger_passives(self) -> bool {
        matches!(self, Self::Direct)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DamageRequest {
    pub caster: Option<EntityId>,
    pub target: EntityId,
    pub source_spell: Option<String>,
    pub source_name: String,
    pub base_damage: f64,
    pub damage_type: DamageType,
    pub lifesteal_ratio: f64,
    pub can_crit: bool,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub can_be_reflected: bool,
    pub trigger_on_attack: bool,
    pub provenance: Provenance,
}

impl DamageRequest {
    pub fn new(
        caster: Option<EntityId>,
        target: EntityId,
        source_name: impl Into<String>,
        base_damage: f64,
    ) -> Self {
        Self {
            caster,
            target,
            source_spell: None,
            source_name: source_name.into(),
            base_damage,
            damage_type: DamageType::default(),
            lifesteal_ratio: 0.0,
            can_crit: false,
            crit_chance: 0.0,
            crit_multiplier: GameConfig::DEFAULT_CRIT_MULTIPLIER,
            can_be_reflected: true,
            trigger_on_attack: true,
            provenance: Provenance::Direct,
        }
    }

    pub fn with_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    pub fn from_spell(mut self, spell_id: impl Into<String>) -> Self {
        self.source_spell = Some(spell_id.into());
        self
    }

    pub fn with_lifesteal(mut self, ratio: f64) -> Self {
        self.lifesteal_ratio = ratio;
        self
    }

    pub fn with_crit(mut self, chance: f64, multiplier: f64) -> Self {
        self.can_crit = true;
        self.crit_chance = chance;
        self.crit_multiplier = multiplier;
        self
    }

    pub fn unreflectable(mut self) -> Self {
        self.can_be_reflected = false;
        self
    }

    /// Marks the request as secondary damage: no crits, no attack triggers,
    /// no lifesteal. Periodic ticks stay reflectable.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        if provenance != Provenance::Direct {
            self.can_crit = false;
            self.trigger_on_attack = false;
            self.lifesteal_ratio = 0.0;
        }
        if !provenance.can_provoke_reflection() {
            self.can_be_reflected = false;
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealRequest {
    pub caster: Option<EntityId>,
    pub target: EntityId,
    pub source_spell: Option<String>,
    pub source_name: String,
    pub base_heal: f64,
    pub provenance: Provenance,
    /// Unmodifiable heals skip the pre-heal pipeline (heal reduction).
    pub modifiable: bool,
    /// Skill-level overheal conversion ratio.
    pub overheal_to_shield: Option<f64>,
}

impl HealRequest {
    pub fn new(
        caster: Option<EntityId>,
        target: EntityId,
        source_name: impl Into<String>,
        base_heal: f64,
    ) -> Self {
        Self {
            caster,
            target,
            source_spell: None,
            source_name: source_name.into(),
            base_heal,
            provenance: Provenance::Direct,
            modifiable: true,
            overheal_to_shield: None,
        }
    }

    pub fn from_spell(mut self, spell_id: impl Into<String>) -> Self {
        self.source_spell = Some(spell_id.into());
        self
    }

    pub fn unmodifiable(mut self) -> Self {
        self.modifiable = false;
        self
    }

    pub fn with_overheal_to_shield(mut self, ratio: Option<f64>) -> Self {
        self.overheal_to_shield = ratio;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

/// Running value of a stat query. Effects fold `value = value * mult + add`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatQuery {
    pub entity: EntityId,
    pub stat: StatKind,
    pub base: f64,
    pub value: f64,
}

impl StatQuery {
    pub fn new(entity: EntityId, stat: StatKind, base: f64) -> Self {
        Self {
            entity,
            stat,
            base,
            value: base,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeMode {
    Restore,
    Consume,
}

/// Channel tag on log requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LogTag {
    Combat,
    Status,
    Spell,
    Passive,
    Turn,
    Resource,
    Item,
    System,
}

/// One resource movement in a resolution summary.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceChange {
    pub resource: ResourceKind,
    pub delta: f64,
    pub current: f64,
    pub max: Option<f64>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ResolutionFlags: u8 {
        const CRIT = 1;
        const OVERHEAL = 1 << 1;
        const EFFECT_PRODUCED = 1 << 2;
        const NO_EFFECT = 1 << 3;
    }
}

/// Summary of one resolved spell, item, hit, or heal, for observers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectResolution {
    pub caster: Option<EntityId>,
    pub target: EntityId,
    pub source_spell: Option<String>,
    pub source_name: String,
    pub changes: Vec<ResourceChange>,
    pub shield_blocked: f64,
    pub passive_triggers: Vec<String>,
    pub applied_effects: Vec<String>,
    pub flags: ResolutionFlags,
}

impl EffectResolution {
    pub fn new(caster: Option<EntityId>, target: EntityId, source_name: impl Into<String>) -> Self {
        Self {
            caster,
            target,
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, resource: ResourceKind, delta: f64, current: f64, max: Option<f64>) {
        self.changes.push(ResourceChange {
            resource,
            delta,
            current,
            max,
        });
        self.flags |= ResolutionFlags::EFFECT_PRODUCED;
    }

    pub fn mark_produced(&mut self) {
        self.flags |= ResolutionFlags::EFFECT_PRODUCED;
    }

    /// Sets `NO_EFFECT` when nothing was recorded or produced.
    pub fn finalize(&mut self) {
        if !self.flags.contains(ResolutionFlags::EFFECT_PRODUCED)
            && self.changes.is_empty()
            && self.applied_effects.is_empty()
        {
            self.flags |= ResolutionFlags::NO_EFFECT;
        }
    }

    pub fn no_effect_produced(&self) -> bool {
        self.flags.contains(ResolutionFlags::NO_EFFECT)
    }

    pub fn change(&self, resource: ResourceKind) -> Option<&ResourceChange> {
        self.changes.iter().find(|change| change.resource == resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_provenance_strips_escalation_flags() {
        let request = DamageRequest::new(Some(EntityId(1)), EntityId(2), "Thorns", 12.0)
            .with_crit(0.5, 2.0)
            .with_lifesteal(0.3)
            .with_provenance(Provenance::Reflected);
        assert!(!request.can_crit);
        assert!(!request.can_be_reflected);
        assert!(!request.trigger_on_attack);
        assert_eq!(request.lifesteal_ratio, 0.0);
        assert!(!request.provenance.can_provoke_reflection());
    }

    #[test]
    fn periodic_ticks_stay_reflectable() {
        let tick = DamageRequest::new(Some(EntityId(1)), EntityId(2), "Burning", 5.0)
            .with_provenance(Provenance::DamageOverTime);
        assert!(tick.can_be_reflected);
        assert!(!tick.trigger_on_attack);

        let passive = DamageRequest::new(Some(EntityId(1)), EntityId(2), "Sear", 5.0)
            .with_provenance(Provenance::Passive);
        assert!(!passive.can_be_reflected);
        assert!(!Provenance::Passive.can_provoke_reflection());
    }

    #[test]
    fn empty_resolution_finalizes_as_no_effect() {
        let mut empty = EffectResolution::new(None, EntityId(1), "Fizzle");
        empty.finalize();
        assert!(empty.no_effect_produced());

        let mut shielded = EffectResolution::new(None, EntityId(1), "Barrier");
        shielded.record(ResourceKind::Shield, 20.0, 20.0, None);
        shielded.finalize();
        assert!(!shielded.no_effect_produced());
    }
}
