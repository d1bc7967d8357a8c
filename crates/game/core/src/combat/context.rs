use crate::event::{DamageRequest, HealRequest, Provenance};
use crate::state::{DamageType, EntityId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
}

/// Request flags carried through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectMeta {
    pub source_name: String,
    pub source_spell: Option<String>,
    pub provenance: Provenance,
    pub damage_type: DamageType,
    pub can_crit: bool,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub lifesteal_ratio: f64,
    pub can_be_reflected: bool,
    pub trigger_on_attack: bool,
    pub modifiable: bool,
    pub overheal_to_shield: Option<f64>,
}

/// What the processors did, for the resolution summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectOutcome {
    pub crit: bool,
    pub shield_absorbed: f64,
    pub resisted: f64,
    /// Health actually removed or restored.
    pub applied: f64,
    pub shield_from_overheal: f64,
}

/// Working set of one damage or heal resolution.
///
/// Owned by the resolution handler and lent exclusively to one processor at a
/// time.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectContext {
    pub source: Option<EntityId>,
    pub target: EntityId,
    pub kind: EffectKind,
    pub initial_value: f64,
    pub current_value: f64,
    pub meta: EffectMeta,
    /// Heal only. Consumed at most once by the post-heal processors.
    pub overheal: f64,
    pub outcome: EffectOutcome,
    cancelled: bool,
}

impl EffectContext {
    pub fn from_damage(request: &DamageRequest) -> Self {
        Self {
            source: request.caster,
            target: request.target,
            kind: EffectKind::Damage,
            initial_value: request.base_damage,
            current_value: request.base_damage,
            meta: EffectMeta {
                source_name: request.source_name.clone(),
                source_spell: request.source_spell.clone(),
                provenance: request.provenance,
                damage_type: request.damage_type,
                can_crit: request.can_crit,
                crit_chance: request.crit_chance,
                crit_multiplier: request.crit_multiplier,
                lifesteal_ratio: request.lifesteal_ratio,
                can_be_reflected: request.can_be_reflected,
                trigger_on_attack: request.trigger_on_attack,
                modifiable: true,
                overheal_to_shield: None,
            },
            overheal: 0.0,
            outcome: EffectOutcome::default(),
            cancelled: false,
        }
    }

    pub fn from_heal(request: &HealRequest) -> Self {
        Self {
            source: request.caster,
            target: request.target,
            kind: EffectKind::Heal,
            initial_value: request.base_heal,
            current_value: request.base_heal,
            meta: EffectMeta {
                source_name: request.source_name.clone(),
                source_spell: request.source_spell.clone(),
                provenance: request.provenance,
                damage_type: DamageType::Pure,
                can_crit: false,
                crit_chance: 0.0,
                crit_multiplier: 1.0,
                lifesteal_ratio: 0.0,
                can_be_reflected: false,
                trigger_on_attack: false,
                modifiable: request.modifiable,
                overheal_to_shield: request.overheal_to_shield,
            },
            overheal: 0.0,
            outcome: EffectOutcome::default(),
            cancelled: false,
        }
    }

    /// Stops the rest of the current pipeline. Side effects already dispatched stay.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Called between the pre- and post-application pipelines.
    pub(crate) fn resume(&mut self) {
        self.cancelled = false;
    }

    /// Hands out the remaining overheal and leaves zero behind.
    pub fn take_overheal(&mut self) -> f64 {
        core::mem::take(&mut self.overheal)
    }
}
