//! Definition records served by the content oracle.
//!
//! The engine depends only on the shape of these records. Where they come from
//! (RON files, a test fixture) is the oracle's business.

use crate::state::{DamageType, ResourceKind};
use crate::status::{DispelFilter, EffectCategory, EffectLogic, StackingPolicy};

/// Read-only lookups of definition records by string id.
///
/// Implementations resolve versioned ids themselves; the engine passes ids
/// through untouched.
pub trait ContentOracle {
    fn spell(&self, id: &str) -> Option<SpellDefinition>;
    fn status_effect(&self, id: &str) -> Option<StatusEffectDefinition>;
    fn item(&self, id: &str) -> Option<ItemDefinition>;
}

/// Whom a spell or item lands on when cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetKind {
    #[default]
    Enemy,
    Ally,
    Myself,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCost {
    pub resource: ResourceKind,
    pub amount: f64,
}

impl Default for SpellCost {
    fn default() -> Self {
        Self {
            resource: ResourceKind::Mana,
            amount: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: SpellCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetKind,
    pub effects: Vec<SpellEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interactions: Vec<Interaction>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_crit: bool,
    #[cfg_attr(feature = "serde", serde(default = "defaults::yes"))]
    pub can_be_reflected: bool,
    /// Whether hits from this spell fire the caster's attack-triggered passives.
    #[cfg_attr(feature = "serde", serde(default = "defaults::yes"))]
    pub trigger_on_attack: bool,
    /// Charge granted to the caster's ultimate gauge per cast.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ultimate_charge: f64,
}

impl SpellDefinition {
    pub fn new(name: impl Into<String>, effects: Vec<SpellEffect>) -> Self {
        Self {
            name: name.into(),
            cost: SpellCost::default(),
            target: TargetKind::Enemy,
            effects,
            interactions: Vec::new(),
            can_crit: false,
            can_be_reflected: true,
            trigger_on_attack: true,
            ultimate_charge: 0.0,
        }
    }

    pub fn with_cost(mut self, resource: ResourceKind, amount: f64) -> Self {
        self.cost = SpellCost { resource, amount };
        self
    }

    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }

    pub fn critical(mut self) -> Self {
        self.can_crit = true;
        self
    }
}

/// One effect of a spell or item, applied in list order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpellEffect {
    Damage {
        amount: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        damage_type: DamageType,
        #[cfg_attr(feature = "serde", serde(default))]
        lifesteal_ratio: f64,
    },
    Heal {
        amount: f64,
        /// Fraction of overheal this spell converts into shield.
        #[cfg_attr(feature = "serde", serde(default))]
        overheal_to_shield: Option<f64>,
    },
    ApplyStatusEffect {
        effect_id: String,
        /// Overrides the definition's poison instances per cast.
        #[cfg_attr(feature = "serde", serde(default))]
        poison_number: Option<u32>,
    },
    AddShield {
        amount: f64,
    },
    Dispel {
        category: DispelFilter,
        #[cfg_attr(feature = "serde", serde(default = "defaults::one"))]
        count: usize,
    },
    AmplifyPoison {
        stacks: u32,
    },
    DetonatePoison {
        #[cfg_attr(feature = "serde", serde(default = "defaults::unit_multiplier"))]
        multiplier: f64,
    },
    ReduceDebuffs {
        #[cfg_attr(feature = "serde", serde(default))]
        stacks: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        rounds: i32,
    },
    Multi(Vec<SpellEffect>),
}

/// When an interaction rule is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InteractionTrigger {
    OnCast,
    OnDamageDeal,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InteractionAction {
    /// Deal the matched effect's remaining periodic damage at once, then remove it.
    ConsumeAndDamage {
        #[cfg_attr(feature = "serde", serde(default))]
        damage_type: DamageType,
    },
    /// Scale the pending hit, optionally swapping one effect for another.
    Extinguish {
        #[cfg_attr(feature = "serde", serde(default = "defaults::unit_multiplier"))]
        damage_multiplier: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        remove_effect: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        apply_effect: Option<String>,
    },
    ExtendDuration {
        rounds: i32,
    },
}

/// A spell rule that fires when the target already carries a given effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interaction {
    pub trigger: InteractionTrigger,
    pub target_has_effect: String,
    pub action: InteractionAction,
    /// Template with `{caster}`, `{target}`, `{spell}` and `{damage}` placeholders.
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectDefinition {
    pub name: String,
    /// `None` is permanent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: EffectCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: StackingPolicy,
    #[cfg_attr(feature = "serde", serde(default = "defaults::one_u32"))]
    pub max_stacks: u32,
    /// Stacks added per application (and the starting stack count).
    #[cfg_attr(feature = "serde", serde(default = "defaults::one_u32"))]
    pub stack_intensity: u32,
    /// Poison instances created per cast.
    #[cfg_attr(feature = "serde", serde(default = "defaults::one_u32"))]
    pub poison_number: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub logic: EffectLogic,
}

impl StatusEffectDefinition {
    pub fn new(name: impl Into<String>, logic: EffectLogic) -> Self {
        Self {
            name: name.into(),
            duration: None,
            category: EffectCategory::default(),
            stacking: StackingPolicy::default(),
            max_stacks: 1,
            stack_intensity: 1,
            poison_number: 1,
            logic,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetKind,
    pub effects: Vec<SpellEffect>,
}

#[cfg(feature = "serde")]
mod defaults {
    pub fn yes() -> bool {
        true
    }

    pub fn one() -> usize {
        1
    }

    pub fn one_u32() -> u32 {
        1
    }

    pub fn unit_multiplier() -> f64 {
        1.0
    }
}
