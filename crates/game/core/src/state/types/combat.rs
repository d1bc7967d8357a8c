//! Components read by the damage and heal pipelines.

use super::common::DamageType;

/// Critical strike chance and multiplier of an attacker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crit {
    /// Probability in `[0, 1]`.
    pub chance: f64,
    pub multiplier: f64,
}

/// Percentage reduction against one damage type. Multi-instance: several
/// resistances of the same type stack multiplicatively.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistance {
    pub damage_type: DamageType,
    /// Fraction in `[0, 1]`.
    pub percentage: f64,
}

impl Resistance {
    pub fn new(damage_type: DamageType, percentage: f64) -> Self {
        Self {
            damage_type,
            percentage,
        }
    }

    pub fn factor(&self) -> f64 {
        1.0 - self.percentage.clamp(0.0, 1.0)
    }
}

/// Reflects a fraction of damage taken back to the attacker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thorns {
    pub percentage: f64,
}

/// Strikes back for a fixed amount whenever hit and wears down the
/// attacker's main-hand weapon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterStrike {
    pub damage: f64,
    pub durability_loss: u32,
}

/// Reduces all modifiable healing received.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrievousWounds {
    /// Fraction in `[0, 1]`.
    pub reduction: f64,
}

/// Target-side passive converting overheal into shield.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverhealToShield {
    pub conversion_ratio: f64,
}

/// When an attack-triggered passive is allowed to fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TriggerCondition {
    #[default]
    Always,
    /// Requires the pre-mitigation damage of the hit to be positive.
    OnDamage,
    OnHit,
}

/// A fixed value or a ratio of the damage dealt by the triggering hit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Magnitude {
    Fixed(f64),
    Ratio(f64),
}

impl Magnitude {
    pub fn resolve(self, damage_dealt: f64) -> f64 {
        match self {
            Self::Fixed(value) => value,
            Self::Ratio(ratio) => damage_dealt * ratio,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PassiveEffect {
    ExtraDamage {
        amount: Magnitude,
        #[cfg_attr(feature = "serde", serde(default))]
        damage_type: DamageType,
    },
    ExtraHeal {
        amount: Magnitude,
    },
    ApplyStatus {
        effect_id: String,
    },
}

/// Passive on an attacker that may fire after each of its direct hits.
/// Multi-instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackTriggerPassive {
    pub name: String,
    /// Probability in `[0, 1]`.
    pub trigger_chance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: TriggerCondition,
    pub effect: PassiveEffect,
}

/// Grants a shield once, the first time health drops to the threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthThresholdPassive {
    pub name: String,
    pub threshold_ratio: f64,
    pub shield_amount: f64,
}
