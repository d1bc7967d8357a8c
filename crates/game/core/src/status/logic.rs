//! Behaviour attached to a status effect.
//!
//! [`EffectLogic`] is a closed set of effect kinds. Each hook is a `match` over
//! the variant; kinds that do not care about a hook fall through to a no-op.

use crate::event::{DamageRequest, Dispatcher, GameEvent, HealRequest, LogTag, Provenance, StatQuery};
use crate::state::{DamageType, EntityId, StatKind, World};

use super::effect::{StackingPolicy, StatusEffect};

/// `value = value * multiply + add` for one stat.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: StatKind,
    #[cfg_attr(feature = "serde", serde(default = "defaults::unit"))]
    pub multiply: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub add: f64,
}

impl StatModifier {
    pub fn multiply(stat: StatKind, factor: f64) -> Self {
        Self {
            stat,
            multiply: factor,
            add: 0.0,
        }
    }

    pub fn add(stat: StatKind, amount: f64) -> Self {
        Self {
            stat,
            multiply: 1.0,
            add: amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectLogic {
    /// Deals `damage_per_round * stack_count` each round.
    DamageOverTime {
        damage_per_round: f64,
        #[cfg_attr(feature = "serde", serde(default = "defaults::pure"))]
        damage_type: DamageType,
    },
    /// Deals `damage_per_round` per instance regardless of stacks; stacks count down instead.
    PoisonDot {
        damage_per_round: f64,
        #[cfg_attr(feature = "serde", serde(default = "defaults::pure"))]
        damage_type: DamageType,
    },
    StatModification {
        modifiers: Vec<StatModifier>,
    },
    /// Converts overheal on the carrier into shield.
    OverhealConversion {
        conversion_rate: f64,
    },
    /// The carrier skips its turns.
    Stun,
    HealOverTime {
        heal_per_round: f64,
    },
    #[default]
    Generic,
}

/// Result of merging a re-applied effect into an existing instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackOutcome {
    Refreshed { duration: Option<i32> },
    Intensified { stacks: u32, duration: Option<i32> },
    /// The incoming effect becomes a new instance.
    Rejected,
}

impl EffectLogic {
    pub fn on_apply(
        &self,
        effect: &StatusEffect,
        target: EntityId,
        d: &Dispatcher<'_>,
        world: &mut World,
    ) {
        if let Self::Stun = self {
            let name = world.name_of(target);
            d.log(world, LogTag::Status, format!("[{name}] is stunned by {}", effect.name));
        }
    }

    pub fn on_tick(
        &self,
        effect: &StatusEffect,
        target: EntityId,
        d: &Dispatcher<'_>,
        world: &mut World,
    ) {
        let caster = effect.caster.or(Some(target));
        match self {
            Self::DamageOverTime { damage_type, .. } | Self::PoisonDot { damage_type, .. } => {
                let amount = self.tick_damage(effect);
                if amount <= 0.0 {
                    return;
                }
                let name = world.name_of(target);
                d.ui(
                    world,
                    format!(
                        "{name} takes {amount:.1} from [{} x{}]",
                        effect.name, effect.stack_count
                    ),
                );
                let request = DamageRequest::new(caster, target, effect.name.clone(), amount)
                    .from_spell(effect.id.clone())
                    .with_type(*damage_type)
                    .with_provenance(Provenance::DamageOverTime);
                d.emit(world, GameEvent::DamageRequest(request));
            }
            Self::HealOverTime { heal_per_round } => {
                let amount = heal_per_round * f64::from(effect.stack_count);
                if amount <= 0.0 {
                    return;
                }
                let request = HealRequest::new(caster, target, effect.name.clone(), amount)
                    .from_spell(effect.id.clone())
                    .with_provenance(Provenance::DamageOverTime);
                d.emit(world, GameEvent::HealRequest(request));
            }
            _ => {}
        }
    }

    pub fn on_remove(
        &self,
        effect: &StatusEffect,
        target: EntityId,
        d: &Dispatcher<'_>,
        world: &mut World,
    ) {
        if let Self::Stun = self {
            let name = world.name_of(target);
            d.log(
                world,
                LogTag::Status,
                format!("[{name}] recovers from {}", effect.name),
            );
        }
    }

    pub fn on_stat_query(&self, query: &mut StatQuery) {
        if let Self::StatModification { modifiers } = self {
            for modifier in modifiers.iter().filter(|m| m.stat == query.stat) {
                query.value = query.value * modifier.multiply + modifier.add;
            }
        }
    }

    /// Shield granted for `overheal` on the carrier, if this effect converts it.
    pub fn on_heal(&self, overheal: f64) -> Option<f64> {
        match self {
            Self::OverhealConversion { conversion_rate } if overheal > 0.0 => {
                let shield = overheal * conversion_rate.clamp(0.0, 1.0);
                (shield > 0.0).then_some(shield)
            }
            _ => None,
        }
    }

    /// Whether `incoming` should merge into `existing` instead of becoming a new instance.
    pub fn can_stack_with(&self, existing: &StatusEffect, incoming: &StatusEffect) -> bool {
        !existing.is_poison()
            && !incoming.is_poison()
            && existing.id == incoming.id
            && incoming.stacking != StackingPolicy::Independent
    }

    pub fn handle_stacking(
        &self,
        existing: &mut StatusEffect,
        incoming: &StatusEffect,
    ) -> StackOutcome {
        match incoming.stacking {
            StackingPolicy::RefreshDuration => {
                existing.duration = longer(existing.duration, incoming.duration);
                StackOutcome::Refreshed {
                    duration: existing.duration,
                }
            }
            StackingPolicy::StackIntensity => {
                let cap = incoming.max_stacks.max(existing.max_stacks);
                existing.max_stacks = cap;
                existing.stack_count = existing
                    .stack_count
                    .saturating_add(incoming.stack_intensity)
                    .min(cap);
                existing.duration = incoming.duration;
                StackOutcome::Intensified {
                    stacks: existing.stack_count,
                    duration: existing.duration,
                }
            }
            StackingPolicy::Independent => StackOutcome::Rejected,
        }
    }

    pub fn blocks_action(&self) -> bool {
        matches!(self, Self::Stun)
    }

    pub fn tick_damage(&self, effect: &StatusEffect) -> f64 {
        match self {
            Self::DamageOverTime {
                damage_per_round, ..
            } => damage_per_round * f64::from(effect.stack_count),
            Self::PoisonDot {
                damage_per_round, ..
            } => *damage_per_round,
            _ => 0.0,
        }
    }

    pub fn damage_per_round(&self) -> f64 {
        match self {
            Self::DamageOverTime {
                damage_per_round, ..
            }
            | Self::PoisonDot {
                damage_per_round, ..
            } => *damage_per_round,
            _ => 0.0,
        }
    }

    pub fn damage_type(&self) -> Option<DamageType> {
        match self {
            Self::DamageOverTime { damage_type, .. } | Self::PoisonDot { damage_type, .. } => {
                Some(*damage_type)
            }
            _ => None,
        }
    }
}

/// `None` is permanent and outlasts any finite duration.
fn longer(current: Option<i32>, incoming: Option<i32>) -> Option<i32> {
    match (current, incoming) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}

#[cfg(feature = "serde")]
mod defaults {
    use crate::state::DamageType;

    pub fn unit() -> f64 {
        1.0
    }

    pub fn pure() -> DamageType {
        DamageType::Pure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burn(duration: i32) -> StatusEffect {
        StatusEffect::new(
            "burning",
            "Burning",
            EffectLogic::DamageOverTime {
                damage_per_round: 5.0,
                damage_type: DamageType::Fire,
            },
        )
        .with_duration(duration)
    }

    #[test]
    fn refresh_keeps_the_longer_duration() {
        let mut existing = burn(3);
        let incoming = burn(2);
        let outcome = existing.logic.clone().handle_stacking(&mut existing, &incoming);
        assert_eq!(outcome, StackOutcome::Refreshed { duration: Some(3) });

        let longer = burn(5);
        existing.logic.clone().handle_stacking(&mut existing, &longer);
        assert_eq!(existing.duration, Some(5));
    }

    #[test]
    fn intensity_caps_stacks_and_resets_duration() {
        let mut existing = burn(1)
            .with_stacking(StackingPolicy::StackIntensity, 4)
            .with_intensity(2);
        let incoming = burn(3)
            .with_stacking(StackingPolicy::StackIntensity, 4)
            .with_intensity(3);
        let outcome = existing.logic.clone().handle_stacking(&mut existing, &incoming);
        assert_eq!(
            outcome,
            StackOutcome::Intensified {
                stacks: 4,
                duration: Some(3)
            }
        );
        assert_eq!(existing.tick_damage(), 20.0);
    }

    #[test]
    fn poison_never_merges_by_id() {
        let poison = StatusEffect::new(
            "poison_basic",
            "Poison",
            EffectLogic::PoisonDot {
                damage_per_round: 3.0,
                damage_type: DamageType::Poison,
            },
        );
        assert!(!poison.logic.can_stack_with(&poison, &poison.clone()));
        assert!(burn(2).logic.can_stack_with(&burn(2), &burn(1)));
    }

    #[test]
    fn stat_modifiers_fold_multiply_then_add() {
        let haste = EffectLogic::StatModification {
            modifiers: vec![
                StatModifier::multiply(StatKind::Speed, 1.5),
                StatModifier::add(StatKind::Speed, 10.0),
                StatModifier::add(StatKind::CritChance, 0.2),
            ],
        };
        let mut query = StatQuery::new(EntityId(1), StatKind::Speed, 40.0);
        haste.on_stat_query(&mut query);
        assert_eq!(query.value, 70.0);
    }

    #[test]
    fn overheal_conversion_only_yields_positive_shields() {
        let ward = EffectLogic::OverhealConversion {
            conversion_rate: 0.5,
        };
        assert_eq!(ward.on_heal(30.0), Some(15.0));
        assert_eq!(ward.on_heal(0.0), None);
        assert_eq!(EffectLogic::Generic.on_heal(30.0), None);
    }
}
