use crate::env::{ContentOracle, StatusEffectDefinition};
use crate::error::{CombatError, DataKind};
use crate::state::EntityId;

use super::logic::EffectLogic;

/// Effect ids with this prefix take the independent-instance poison path.
pub const POISON_PREFIX: &str = "poison_";

/// Dispel targeting group.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectCategory {
    Buff,
    Debuff,
    Control,
    #[default]
    Uncategorized,
}

/// What happens when an effect is applied while one with the same id exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StackingPolicy {
    /// Keep one instance; duration becomes the longer of the two.
    #[default]
    RefreshDuration,
    /// Keep one instance; add stacks up to the cap and reset the duration.
    StackIntensity,
    /// Always append a new instance.
    Independent,
}

/// Which effects a dispel may remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DispelFilter {
    /// Every effect, regardless of the requested count.
    All,
    Category(EffectCategory),
}

impl DispelFilter {
    pub fn matches(self, category: EffectCategory) -> bool {
        match self {
            Self::All => true,
            Self::Category(wanted) => wanted == category,
        }
    }
}

impl core::str::FromStr for DispelFilter {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Category)
        }
    }
}

/// One applied buff or debuff, owned by the target's [`StatusEffects`](super::StatusEffects).
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub id: String,
    pub name: String,
    /// Remaining rounds; `None` never expires by time.
    pub duration: Option<i32>,
    pub category: EffectCategory,
    pub stacking: StackingPolicy,
    pub max_stacks: u32,
    pub stack_count: u32,
    pub stack_intensity: u32,
    pub poison_number: u32,
    /// Attribution only; the caster may be dead by the time the effect ticks.
    pub caster: Option<EntityId>,
    pub logic: EffectLogic,
    /// Handle assigned when the effect enters a container; `0` before that.
    pub instance: u64,
}

impl StatusEffect {
    pub fn new(id: impl Into<String>, name: impl Into<String>, logic: EffectLogic) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration: None,
            category: EffectCategory::default(),
            stacking: StackingPolicy::default(),
            max_stacks: 1,
            stack_count: 1,
            stack_intensity: 1,
            poison_number: 1,
            caster: None,
            logic,
            instance: 0,
        }
    }

    /// Builds an instance from its definition. The starting stack count is the
    /// definition's intensity.
    pub fn from_definition(
        id: impl Into<String>,
        definition: StatusEffectDefinition,
        caster: Option<EntityId>,
    ) -> Self {
        let max_stacks = definition.max_stacks.max(1);
        let stack_intensity = definition.stack_intensity.max(1);
        Self {
            id: id.into(),
            name: definition.name,
            duration: definition.duration,
            category: definition.category,
            stacking: definition.stacking,
            max_stacks,
            stack_count: stack_intensity.min(max_stacks),
            stack_intensity,
            poison_number: definition.poison_number.max(1),
            caster,
            logic: definition.logic,
            instance: 0,
        }
    }

    pub fn with_duration(mut self, rounds: i32) -> Self {
        self.duration = Some(rounds);
        self
    }

    pub fn with_category(mut self, category: EffectCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_stacking(mut self, stacking: StackingPolicy, max_stacks: u32) -> Self {
        self.stacking = stacking;
        self.max_stacks = max_stacks.max(1);
        self
    }

    /// Sets both the per-application intensity and the starting stack count.
    pub fn with_intensity(mut self, intensity: u32) -> Self {
        self.stack_intensity = intensity.max(1);
        self.stack_count = self.stack_intensity.min(self.max_stacks);
        self
    }

    pub fn with_poison_number(mut self, count: u32) -> Self {
        self.poison_number = count.max(1);
        self
    }

    pub fn with_caster(mut self, caster: EntityId) -> Self {
        self.caster = Some(caster);
        self
    }

    pub fn is_poison(&self) -> bool {
        self.id.starts_with(POISON_PREFIX)
    }

    pub fn is_permanent(&self) -> bool {
        self.duration.is_none()
    }

    pub fn is_expired(&self) -> bool {
        self.duration.is_some_and(|rounds| rounds <= 0)
    }

    pub fn is_debuff(&self) -> bool {
        matches!(self.category, EffectCategory::Debuff)
    }

    /// Periodic damage this instance deals per tick, scaled the way its logic scales it.
    pub fn tick_damage(&self) -> f64 {
        self.logic.tick_damage(self)
    }
}

/// Looks up `id` through the content oracle and builds a fresh instance.
///
/// # Errors
///
/// Returns `CombatError::MissingData` if the id is unknown.
pub fn create_effect(
    content: &dyn ContentOracle,
    id: &str,
    caster: Option<EntityId>,
) -> Result<StatusEffect, CombatError> {
    let definition = content
        .status_effect(id)
        .ok_or_else(|| CombatError::missing(DataKind::StatusEffect, id))?;
    Ok(StatusEffect::from_definition(id, definition, caster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ContentSnapshot;
    use crate::state::DamageType;

    #[test]
    fn dispel_filter_parses_all_and_categories() {
        assert_eq!("all".parse::<DispelFilter>().unwrap(), DispelFilter::All);
        assert_eq!(
            "Debuff".parse::<DispelFilter>().unwrap(),
            DispelFilter::Category(EffectCategory::Debuff)
        );
        assert!("nonsense".parse::<DispelFilter>().is_err());
        assert!(DispelFilter::All.matches(EffectCategory::Buff));
        assert!(!DispelFilter::Category(EffectCategory::Buff).matches(EffectCategory::Debuff));
    }

    #[test]
    fn factory_seeds_stack_count_from_intensity() {
        let mut definition = StatusEffectDefinition::new(
            "Venom",
            EffectLogic::PoisonDot {
                damage_per_round: 4.0,
                damage_type: DamageType::Poison,
            },
        );
        definition.max_stacks = 5;
        definition.stack_intensity = 3;
        definition.poison_number = 2;
        let content = ContentSnapshot::new().with_status_effect("poison_venom", definition);

        let effect = create_effect(&content, "poison_venom", Some(EntityId(4))).unwrap();
        assert!(effect.is_poison());
        assert_eq!(effect.stack_count, 3);
        assert_eq!(effect.poison_number, 2);
        assert_eq!(effect.caster, Some(EntityId(4)));
        assert_eq!(effect.instance, 0);
    }

    #[test]
    fn unknown_effect_is_missing_data() {
        let content = ContentSnapshot::new();
        let err = create_effect(&content, "burning", None).unwrap_err();
        assert_eq!(err, CombatError::missing(DataKind::StatusEffect, "burning"));
    }
}
