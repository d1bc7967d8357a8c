use super::effect::{DispelFilter, StatusEffect};

/// Per-entity list of applied effects, in application order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffect> {
        self.effects.iter_mut()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.effects.iter().any(|effect| effect.id == id)
    }

    /// First instance with this id.
    pub fn find(&self, id: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut StatusEffect> {
        self.effects.iter_mut().find(|effect| effect.id == id)
    }

    pub fn find_instance_mut(&mut self, instance: u64) -> Option<&mut StatusEffect> {
        self.effects
            .iter_mut()
            .find(|effect| effect.instance == instance)
    }

    /// First instance the incoming effect's logic agrees to merge with.
    pub fn find_stackable_mut(&mut self, incoming: &StatusEffect) -> Option<&mut StatusEffect> {
        self.effects
            .iter_mut()
            .find(|existing| existing.logic.can_stack_with(existing, incoming))
    }

    /// Appends an effect whose `instance` handle is already assigned.
    pub fn push(&mut self, effect: StatusEffect) {
        self.effects.push(effect);
    }

    pub fn remove_instance(&mut self, instance: u64) -> Option<StatusEffect> {
        let index = self
            .effects
            .iter()
            .position(|effect| effect.instance == instance)?;
        Some(self.effects.remove(index))
    }

    /// Owned copy of the current list, for iterating while dispatching.
    pub fn snapshot(&self) -> Vec<StatusEffect> {
        self.effects.clone()
    }

    /// Instance handles with the given id, oldest first.
    pub fn instances_of(&self, id: &str) -> Vec<u64> {
        self.effects
            .iter()
            .filter(|effect| effect.id == id)
            .map(|effect| effect.instance)
            .collect()
    }

    /// Instance handles a dispel may remove, oldest first.
    pub fn dispel_candidates(&self, filter: DispelFilter) -> Vec<u64> {
        self.effects
            .iter()
            .filter(|effect| filter.matches(effect.category))
            .map(|effect| effect.instance)
            .collect()
    }

    pub fn poison_count(&self) -> usize {
        self.effects.iter().filter(|effect| effect.is_poison()).count()
    }

    pub fn poisons(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|effect| effect.is_poison())
    }

    pub fn poisons_mut(&mut self) -> impl Iterator<Item = &mut StatusEffect> {
        self.effects.iter_mut().filter(|effect| effect.is_poison())
    }

    /// Lowest-stacked poison instance; the oldest wins ties.
    pub fn weakest_poison_mut(&mut self) -> Option<&mut StatusEffect> {
        self.effects
            .iter_mut()
            .filter(|effect| effect.is_poison())
            .reduce(|weakest, candidate| {
                if candidate.stack_count < weakest.stack_count {
                    candidate
                } else {
                    weakest
                }
            })
    }

    /// Removes every poison instance and returns them in container order.
    pub fn drain_poisons(&mut self) -> Vec<StatusEffect> {
        let (poisons, rest): (Vec<_>, Vec<_>) = core::mem::take(&mut self.effects)
            .into_iter()
            .partition(StatusEffect::is_poison);
        self.effects = rest;
        poisons
    }

    pub fn blocks_action(&self) -> bool {
        self.effects.iter().any(|effect| effect.logic.blocks_action())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DamageType;
    use crate::status::{EffectCategory, EffectLogic};

    fn poison(instance: u64, stacks: u32) -> StatusEffect {
        let mut effect = StatusEffect::new(
            "poison_basic",
            "Poison",
            EffectLogic::PoisonDot {
                damage_per_round: 2.0,
                damage_type: DamageType::Poison,
            },
        )
        .with_stacking(crate::status::StackingPolicy::Independent, 5)
        .with_intensity(stacks);
        effect.instance = instance;
        effect
    }

    #[test]
    fn weakest_poison_prefers_oldest_on_ties() {
        let mut container = StatusEffects::new();
        container.push(poison(1, 3));
        container.push(poison(2, 1));
        container.push(poison(3, 1));
        assert_eq!(container.weakest_poison_mut().unwrap().instance, 2);
    }

    #[test]
    fn drain_poisons_keeps_other_effects_in_order() {
        let mut container = StatusEffects::new();
        let mut shield = StatusEffect::new("ward", "Ward", EffectLogic::Generic)
            .with_category(EffectCategory::Buff);
        shield.instance = 10;
        container.push(poison(1, 1));
        container.push(shield);
        container.push(poison(2, 1));

        let drained = container.drain_poisons();
        assert_eq!(drained.len(), 2);
        assert_eq!(container.len(), 1);
        assert!(container.contains("ward"));
        assert_eq!(container.poison_count(), 0);
    }

    #[test]
    fn dispel_candidates_respect_filter_and_order() {
        let mut container = StatusEffects::new();
        for (instance, category) in [
            (1, EffectCategory::Debuff),
            (2, EffectCategory::Buff),
            (3, EffectCategory::Debuff),
        ] {
            let mut effect = StatusEffect::new(format!("e{instance}"), "e", EffectLogic::Generic)
                .with_category(category);
            effect.instance = instance;
            container.push(effect);
        }
        assert_eq!(
            container.dispel_candidates(DispelFilter::Category(EffectCategory::Debuff)),
            vec![1, 3]
        );
        assert_eq!(container.dispel_candidates(DispelFilter::All), vec![1, 2, 3]);
    }
}
