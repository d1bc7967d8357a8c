//! Authoritative combat state.
//!
//! The [`World`] owns every [`Entity`]; entities own their components. Systems
//! hold no state of their own between events, so everything that must survive
//! from one dispatch to the next (round counter, turn queue, pending passive
//! triggers, the roll nonce) lives here too.
mod entity;
mod registry;
pub mod types;

pub use entity::Entity;
pub use registry::ComponentRegistry;
pub use types::{
    ActionGauge, AttackTriggerPassive, Component, ComponentKind, ComponentType, Controller,
    CounterStrike, Crit, DamageType, Dead, Energy, EntityId, Equipment, GrievousWounds, Health,
    HealthChange, HealthThresholdPassive, Inventory, Magnitude, Mana, OverhealToShield,
    PassiveEffect, Position, Resistance, ResourceKind, Shield, Speed, SpellList, StatKind, Team,
    Thorns, ThresholdPassiveSpent, TriggerCondition, UltimateCharge, Weapon, Wear,
};

use crate::engine::TurnState;
use crate::error::CombatError;

/// Every entity in the match plus the bookkeeping shared between systems.
#[derive(Clone, Debug, Default)]
pub struct World {
    entities: Vec<Entity>,
    next_entity_id: u32,
    running: bool,

    /// Scheduler bookkeeping.
    pub turn: TurnState,

    /// Passive trigger descriptions waiting to be attached to the next
    /// resolution summary.
    pending_passive_triggers: Vec<String>,

    /// Monotonic counter mixed into every random roll.
    roll_nonce: u64,

    /// Source of status-effect instance handles.
    next_effect_instance: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_entity_id: 1,
            next_effect_instance: 1,
            ..Self::default()
        }
    }

    /// Creates an entity with no components and returns its id.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.next_entity_id.max(1));
        self.next_entity_id = id.0 + 1;
        self.entities.push(Entity::new(id, name));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    pub fn try_entity(&self, id: EntityId) -> Result<&Entity, CombatError> {
        self.entity(id).ok_or(CombatError::EntityNotFound(id))
    }

    pub fn try_entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, CombatError> {
        self.entity_mut(id).ok_or(CombatError::EntityNotFound(id))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Ids in spawn order. Iterate this instead of `entities()` whenever the
    /// loop body dispatches events.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    pub fn name_of(&self, id: EntityId) -> String {
        self.entity(id)
            .map_or_else(|| id.to_string(), |entity| entity.name().to_owned())
    }

    /// Not flagged dead and, when it has health, above zero.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|entity| {
            !entity.has_component::<Dead>()
                && entity
                    .get_component::<Health>()
                    .is_none_or(|health| !health.is_depleted())
        })
    }

    pub fn living_ids(&self) -> Vec<EntityId> {
        self.entity_ids()
            .into_iter()
            .filter(|id| self.is_alive(*id))
            .collect()
    }

    pub fn team_of(&self, id: EntityId) -> Option<Team> {
        self.entity(id)?.get_component::<Team>().copied()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn push_passive_trigger(&mut self, description: impl Into<String>) {
        self.pending_passive_triggers.push(description.into());
    }

    pub fn take_passive_triggers(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_passive_triggers)
    }

    pub fn next_roll_nonce(&mut self) -> u64 {
        self.roll_nonce += 1;
        self.roll_nonce
    }

    pub fn next_effect_instance(&mut self) -> u64 {
        let instance = self.next_effect_instance.max(1);
        self.next_effect_instance = instance + 1;
        instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_ids_are_sequential_and_start_at_one() {
        let mut world = World::new();
        assert_eq!(world.spawn("a"), EntityId(1));
        assert_eq!(world.spawn("b"), EntityId(2));
        assert_eq!(world.entity_ids(), vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn liveness_follows_health_and_dead_marker() {
        let registry = ComponentRegistry::default();
        let mut world = World::new();
        let ghost = world.spawn("ghost");
        let knight = world.spawn("knight");
        let corpse = world.spawn("corpse");

        world
            .entity_mut(knight)
            .unwrap()
            .add_component(&registry, Health::new(10.0));
        world
            .entity_mut(corpse)
            .unwrap()
            .add_component(&registry, Health::with_current(10.0, 0.0));

        assert!(world.is_alive(ghost));
        assert!(world.is_alive(knight));
        assert!(!world.is_alive(corpse));

        world
            .entity_mut(knight)
            .unwrap()
            .add_component(&registry, Dead);
        assert_eq!(world.living_ids(), vec![ghost]);
    }

    #[test]
    fn passive_triggers_drain_once() {
        let mut world = World::new();
        world.push_passive_trigger("shield up");
        assert_eq!(world.take_passive_triggers(), vec!["shield up".to_string()]);
        assert!(world.take_passive_triggers().is_empty());
    }
}
