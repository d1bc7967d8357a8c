//! First-affordable-spell AI.
//!
//! Answers `ActionRequest` for AI-controlled entities (entities without a
//! [`Controller`] count as AI). The decision is:
//! 1. walk the spell list in order and keep the first spell whose cost the
//!    actor can pay,
//! 2. pick a target by the spell's [`TargetKind`],
//! 3. fall back to passing the turn when nothing fits.
//!
//! A rejected action also passes, so a broken spell never stalls the match.

use crate::env::{ContentOracle, SpellDefinition, TargetKind};
use crate::event::{Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag};
use crate::resources::pool;
use crate::state::{Controller, EntityId, SpellList, World};

/// What the AI decided to do with its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Cast { spell_id: String, target: EntityId },
    Pass,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleAi;

impl SimpleAi {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::ActionRequest, "ai.request", on_action_request);
        bus.subscribe_named(EventKind::ActionRejected, "ai.rejected", on_action_rejected);
    }
}

fn is_ai(world: &World, actor: EntityId) -> bool {
    world
        .entity(actor)
        .and_then(|entity| entity.get_component::<Controller>())
        .is_none_or(|controller| *controller == Controller::Ai)
}

fn on_action_request(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ActionRequest { actor } = event else {
        return Ok(());
    };
    let actor = *actor;
    if !is_ai(world, actor) || !world.is_alive(actor) {
        return Ok(());
    }

    let decision = match d.env().content() {
        Ok(content) => decide(content, world, actor),
        Err(_) => Decision::Pass,
    };
    tracing::debug!(entity = %actor, ?decision, "ai decision");
    match decision {
        Decision::Cast { spell_id, target } => {
            d.emit(
                world,
                GameEvent::CastSpellRequest {
                    caster: actor,
                    target,
                    spell_id,
                },
            );
        }
        Decision::Pass => pass(d, world, actor),
    }
    Ok(())
}

fn on_action_rejected(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ActionRejected { actor, .. } = event else {
        return Ok(());
    };
    let actor = *actor;
    if world.turn.awaiting == Some(actor) && is_ai(world, actor) {
        pass(d, world, actor);
    }
    Ok(())
}

fn pass(d: &Dispatcher<'_>, world: &mut World, actor: EntityId) {
    let name = world.name_of(actor);
    d.log(world, LogTag::Turn, format!("{name} waits"));
    d.emit(world, GameEvent::ActionTaken { actor });
}

/// Picks the first affordable spell with a valid target, or passes.
pub fn decide(content: &dyn ContentOracle, world: &World, actor: EntityId) -> Decision {
    let Some(spells) = world
        .entity(actor)
        .and_then(|entity| entity.get_component::<SpellList>())
    else {
        return Decision::Pass;
    };

    for spell_id in &spells.spells {
        let Some(spell) = content.spell(spell_id) else {
            tracing::warn!(entity = %actor, spell = %spell_id, "unknown spell in spell list");
            continue;
        };
        if !can_afford(world, actor, &spell) {
            continue;
        }
        if let Some(target) = pick_target(world, actor, spell.target) {
            return Decision::Cast {
                spell_id: spell_id.clone(),
                target,
            };
        }
    }
    Decision::Pass
}

fn can_afford(world: &World, actor: EntityId, spell: &SpellDefinition) -> bool {
    let cost = spell.cost.amount;
    cost <= 0.0 || pool(world, actor, spell.cost.resource).is_some_and(|(current, _)| current >= cost)
}

/// First living entity on the wanted side, in spawn order.
///
/// An entity without a team is its own side: everyone else is an enemy and
/// its only ally is itself.
fn pick_target(world: &World, actor: EntityId, kind: TargetKind) -> Option<EntityId> {
    let team = world.team_of(actor);
    match kind {
        TargetKind::Myself => Some(actor),
        TargetKind::Ally => world
            .living_ids()
            .into_iter()
            .find(|id| *id == actor || (team.is_some() && world.team_of(*id) == team)),
        TargetKind::Enemy => world
            .living_ids()
            .into_iter()
            .find(|id| *id != actor && (team.is_none() || world.team_of(*id) != team)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ContentSnapshot, SpellEffect};
    use crate::state::{ComponentRegistry, DamageType, Health, Mana, ResourceKind, Team};

    fn spell(name: &str, mana: f64, target: TargetKind) -> SpellDefinition {
        let strike = SpellEffect::Damage {
            amount: 10.0,
            damage_type: DamageType::Fire,
            lifesteal_ratio: 0.0,
        };
        SpellDefinition::new(name, vec![strike])
            .with_cost(ResourceKind::Mana, mana)
            .with_target(target)
    }

    fn content() -> ContentSnapshot {
        ContentSnapshot::new()
            .with_spell("meteor", spell("Meteor", 50.0, TargetKind::Enemy))
            .with_spell("mend", spell("Mend", 0.0, TargetKind::Ally))
            .with_spell("spark", spell("Spark", 5.0, TargetKind::Enemy))
    }

    fn world() -> (World, EntityId, EntityId, EntityId) {
        let registry = ComponentRegistry::default();
        let mut world = World::new();
        let mage = world.spawn("mage");
        let cleric = world.spawn("cleric");
        let orc = world.spawn("orc");
        for (id, team) in [(mage, Team::Heroes), (cleric, Team::Heroes), (orc, Team::Monsters)] {
            let entity = world.entity_mut(id).unwrap();
            entity.add_component(&registry, Health::new(50.0));
            entity.add_component(&registry, team);
        }
        let mage_entity = world.entity_mut(mage).unwrap();
        mage_entity.add_component(&registry, Mana::new(20.0));
        mage_entity.add_component(&registry, SpellList::new(["ghost", "meteor", "spark"]));
        (world, mage, cleric, orc)
    }

    #[test]
    fn skips_unknown_and_unaffordable_spells() {
        let (world, mage, _, orc) = world();
        assert_eq!(
            decide(&content(), &world, mage),
            Decision::Cast {
                spell_id: "spark".into(),
                target: orc
            }
        );
    }

    #[test]
    fn passes_without_spells_or_targets() {
        let (mut world, mage, cleric, orc) = world();
        assert_eq!(decide(&content(), &world, cleric), Decision::Pass);

        world
            .entity_mut(orc)
            .unwrap()
            .get_component_mut::<Health>()
            .unwrap()
            .set(0.0);
        assert_eq!(decide(&content(), &world, mage), Decision::Pass);
    }

    #[test]
    fn support_spells_target_the_first_living_ally() {
        let (mut world, _, cleric, _) = world();
        let registry = ComponentRegistry::default();
        world
            .entity_mut(cleric)
            .unwrap()
            .add_component(&registry, SpellList::new(["mend"]));
        let mage = EntityId(1);
        assert_eq!(
            decide(&content(), &world, cleric),
            Decision::Cast {
                spell_id: "mend".into(),
                target: mage
            }
        );
    }
}
