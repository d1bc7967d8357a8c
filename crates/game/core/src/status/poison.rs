//! Independent-instance poison.
//!
//! Poison never merges by id. Each application spawns a new instance until the
//! target carries [`GameConfig::MAX_POISON_INSTANCES`]; past that, applications
//! top up the lowest-stacked instance. Every round the target takes one
//! aggregated hit worth `damage_per_round` per instance, and every instance
//! loses exactly one stack.

use crate::config::GameConfig;
use crate::event::{DamageRequest, Dispatcher, GameEvent, HandlerResult, LogTag, Provenance};
use crate::state::{DamageType, EntityId, World};

use super::container::StatusEffects;
use super::effect::StatusEffect;

#[derive(Debug, Default)]
struct ApplySummary {
    spawned: u32,
    topped_up: u32,
    wasted: u32,
}

pub(super) fn apply(
    d: &Dispatcher<'_>,
    world: &mut World,
    target: EntityId,
    effect: StatusEffect,
    applications: u32,
) -> HandlerResult {
    let mut summary = ApplySummary::default();

    for _ in 0..applications.max(1) {
        let instance = world.next_effect_instance();
        let container = world
            .try_entity_mut(target)?
            .get_or_insert_with(d.registry(), StatusEffects::new);

        if container.poison_count() < GameConfig::MAX_POISON_INSTANCES {
            let mut fresh = effect.clone();
            fresh.instance = instance;
            container.push(fresh);
            summary.spawned += 1;
            effect.logic.on_apply(&effect, target, d, world);
            continue;
        }

        match container.weakest_poison_mut() {
            Some(weakest) if weakest.stack_count < weakest.max_stacks => {
                weakest.stack_count = weakest
                    .stack_count
                    .saturating_add(effect.stack_intensity)
                    .min(weakest.max_stacks);
                summary.topped_up += 1;
            }
            _ => summary.wasted += 1,
        }
    }

    let name = world.name_of(target);
    if summary.spawned > 0 {
        d.ui(
            world,
            format!(
                "{name} is poisoned by [{}] x{}",
                effect.name, summary.spawned
            ),
        );
    }
    if summary.topped_up > 0 {
        d.log(
            world,
            LogTag::Status,
            format!(
                "[{name}] poison cap reached; {} application(s) topped up the weakest instance",
                summary.topped_up
            ),
        );
    }
    if summary.wasted > 0 {
        // Every instance is already at max stacks, so these applications have nowhere to go.
        tracing::warn!(
            target_id = %target,
            effect = %effect.id,
            wasted = summary.wasted,
            "poison applications dropped at the instance cap"
        );
        d.log(
            world,
            LogTag::Status,
            format!(
                "[{name}] {} poison application(s) had no effect: all instances at max stacks",
                summary.wasted
            ),
        );
    }
    Ok(())
}

/// Round-start tick: one aggregated hit, then one stack off every instance.
pub(super) fn tick(d: &Dispatcher<'_>, world: &mut World, target: EntityId) -> HandlerResult {
    let Some(container) = world
        .try_entity(target)?
        .get_component::<StatusEffects>()
    else {
        return Ok(());
    };
    let Some(first) = container.poisons().next() else {
        return Ok(());
    };
    let caster = first.caster.or(Some(target));
    let source_spell = first.id.clone();
    let damage_type = first.logic.damage_type().unwrap_or(DamageType::Pure);
    let instances = container.poison_count();
    let total: f64 = container.poisons().map(StatusEffect::tick_damage).sum();

    if total > 0.0 {
        let name = world.name_of(target);
        d.ui(
            world,
            format!("{name} takes {total:.1} poison damage from {instances} instance(s)"),
        );
        let request = DamageRequest::new(caster, target, "Poison", total)
            .from_spell(source_spell)
            .with_type(damage_type)
            .with_provenance(Provenance::DamageOverTime);
        d.emit(world, GameEvent::DamageRequest(request));
    }

    let Some(container) = world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
    else {
        return Ok(());
    };
    let mut exhausted = Vec::new();
    for poison in container.poisons_mut() {
        poison.stack_count = poison.stack_count.saturating_sub(1);
        if poison.stack_count == 0 {
            exhausted.push(poison.instance);
        }
    }
    let removed: Vec<StatusEffect> = exhausted
        .into_iter()
        .filter_map(|instance| container.remove_instance(instance))
        .collect();

    if !removed.is_empty() {
        for effect in &removed {
            effect.logic.on_remove(effect, target, d, world);
        }
        let name = world.name_of(target);
        d.log(
            world,
            LogTag::Status,
            format!("[{name}] {} poison instance(s) wore off", removed.len()),
        );
    }
    Ok(())
}

pub(super) fn amplify(
    d: &Dispatcher<'_>,
    world: &mut World,
    target: EntityId,
    stacks: u32,
) -> HandlerResult {
    let Some(container) = world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
    else {
        return Ok(());
    };
    let mut amplified = 0;
    for poison in container.poisons_mut() {
        poison.stack_count = poison
            .stack_count
            .saturating_add(stacks)
            .min(poison.max_stacks);
        amplified += 1;
    }
    if amplified > 0 {
        let name = world.name_of(target);
        d.log(
            world,
            LogTag::Status,
            format!("[{name}] {amplified} poison instance(s) amplified by {stacks}"),
        );
    }
    Ok(())
}

/// Deals `sum(damage_per_round * stack_count) * multiplier` as one pure hit,
/// then strips every poison instance.
pub(super) fn detonate(
    d: &Dispatcher<'_>,
    world: &mut World,
    target: EntityId,
    caster: Option<EntityId>,
    multiplier: f64,
    source_name: &str,
) -> HandlerResult {
    let Some(container) = world
        .try_entity(target)?
        .get_component::<StatusEffects>()
    else {
        return Ok(());
    };
    let instances = container.poison_count();
    if instances == 0 {
        return Ok(());
    }
    let total: f64 = container
        .poisons()
        .map(|poison| poison.logic.damage_per_round() * f64::from(poison.stack_count))
        .sum::<f64>()
        * multiplier;

    if total > 0.0 {
        let name = world.name_of(target);
        d.ui(
            world,
            format!("{source_name} detonates {instances} poison instance(s) on {name} for {total:.1}"),
        );
        let mut request = DamageRequest::new(caster, target, source_name, total)
            .with_type(DamageType::Pure)
            .unreflectable();
        request.trigger_on_attack = false;
        d.emit(world, GameEvent::DamageRequest(request));
    }

    let removed = match world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
    {
        Some(container) => container.drain_poisons(),
        None => Vec::new(),
    };
    for effect in &removed {
        effect.logic.on_remove(effect, target, d, world);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::combat::CombatResolution;
    use crate::engine::Engine;
    use crate::event::EventKind;
    use crate::state::{Component, Health, Thorns};
    use crate::status::{EffectLogic, StackingPolicy, StatusEffectSystem};

    fn arena() -> Engine {
        let mut engine = Engine::new(GameConfig::default());
        Rc::new(CombatResolution::new()).subscribe(engine.bus_mut());
        StatusEffectSystem::subscribe(engine.bus_mut());
        engine
    }

    fn venom(damage_per_round: f64, max_stacks: u32, intensity: u32) -> StatusEffect {
        StatusEffect::new(
            "poison_venom",
            "Venom",
            EffectLogic::PoisonDot {
                damage_per_round,
                damage_type: DamageType::Poison,
            },
        )
        .with_stacking(StackingPolicy::Independent, max_stacks)
        .with_intensity(intensity)
    }

    fn poison(engine: &mut Engine, target: EntityId, effect: StatusEffect, applications: u32) {
        engine.dispatch(GameEvent::ApplyStatusEffectRequest {
            target,
            effect,
            applications,
        });
    }

    fn stacks(engine: &Engine, id: EntityId) -> Vec<u32> {
        engine
            .world()
            .entity(id)
            .and_then(|entity| entity.get_component::<StatusEffects>())
            .map(|container| container.poisons().map(|p| p.stack_count).collect())
            .unwrap_or_default()
    }

    fn hp(engine: &Engine, id: EntityId) -> f64 {
        engine
            .world()
            .entity(id)
            .and_then(|entity| entity.get_component::<Health>())
            .map(Health::hp)
            .unwrap()
    }

    #[test]
    fn full_stacks_at_the_cap_drop_the_application() {
        let mut engine = arena();
        let logs = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&logs);
        engine.bus_mut().subscribe(EventKind::LogRequest, move |_, _, event| {
            if let GameEvent::LogRequest { message, .. } = event {
                sink.borrow_mut().push(message.clone());
            }
            Ok(())
        });
        let troll = engine.spawn("troll", [Component::from(Health::new(500.0))]);
        let cap = GameConfig::MAX_POISON_INSTANCES as u32;

        poison(&mut engine, troll, venom(5.0, 2, 2), cap);
        poison(&mut engine, troll, venom(5.0, 2, 2), 3);

        assert_eq!(stacks(&engine, troll), vec![2; GameConfig::MAX_POISON_INSTANCES]);
        assert!(logs.borrow().iter().any(|line| {
            line == "[troll] 3 poison application(s) had no effect: all instances at max stacks"
        }));
    }

    #[test]
    fn applications_past_the_cap_top_up_the_weakest() {
        let mut engine = arena();
        let troll = engine.spawn("troll", [Component::from(Health::new(500.0))]);
        let cap = GameConfig::MAX_POISON_INSTANCES as u32;

        poison(&mut engine, troll, venom(5.0, 3, 1), cap);
        poison(&mut engine, troll, venom(5.0, 3, 1), 2);

        let stacks = stacks(&engine, troll);
        assert_eq!(stacks.len(), GameConfig::MAX_POISON_INSTANCES);
        assert_eq!(&stacks[..3], &[2, 2, 1]);
    }

    #[test]
    fn tick_hits_once_per_instance_and_strips_a_stack() {
        let mut engine = arena();
        let troll = engine.spawn("troll", [Component::from(Health::new(100.0))]);
        poison(&mut engine, troll, venom(5.0, 1, 1), 3);
        poison(&mut engine, troll, venom(5.0, 2, 2), 1);

        engine.dispatch(GameEvent::RoundStart { round: 1 });

        assert_eq!(hp(&engine, troll), 80.0);
        assert_eq!(stacks(&engine, troll), vec![1]);
    }

    #[test]
    fn amplify_respects_max_stacks() {
        let mut engine = arena();
        let troll = engine.spawn("troll", [Component::from(Health::new(100.0))]);
        poison(&mut engine, troll, venom(5.0, 4, 1), 2);

        engine.dispatch(GameEvent::AmplifyPoisonRequest {
            target: troll,
            caster: None,
            stacks: 5,
        });

        assert_eq!(stacks(&engine, troll), vec![4, 4]);
    }

    #[test]
    fn detonation_consumes_every_instance_without_reflection() {
        let mut engine = arena();
        let alchemist = engine.spawn("alchemist", [Component::from(Health::new(100.0))]);
        let troll = engine.spawn(
            "troll",
            [
                Component::from(Health::new(1000.0)),
                Component::from(Thorns { percentage: 0.5 }),
            ],
        );
        poison(&mut engine, troll, venom(10.0, 5, 5), 2);

        engine.dispatch(GameEvent::DetonatePoisonRequest {
            target: troll,
            caster: Some(alchemist),
            multiplier: 1.0,
            source_name: "Toxic Surge".into(),
        });

        assert_eq!(hp(&engine, troll), 900.0);
        assert!(stacks(&engine, troll).is_empty());
        assert_eq!(hp(&engine, alchemist), 100.0);
    }
}
